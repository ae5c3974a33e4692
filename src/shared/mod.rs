pub mod constants;
pub mod types;
pub mod upload;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
