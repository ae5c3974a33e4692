mod volunteer_application;

pub use volunteer_application::*;
