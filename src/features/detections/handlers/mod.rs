mod detection_handler;

pub use detection_handler::*;
