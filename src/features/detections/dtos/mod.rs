mod detection_dto;

pub use detection_dto::*;
