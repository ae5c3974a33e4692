pub mod detections;
pub mod volunteers;
