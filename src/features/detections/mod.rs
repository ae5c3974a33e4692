//! Fire report uploads.
//!
//! An uploaded photo is only accepted when the vision model confirms it shows
//! fire; accepted photos are stored under the `fires` folder and recorded with
//! their coordinates.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/detections` | Upload, classify and persist a fire report |
//! | GET | `/detections` | List reports, newest first |
//! | GET | `/detections/{id}` | Get a single report |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgFireReportRepository;
pub use routes::routes;
pub use services::DetectionService;
