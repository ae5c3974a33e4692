//! Volunteer applications and SMS opt-in.
//!
//! An application is only accepted when its certificate image is recognised as
//! a volunteer fire-service certificate. Opting into SMS is temporary: the
//! flag switches itself off one window (24h by default) after it was last set.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/volunteers` | Upload a certificate and apply |
//! | GET | `/volunteers?city=` | Volunteers in a city not currently opted into SMS |
//! | GET | `/volunteers/{id}` | Get a single application |
//! | GET | `/volunteers/send-sms/reset?id=` | Opt a volunteer into SMS for a fresh window |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod workers;

pub use repositories::PgVolunteerRepository;
pub use routes::routes;
pub use services::VolunteerService;
pub use workers::SmsOptInScheduler;
