mod fire_report_repository;

pub use fire_report_repository::{FireReportRepository, PgFireReportRepository};
