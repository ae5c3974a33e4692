mod fire_report;

pub use fire_report::*;
