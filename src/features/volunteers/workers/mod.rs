mod sms_opt_in_scheduler;

pub use sms_opt_in_scheduler::SmsOptInScheduler;
