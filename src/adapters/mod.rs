pub mod calendar_tools;
pub mod chat_handler;
pub mod google_calendar;
pub mod health_handler;
pub mod in_memory_calendar;
pub mod rate_limit;
pub mod service_account;
pub mod ui_handler;
