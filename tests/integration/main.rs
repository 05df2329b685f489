mod common;

mod chat_test;
mod google_calendar_test;
mod health_test;
