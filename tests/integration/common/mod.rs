#![allow(dead_code)]

pub mod fake_google;
pub mod test_server;
