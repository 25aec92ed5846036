pub mod aggregation;
pub mod config;
pub mod invoice;
pub mod log;
pub mod master;
pub mod project;
pub mod token;
pub mod user;
pub mod worklog;
