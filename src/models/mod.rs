//! Domain records shared by the store, the logic layer and the HTTP API.

pub mod invoice;
pub mod master;
pub mod month;
pub mod page;
pub mod project;
pub mod summary;
pub mod user;
pub mod worklog;
