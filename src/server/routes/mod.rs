pub mod auth;
pub mod invoices;
pub mod masters;
pub mod projects;
pub mod worklogs;

use crate::errors::{AppError, AppResult};
use crate::models::month::MonthKey;
use serde::Deserialize;

/// `?month=YYYY-MM`
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    pub fn month_key(&self) -> AppResult<MonthKey> {
        match self.month.as_deref() {
            Some(raw) => MonthKey::parse(raw),
            None => Err(AppError::Validation("month is required (YYYY-MM)".into())),
        }
    }
}
