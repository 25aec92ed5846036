use super::month::MonthKey;
use crate::errors::AppError;
use serde::Serialize;

/// Lock state of a billing month. `Open → Closed` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthState {
    Open,
    Closed,
}

impl MonthState {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MonthState::Open => "open",
            MonthState::Closed => "closed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(MonthState::Open),
            "closed" => Some(MonthState::Closed),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, MonthState::Closed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceMonth {
    pub month: MonthKey,
    pub state: MonthState,
    pub closed_at: Option<String>,
    pub closed_by: Option<i64>,
    pub created_at: String,
}

impl InvoiceMonth {
    /// Error returned when a work log mutation touches this month.
    pub fn locked_error(&self) -> AppError {
        AppError::LockedPeriod(self.month.to_string())
    }
}

/// Listing row: a month plus the totals of its close-time snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceMonthListing {
    #[serde(flatten)]
    pub invoice: InvoiceMonth,
    pub item_count: i64,
    pub total_hours: i64,
}

/// One billed project in a month. `actual_hours` is in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct InvoicePreviewItem {
    pub management_no: String,
    pub machine_no: String,
    pub actual_hours: i64,
}

/// Aggregation result for a month; `total_hours` is in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub total_hours: i64,
    pub items: Vec<InvoicePreviewItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoicePreview {
    pub month: MonthKey,
    pub state: MonthState,
    pub closed_at: Option<String>,
    pub closed_by: Option<i64>,
    pub total_hours: i64,
    pub items: Vec<InvoicePreviewItem>,
}

impl InvoicePreview {
    pub fn new(invoice: &InvoiceMonth, summary: MonthSummary) -> Self {
        Self {
            month: invoice.month,
            state: invoice.state,
            closed_at: invoice.closed_at.clone(),
            closed_by: invoice.closed_by,
            total_hours: summary.total_hours,
            items: summary.items,
        }
    }
}
