// src/export/model.rs

use crate::models::invoice::InvoicePreviewItem;
use crate::models::month::MonthKey;

/// Column order of an invoice CSV; matches [`InvoicePreviewItem`].
pub const CSV_HEADERS: [&str; 3] = ["management_no", "machine_no", "actual_hours"];

/// Download name of a month's invoice export.
pub fn invoice_filename(month: &MonthKey) -> String {
    format!("invoice_{month}.csv")
}

pub(crate) fn item_to_record(item: &InvoicePreviewItem) -> [String; 3] {
    [
        item.management_no.clone(),
        item.machine_no.clone(),
        item.actual_hours.to_string(),
    ]
}
