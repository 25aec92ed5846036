// src/export/json_csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::{CSV_HEADERS, item_to_record};
use crate::models::invoice::{InvoicePreview, InvoicePreviewItem};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Render invoice rows as CSV, header row first.
///
/// An empty slice yields the header alone. Rows are written in the order
/// given; callers pass the preview ordering.
pub fn render_csv(items: &[InvoicePreviewItem], bom: bool) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    if bom {
        buf.extend_from_slice(UTF8_BOM);
    }

    let mut wtr = csv::Writer::from_writer(buf);
    wtr.write_record(CSV_HEADERS)?;
    for item in items {
        wtr.write_record(item_to_record(item))?;
    }

    wtr.into_inner()
        .map_err(|e| AppError::Export(format!("CSV flush error: {}", e.error())))
}

/// Pretty-printed JSON of a full preview (state, totals and rows).
pub fn render_json(preview: &InvoicePreview) -> AppResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(preview)?)
}
