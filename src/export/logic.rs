// src/export/logic.rs

use crate::core::invoice::InvoiceLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::render_json;
use crate::export::{ExportFormat, notify_export_success};
use crate::models::month::MonthKey;
use crate::ui::messages::{info, warning};
use crate::utils::path::{expand_tilde, is_absolute};
use std::fs;

/// File export of a month's invoice, for the CLI.
pub struct ExportLogic;

impl ExportLogic {
    /// Write the invoice of `month` to `file`.
    ///
    /// - `file` must be an absolute path
    /// - an existing file is only replaced with `force` or after confirmation
    /// - CSV carries the same rows as the HTTP download; JSON carries the
    ///   full preview including lock state
    pub fn export(
        pool: &mut DbPool,
        format: ExportFormat,
        file: &str,
        month: &MonthKey,
        force: bool,
        bom: bool,
    ) -> AppResult<()> {
        if !is_absolute(file) {
            return Err(AppError::Validation(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        let target = expand_tilde(file);
        let path = target.as_path();
        ensure_writable(path, force)?;

        let bytes = match format {
            ExportFormat::Csv => {
                info(format!("Exporting {month} to CSV: {}", path.display()));
                InvoiceLogic::export_csv(pool, month, bom)?
            }
            ExportFormat::Json => {
                info(format!("Exporting {month} to JSON: {}", path.display()));
                let preview = InvoiceLogic::export_preview(pool, month)?;
                if preview.items.is_empty() {
                    warning(format!("No billable hours recorded for {month}."));
                }
                render_json(&preview)?
            }
        };

        fs::write(path, bytes)?;
        notify_export_success(&format.as_str().to_uppercase(), path);
        Ok(())
    }
}
