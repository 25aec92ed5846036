use super::MonthQuery;
use crate::core::invoice::InvoiceLogic;
use crate::errors::AppResult;
use crate::export::invoice_filename;
use crate::models::invoice::{InvoiceMonth, InvoiceMonthListing, InvoicePreview};
use crate::server::AppState;
use crate::server::auth::CurrentUser;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;

pub async fn list_months(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
) -> AppResult<Json<Vec<InvoiceMonthListing>>> {
    let months = state.run(InvoiceLogic::list).await?;
    Ok(Json(months))
}

pub async fn preview_month(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> AppResult<Json<InvoicePreview>> {
    let Query(q) = query?;
    let month = q.month_key()?;
    let preview = state
        .run(move |pool| InvoiceLogic::preview(pool, &month))
        .await?;
    Ok(Json(preview))
}

pub async fn close_month(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> AppResult<Json<InvoiceMonth>> {
    let Query(q) = query?;
    let month = q.month_key()?;
    let closed = state
        .run(move |pool| InvoiceLogic::close(pool, &month, &actor))
        .await?;
    Ok(Json(closed))
}

pub async fn export_month(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(q) = query?;
    let month = q.month_key()?;
    let bom = state.csv_bom;
    let bytes = state
        .run(move |pool| InvoiceLogic::export_csv(pool, &month, bom))
        .await?;

    let disposition = format!("attachment; filename={}", invoice_filename(&month));
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
