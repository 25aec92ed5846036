use crate::core::aggregation::SummaryLogic;
use crate::core::worklog::WorkLogLogic;
use crate::errors::AppResult;
use crate::models::month::MonthKey;
use crate::models::page::PageRequest;
use crate::models::summary::ProjectSummary;
use crate::models::worklog::{NewWorkLog, WorkLog, WorkLogFilter, WorkLogPatch};
use crate::server::AppState;
use crate::server::auth::CurrentUser;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct WorkLogQuery {
    pub project_id: Option<i64>,
    pub user_id: Option<i64>,
    pub work_date: Option<NaiveDate>,
    pub month: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn list_worklogs(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    query: Result<Query<WorkLogQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(q) = query?;
    let filter = WorkLogFilter {
        project_id: q.project_id,
        user_id: q.user_id,
        work_date: q.work_date,
        month: q.month.as_deref().map(MonthKey::parse).transpose()?,
    };
    let page = PageRequest::new(q.page, q.per_page)?;

    let result = state
        .run(move |pool| WorkLogLogic::list(pool, &filter, page))
        .await?;

    Ok(Json(json!({
        "worklogs": result.items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
    })))
}

pub async fn list_month_worklogs(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Vec<WorkLog>>> {
    let Path(month) = path?;
    let month = MonthKey::parse(&month)?;
    let logs = state
        .run(move |pool| WorkLogLogic::list_by_month(pool, &month))
        .await?;
    Ok(Json(logs))
}

pub async fn create_worklog(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    payload: Result<Json<NewWorkLog>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WorkLog>)> {
    let Json(input) = payload?;
    let wl = state
        .run(move |pool| WorkLogLogic::create(pool, &actor, input))
        .await?;
    Ok((StatusCode::CREATED, Json(wl)))
}

pub async fn get_worklog(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<WorkLog>> {
    let Path(id) = path?;
    let wl = state.run(move |pool| WorkLogLogic::get(pool, id)).await?;
    Ok(Json(wl))
}

pub async fn update_worklog(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<WorkLogPatch>, JsonRejection>,
) -> AppResult<Json<WorkLog>> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let wl = state
        .run(move |pool| WorkLogLogic::update(pool, &actor, id, &patch))
        .await?;
    Ok(Json(wl))
}

pub async fn delete_worklog(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    state
        .run(move |pool| WorkLogLogic::delete(pool, &actor, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn project_summary(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ProjectSummary>> {
    let Path(project_id) = path?;
    let summary = state
        .run(move |pool| SummaryLogic::project_summary(pool, project_id))
        .await?;
    Ok(Json(summary))
}
