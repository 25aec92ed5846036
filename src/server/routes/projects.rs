use crate::core::project::ProjectLogic;
use crate::core::worklog::WorkLogLogic;
use crate::errors::AppResult;
use crate::models::page::PageRequest;
use crate::models::project::{NewProject, ProjectFilter, ProjectPatch, ProjectView};
use crate::models::worklog::WorkLog;
use crate::server::AppState;
use crate::server::auth::CurrentUser;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub progress_id: Option<i64>,
    pub work_category_id: Option<i64>,
    pub machine_no: Option<String>,
    pub management_no: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    query: Result<Query<ProjectQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(q) = query?;
    let page = PageRequest::new(q.page, q.per_page)?;
    let filter = ProjectFilter {
        progress_id: q.progress_id,
        work_category_id: q.work_category_id,
        machine_no: q.machine_no,
        management_no: q.management_no,
        include_inactive: q.include_inactive,
    };

    let result = state
        .run(move |pool| ProjectLogic::list(pool, &filter, page))
        .await?;

    Ok(Json(json!({
        "projects": result.items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
    })))
}

pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProjectView>)> {
    let Json(input) = payload?;
    let view = state
        .run(move |pool| ProjectLogic::create(pool, &actor, input))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ProjectView>> {
    let Path(id) = path?;
    let view = state.run(move |pool| ProjectLogic::get(pool, id)).await?;
    Ok(Json(view))
}

pub async fn update_project(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProjectPatch>, JsonRejection>,
) -> AppResult<Json<ProjectView>> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let view = state
        .run(move |pool| ProjectLogic::update(pool, &actor, id, &patch))
        .await?;
    Ok(Json(view))
}

pub async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    state
        .run(move |pool| ProjectLogic::delete(pool, &actor, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_project_worklogs(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Vec<WorkLog>>> {
    let Path(id) = path?;
    let logs = state
        .run(move |pool| {
            ProjectLogic::get(pool, id)?;
            WorkLogLogic::list_by_project(pool, id)
        })
        .await?;
    Ok(Json(logs))
}
