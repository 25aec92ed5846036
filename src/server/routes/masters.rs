use crate::core::master::MasterLogic;
use crate::errors::{AppError, AppResult};
use crate::models::master::{MasterKind, MasterPatch, MasterRecord, NewMasterRecord};
use crate::server::AppState;
use crate::server::auth::CurrentUser;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

fn parse_kind(slug: &str) -> AppResult<MasterKind> {
    MasterKind::from_slug(slug).ok_or_else(|| AppError::NotFound(format!("master table '{slug}'")))
}

#[derive(Debug, Deserialize)]
pub struct MasterQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_masters(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<MasterQuery>, QueryRejection>,
) -> AppResult<Json<Vec<MasterRecord>>> {
    let Path(slug) = path?;
    let Query(q) = query?;
    let kind = parse_kind(&slug)?;
    let records = state
        .run(move |pool| MasterLogic::list(pool, kind, q.include_inactive))
        .await?;
    Ok(Json(records))
}

pub async fn create_master(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<NewMasterRecord>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MasterRecord>)> {
    let Path(slug) = path?;
    let kind = parse_kind(&slug)?;
    let Json(input) = payload?;
    let rec = state
        .run(move |pool| MasterLogic::create(pool, &actor, kind, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(rec)))
}

pub async fn get_master(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> AppResult<Json<MasterRecord>> {
    let Path((slug, id)) = path?;
    let kind = parse_kind(&slug)?;
    let rec = state
        .run(move |pool| MasterLogic::get(pool, kind, id))
        .await?;
    Ok(Json(rec))
}

pub async fn update_master(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<(String, i64)>, PathRejection>,
    payload: Result<Json<MasterPatch>, JsonRejection>,
) -> AppResult<Json<MasterRecord>> {
    let Path((slug, id)) = path?;
    let kind = parse_kind(&slug)?;
    let Json(patch) = payload?;
    let rec = state
        .run(move |pool| MasterLogic::update(pool, &actor, kind, id, &patch))
        .await?;
    Ok(Json(rec))
}

pub async fn deactivate_master(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path((slug, id)) = path?;
    let kind = parse_kind(&slug)?;
    state
        .run(move |pool| MasterLogic::delete(pool, &actor, kind, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
