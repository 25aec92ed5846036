use crate::models::user::Actor;
use crate::server::auth::CurrentUser;
use axum::Json;

/// The caller resolved from the bearer token.
pub async fn me(CurrentUser(actor): CurrentUser) -> Json<Actor> {
    Json(actor)
}
