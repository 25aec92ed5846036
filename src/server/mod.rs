//! HTTP API server.
//!
//! Routes are organised by resource:
//! - routes::invoices: preview, close, export and listing of billing months
//! - routes::worklogs: work log CRUD and per-project summaries
//! - routes::projects: project CRUD
//! - routes::masters: the four master tables, addressed by slug
//! - routes::auth: the caller behind the bearer token

pub mod auth;
pub mod error;
pub mod routes;

use crate::config::Config;
use crate::core::token::TokenKeys;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<Mutex<DbPool>>,
    pub keys: TokenKeys,
    pub csv_bom: bool,
}

impl AppState {
    pub fn new(pool: DbPool, keys: TokenKeys, csv_bom: bool) -> Self {
        Self {
            pool: Arc::new(Mutex::new(pool)),
            keys,
            csv_bom,
        }
    }

    /// Run one unit of database work on the blocking pool, holding the
    /// connection for its whole duration.
    pub async fn run<F, T>(&self, work: F) -> AppResult<T>
    where
        F: FnOnce(&mut DbPool) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || {
            // A panicking unit of work has already rolled its transaction back.
            let mut guard = pool.lock().unwrap_or_else(PoisonError::into_inner);
            work(&mut guard)
        })
        .await
        .map_err(|e| AppError::Other(format!("blocking task failed: {e}")))?
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::auth::me;
    use routes::invoices::{close_month, export_month, list_months, preview_month};
    use routes::masters::{
        create_master, deactivate_master, get_master, list_masters, update_master,
    };
    use routes::projects::{
        create_project, delete_project, get_project, list_project_worklogs, list_projects,
        update_project,
    };
    use routes::worklogs::{
        create_worklog, delete_worklog, get_worklog, list_month_worklogs, list_worklogs,
        project_summary, update_worklog,
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/auth/me", get(me))
        // invoices
        .route("/api/invoices", get(list_months))
        .route("/api/invoices/preview", get(preview_month))
        .route("/api/invoices/close", post(close_month))
        .route("/api/invoices/export", get(export_month))
        // work logs
        .route("/api/worklogs", get(list_worklogs).post(create_worklog))
        .route("/api/worklogs/summary/:project_id", get(project_summary))
        .route("/api/worklogs/month/:month", get(list_month_worklogs))
        .route(
            "/api/worklogs/:id",
            get(get_worklog).put(update_worklog).delete(delete_worklog),
        )
        // projects
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/:id/worklogs", get(list_project_worklogs))
        // masters
        .route("/api/masters/:kind", get(list_masters).post(create_master))
        .route(
            "/api/masters/:kind/:id",
            get(get_master).put(update_master).delete(deactivate_master),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Install the fmt subscriber; `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

/// Open the database, apply migrations and serve until Ctrl-C.
pub async fn serve(cfg: &Config) -> AppResult<()> {
    init_tracing(&cfg.log_level);

    let keys = TokenKeys::new(&cfg.jwt_secret, cfg.token_ttl_minutes)?;
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;

    let app = create_router(AppState::new(pool, keys, cfg.csv_bom));
    let listener = TcpListener::bind(&cfg.bind_address).await?;
    info!(address = %cfg.bind_address, database = %cfg.database, "rworklog listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}
