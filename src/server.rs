//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/oids?keyword=&type=&limit=` | Search by name and/or oid |
//! | `GET`  | `/oids/{oid}` | Full record with descriptions and parent |
//! | `GET`  | `/oids/{oid}/relation` | Tree from the root down to the node's children |
//! | `GET`  | `/oids/{oid}/parent` | Parent node |
//! | `GET`  | `/oids/{oid}/siblings` | Other children of the parent |
//! | `GET`  | `/oids/{oid}/children` | Direct children |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "no result" }
//! ```
//!
//! Malformed input → `400`, no matching data → `404`, store failure → `500`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser frontends can
//! call the API directly.

use anyhow::Context;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use oid_explorer_core::models::{OidNode, OidRecord, Relation};
use oid_explorer_core::relation;
use oid_explorer_core::search::{self, SearchCriteria, SearchField};
use oid_explorer_core::LookupError;

use crate::config::Config;
use crate::db::SharedStore;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<SharedStore>,
}

/// Starts the HTTP server on `[server].bind`.
///
/// Connects to the database before binding and refuses to start if that
/// fails. Runs until Ctrl-C, then drains in-flight requests.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let store = Arc::new(SharedStore::new(config));

    store
        .get()
        .await
        .context("connecting to the database failed")?;

    let state = AppState {
        config: Arc::new(config.clone()),
        store: store.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/oids", get(handle_search))
        .route("/oids/{oid}", get(handle_oid))
        .route("/oids/{oid}/relation", get(handle_relation))
        .route("/oids/{oid}/parent", get(handle_parent))
        .route("/oids/{oid}/siblings", get(handle_siblings))
        .route("/oids/{oid}/children", get(handle_children))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!(
        addr = %bind_addr,
        db = %store.path().display(),
        "OID Explorer API listening"
    );
    println!("OID Explorer API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down the server");
    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::debug!("received shutdown signal");
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        let status = match &err {
            LookupError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LookupError::NotFound(_) => StatusCode::NOT_FOUND,
            LookupError::Store(_) => {
                tracing::error!(error = %err, "store query failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError {
            status,
            message: err.to_string(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppState {
    async fn db(&self) -> Result<&SqliteStore, AppError> {
        self.store.get().await.map_err(|e| {
            tracing::error!(error = %format!("{:#}", e), "database unavailable");
            internal(format!("{:#}", e))
        })
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /oids ============

/// Raw query string of `GET /oids`. Field values are validated by hand in
/// [`parse_criteria`]; a query string that does not deserialize at all is
/// turned into [`AppError`] through its [`QueryRejection`].
#[derive(Debug, Deserialize)]
struct SearchParams {
    keyword: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    limit: Option<String>,
}

fn parse_criteria(params: SearchParams) -> Result<SearchCriteria, AppError> {
    let keyword = params.keyword.filter(|k| !k.is_empty());

    let field = match keyword {
        Some(_) => params.kind.as_deref().unwrap_or("").parse::<SearchField>()?,
        None => SearchField::Any,
    };

    let limit = match params.limit.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|e| bad_request(format!("limit is not an integer: {}", e)))?,
        ),
    };

    Ok(SearchCriteria {
        keyword,
        field,
        limit,
    })
}

async fn handle_search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<OidNode>>, AppError> {
    let Query(params) = query?;
    tracing::debug!(?params, "GET /oids");
    let criteria = parse_criteria(params)?;
    let store = state.db().await?;
    let results = search::search(store, &criteria, Some(state.config.search.max_limit)).await?;
    Ok(Json(results))
}

// ============ GET /oids/{oid}[/...] ============

async fn handle_oid(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<OidRecord>, AppError> {
    let Path(oid) = path?;
    tracing::debug!(%oid, "GET /oids/{{oid}}");
    let store = state.db().await?;
    Ok(Json(relation::resolve_oid(store, &oid).await?))
}

async fn handle_relation(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Relation>, AppError> {
    let Path(oid) = path?;
    tracing::debug!(%oid, "GET /oids/{{oid}}/relation");
    let store = state.db().await?;
    Ok(Json(relation::resolve_relation(store, &oid).await?))
}

async fn handle_parent(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<OidNode>, AppError> {
    let Path(oid) = path?;
    tracing::debug!(%oid, "GET /oids/{{oid}}/parent");
    let store = state.db().await?;
    Ok(Json(relation::resolve_parent(store, &oid).await?))
}

async fn handle_siblings(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<OidNode>>, AppError> {
    let Path(oid) = path?;
    tracing::debug!(%oid, "GET /oids/{{oid}}/siblings");
    let store = state.db().await?;
    Ok(Json(relation::resolve_siblings(store, &oid).await?))
}

async fn handle_children(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<OidNode>>, AppError> {
    let Path(oid) = path?;
    tracing::debug!(%oid, "GET /oids/{{oid}}/children");
    let store = state.db().await?;
    Ok(Json(relation::resolve_children(store, &oid).await?))
}
