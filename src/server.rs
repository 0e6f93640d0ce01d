//! HTTP request boundary: routes, request/response mapping and error
//! translation. The pipeline stays unaware of HTTP; this module only hands it
//! payloads and relays back fragments or the single typed error.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::IngestError;
use crate::pipeline::storage::{RecordFilter, Storage};
use crate::pipeline::tasks::{self, BatchIngestRequest, IngestRequest, IngestResponse};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;
const DEFAULT_CONTEXT_LIMIT: usize = 20;
const MAX_CONTEXT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct ListParams {
    provider_id: Option<String>,
    record_type: Option<String>,
    severity: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ContextParams {
    limit: Option<usize>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn error_response(error: IngestError) -> Response {
    match error {
        IngestError::UnsupportedRecordType { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "detail": error.to_string() })),
        )
            .into_response(),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
    }
}

async fn ingest(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Json(request): Json<IngestRequest>,
) -> Response {
    match tasks::ingest_record(storage.as_ref(), &request).await {
        Ok(record) => {
            let quality_flags = record.quality_flags.clone();
            Json(IngestResponse { record, quality_flags }).into_response()
        }
        Err(e) => {
            crate::metrics::record_ingest_rejected();
            error_response(e)
        }
    }
}

async fn ingest_batch(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Json(request): Json<BatchIngestRequest>,
) -> Response {
    Json(tasks::ingest_batch(storage.as_ref(), &request).await).into_response()
}

async fn list_records(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(params): Query<ListParams>,
) -> Response {
    let filter = RecordFilter {
        provider_id: params.provider_id,
        record_type: params.record_type,
        severity: params.severity,
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    match storage.list_records(&filter, limit).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => error_response(e),
    }
}

async fn records_context(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(params): Query<ContextParams>,
) -> Response {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_CONTEXT_LIMIT)
        .clamp(1, MAX_CONTEXT_LIMIT);
    match storage.list_records(&RecordFilter::default(), limit).await {
        Ok(records) => {
            let context: Vec<String> = records.iter().map(tasks::context_line).collect();
            Json(serde_json::json!({ "count": context.len(), "context": context })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn get_record(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Path(record_id): Path<String>,
) -> Response {
    match storage.get_record(&record_id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Record not found" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Create the HTTP router with all routes and shared storage
pub fn create_router(storage: Arc<dyn Storage>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/ingest/batch", post(ingest_batch))
        .route("/records", get(list_records))
        .route("/records/context", get(records_context))
        .route("/records/:record_id", get(get_record))
        .layer(Extension(storage))
        .layer(cors)
}

/// Start the HTTP server on the specified port
pub async fn start_server(storage: Arc<dyn Storage>, port: u16) -> anyhow::Result<()> {
    let app = create_router(storage);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("ingest API listening on http://{addr}");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
