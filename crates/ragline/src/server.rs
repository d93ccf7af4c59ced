//! JSON HTTP API over the ingestion and retrieval pipelines.
//!
//! Every route speaks JSON. Ingestion, search, and answer synthesis
//! all run against the backends selected in the config file, so the
//! same server binary serves both the offline setup (hash embeddings,
//! in-memory index) and the hosted one (OpenAI + Pinecone).
//!
//! # Endpoints
//!
//! | Method   | Path | Description |
//! |----------|------|-------------|
//! | `POST`   | `/api/chunk` | Chunk, embed, and index a document |
//! | `POST`   | `/api/search` | Top-k similarity search |
//! | `POST`   | `/api/ask` | Answer a question from retrieved context |
//! | `DELETE` | `/api/chunk/{document_id}` | Delete a document's records |
//! | `POST`   | `/api/chunk/compare` | Run every chunking strategy over a document |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `invalid_strategy` (400),
//! `empty_document` (400), `upstream_unavailable` (502),
//! `upsert_failed` (502).
//!
//! # CORS
//!
//! Origins listed in `[server].allowed_origins` are permitted; an empty
//! list permits any origin. Methods and headers are always permitted.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ragline_core::chunk;
use ragline_core::ingest::IngestionPipeline;
use ragline_core::models::{
    AnswerReport, ChunkStrategy, DeletionReport, IngestionReport, SearchMatch, StrategyReport,
};
use ragline_core::retrieve::RetrievalPipeline;
use ragline_core::Error as CoreError;

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::generation::create_generator;
use crate::vector_index::create_index;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    /// Chunk-embed-upsert pipeline over the configured backends.
    ingestion: Arc<IngestionPipeline>,
    /// Search and answer pipeline over the same backends.
    retrieval: Arc<RetrievalPipeline>,
    /// `top_k` applied when a search request omits it.
    default_top_k: usize,
}

/// Starts the HTTP server.
///
/// Builds the embedding, index, and generation backends named in the
/// config, binds to `[server].bind`, and serves until the process is
/// terminated.
///
/// # Errors
///
/// Fails when a backend cannot be constructed (missing API key,
/// unknown provider) or the bind address is unavailable.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    let embedder = create_embedder(&config.embedding)?;
    let index = create_index(&config.index)?;
    let generator = create_generator(&config.generation)?;

    let ingestion = IngestionPipeline::new(Arc::clone(&embedder), Arc::clone(&index))
        .with_batching(config.embedding.batch_size, config.embedding.max_concurrency);
    let retrieval = RetrievalPipeline::new(embedder, index, generator);

    let state = AppState {
        ingestion: Arc::new(ingestion),
        retrieval: Arc::new(retrieval),
        default_top_k: config.retrieval.default_top_k,
    };

    let cors = cors_layer(&config.server.allowed_origins)?;

    let app = Router::new()
        .route("/api/chunk", post(handle_chunk))
        .route("/api/search", post(handle_search))
        .route("/api/ask", post(handle_ask))
        .route("/api/chunk/{document_id}", delete(handle_delete))
        .route("/api/chunk/compare", post(handle_compare))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    println!("ragline server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid allowed origin: {}", o))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Maps the pipeline error taxonomy onto HTTP statuses and codes:
/// caller errors → 400, failing backends → 502.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let (status, code) = match &err {
            CoreError::InvalidStrategy(_) => (StatusCode::BAD_REQUEST, "invalid_strategy"),
            CoreError::EmptyDocument => (StatusCode::BAD_REQUEST, "empty_document"),
            CoreError::UpstreamUnavailable { .. } => {
                (StatusCode::BAD_GATEWAY, "upstream_unavailable")
            }
            CoreError::UpsertFailed { .. } => (StatusCode::BAD_GATEWAY, "upsert_failed"),
        };
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"healthy"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/chunk ============

/// JSON request body for `POST /api/chunk`.
#[derive(Deserialize)]
struct ChunkRequest {
    document_id: String,
    title: String,
    content: String,
    /// Strategy name; defaults to `"markdown"`.
    #[serde(default = "default_strategy")]
    strategy: String,
}

fn default_strategy() -> String {
    "markdown".to_string()
}

/// Handler for `POST /api/chunk`.
///
/// Chunks the document with the requested strategy, embeds every
/// chunk, and upserts the records. Returns the ingestion report with
/// chunk-size statistics.
async fn handle_chunk(
    State(state): State<AppState>,
    Json(req): Json<ChunkRequest>,
) -> Result<Json<IngestionReport>, AppError> {
    if req.document_id.trim().is_empty() {
        return Err(bad_request("document_id must not be empty"));
    }
    if req.title.trim().is_empty() {
        return Err(bad_request("title must not be empty"));
    }
    let strategy: ChunkStrategy = req.strategy.parse()?;

    let report = state
        .ingestion
        .ingest(&req.document_id, &req.title, &req.content, strategy)
        .await?;
    Ok(Json(report))
}

// ============ POST /api/search ============

/// JSON request body for `POST /api/search`.
#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    /// Defaults to `[retrieval].default_top_k`.
    #[serde(default)]
    top_k: Option<usize>,
}

/// JSON response body for `POST /api/search`.
#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchMatch>,
}

/// Handler for `POST /api/search`.
async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    let top_k = req.top_k.unwrap_or(state.default_top_k);
    if top_k == 0 {
        return Err(bad_request("top_k must be at least 1"));
    }

    let results = state.retrieval.search(&req.query, top_k).await?;
    Ok(Json(SearchResponse { results }))
}

// ============ POST /api/ask ============

/// JSON request body for `POST /api/ask`.
#[derive(Deserialize)]
struct QuestionRequest {
    question: String,
    /// Restricts retrieval to these documents when present and
    /// non-empty.
    #[serde(default)]
    document_ids: Option<Vec<String>>,
}

/// Handler for `POST /api/ask`.
///
/// Retrieves context for the question and asks the generation backend
/// to answer from it. Returns the answer with ranked sources.
async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<AnswerReport>, AppError> {
    if req.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }

    let report = state
        .retrieval
        .answer(&req.question, req.document_ids.as_deref())
        .await?;
    Ok(Json(report))
}

// ============ DELETE /api/chunk/{document_id} ============

/// Handler for `DELETE /api/chunk/{document_id}`.
///
/// Best-effort: deleting a document that was never ingested still
/// reports completion.
async fn handle_delete(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DeletionReport>, AppError> {
    if document_id.trim().is_empty() {
        return Err(bad_request("document_id must not be empty"));
    }
    Ok(Json(state.ingestion.delete_document(&document_id).await))
}

// ============ POST /api/chunk/compare ============

/// JSON request body for `POST /api/chunk/compare`.
#[derive(Deserialize)]
struct CompareRequest {
    content: String,
}

/// Handler for `POST /api/chunk/compare`.
///
/// Runs every strategy over the document without touching the index
/// and returns per-strategy chunk statistics keyed by strategy name.
async fn handle_compare(
    Json(req): Json<CompareRequest>,
) -> Json<BTreeMap<ChunkStrategy, StrategyReport>> {
    Json(chunk::compare_strategies(&req.content))
}
