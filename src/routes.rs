//! HTTP routes for filing complaint reports, driving their workflow and
//! verifying the chain.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::model::{CitizenFeedback, ContractorAssignment, NewReport, Report, RequestBody};
use crate::verify::ChainVerification;

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

/// Error body: `message`, plus `field` for validation failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: "Internal Server Error".to_string(),
            field: None,
        }),
    )
}

fn reject(err: LedgerError) -> ApiError {
    let (status, field, message) = match &err {
        LedgerError::Validation { field, .. } => {
            (StatusCode::BAD_REQUEST, Some(*field), err.to_string())
        }
        LedgerError::NotFound { .. } => (StatusCode::NOT_FOUND, None, err.to_string()),
        LedgerError::State { .. } => (StatusCode::CONFLICT, None, err.to_string()),
        LedgerError::Storage(e) => {
            error!(error = %e, "storage failure");
            return internal_error();
        }
    };
    (status, Json(ErrorBody { message, field }))
}

/// Read a JSON object body. Malformed JSON is answered with 400 and an
/// [`ErrorBody`], like every other bad input.
fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<RequestBody, ApiError> {
    let Json(value) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected request body");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                message: rejection.body_text(),
                field: None,
            }),
        )
    })?;
    RequestBody::parse(value).map_err(reject)
}

/// Decode a JSON body into a request type; a mistyped field is a 400
/// naming that field.
fn decode<T>(payload: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError>
where
    T: TryFrom<RequestBody, Error = LedgerError>,
{
    T::try_from(body(payload)?).map_err(reject)
}

/// Run a ledger call on the blocking pool; the file store does synchronous
/// I/O under the ledger lock.
async fn blocking<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&Ledger) -> LedgerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let ledger = Arc::clone(&state.ledger);
    tokio::task::spawn_blocking(move || call(&ledger))
        .await
        .map_err(|e| {
            error!(error = %e, "ledger task failed");
            internal_error()
        })?
        .map_err(reject)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/reports", get(list_reports).post(create_report))
        .route("/api/reports/contracts", get(list_available_contracts))
        .route("/api/reports/:id", get(get_report))
        .route("/api/reports/:id/status", patch(update_status))
        .route("/api/reports/:id/assign", post(assign_contractor))
        .route("/api/reports/:id/feedback", post(submit_feedback))
        .route("/api/blockchain/verify", get(verify_chain))
        .route("/health", get(health))
        .route("/version", get(version))
        .with_state(state)
}

/// POST /api/reports
pub async fn create_report(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let input: NewReport = decode(payload)?;
    let report = blocking(&state, move |ledger| ledger.append(input)).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/reports: newest first
pub async fn list_reports(State(state): State<AppState>) -> ApiResult<Vec<Report>> {
    blocking(&state, |ledger| ledger.list()).await.map(Json)
}

/// GET /api/reports/contracts: reports waiting for a contractor
pub async fn list_available_contracts(State(state): State<AppState>) -> ApiResult<Vec<Report>> {
    blocking(&state, |ledger| ledger.available_contracts())
        .await
        .map(Json)
}

/// GET /api/reports/:id
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Report> {
    blocking(&state, move |ledger| ledger.get(id)).await.map(Json)
}

/// PATCH /api/reports/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Report> {
    let status = body(payload)?
        .text("status")
        .and_then(|s| s.ok_or_else(|| LedgerError::validation("status", "is required")))
        .map_err(reject)?;
    blocking(&state, move |ledger| ledger.set_status(id, &status))
        .await
        .map(Json)
}

/// POST /api/reports/:id/assign
pub async fn assign_contractor(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Report> {
    let assignment: ContractorAssignment = decode(payload)?;
    blocking(&state, move |ledger| ledger.assign_contractor(id, assignment))
        .await
        .map(Json)
}

/// POST /api/reports/:id/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Report> {
    let feedback: CitizenFeedback = decode(payload)?;
    blocking(&state, move |ledger| ledger.submit_feedback(id, feedback))
        .await
        .map(Json)
}

/// GET /api/blockchain/verify: `{ isValid, invalidBlocks[] }`
pub async fn verify_chain(State(state): State<AppState>) -> ApiResult<ChainVerification> {
    blocking(&state, |ledger| ledger.verify()).await.map(Json)
}

/// GET /health
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// GET /version
#[derive(Serialize)]
pub struct Version {
    pub version: &'static str,
    pub git_sha: Option<&'static str>,
}
pub async fn version() -> Json<Version> {
    Json(Version {
        version: env!("CARGO_PKG_VERSION"),
        git_sha: option_env!("GIT_SHA"),
    })
}
