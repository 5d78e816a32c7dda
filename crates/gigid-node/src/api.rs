//! HTTP API server for the GigID node.
//!
//! Provides REST endpoints for node status, verifier management, income
//! recording, credential minting and enumeration, transfer attempts (always
//! rejected), and the event log. Mutating requests carry an explicit
//! `caller` address: wallet and session management live outside this node,
//! which trusts its operator boundary.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use gigid_core::{Address, AttestationRef};

use crate::commands::{
    CommandError, CountsResponse, CredentialListResponse, CredentialResponse, EventsResponse,
    IncomeResponse, IncomesResponse, NodeCommand, TransferResponse, VerifierResponse,
};
use crate::state::NodeState;

// --- Request and response types ---

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub admin: Address,
    pub uptime_secs: u64,
    pub verifiers: usize,
    pub income_records: u64,
    pub credentials: u64,
    pub events: u64,
}

#[derive(Deserialize)]
pub struct SetVerifierRequest {
    pub caller: Address,
    pub identity: Address,
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct RecordIncomeRequest {
    pub caller: Address,
    pub worker: Address,
    pub amount: u128,
    pub source: String,
    pub attestation_ref: AttestationRef,
}

#[derive(Deserialize)]
pub struct MintCredentialRequest {
    pub caller: Address,
    pub recipient: Address,
    pub total_income: u128,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub category: String,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub caller: Address,
    pub from: Address,
    pub to: Address,
    pub token_id: u64,
}

#[derive(Deserialize)]
pub struct CredentialsQuery {
    pub owner: Option<Address>,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    pub since: Option<u64>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(
    State(state): State<Arc<NodeState>>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let counts: Json<CountsResponse> =
        send_command_and_await(&state, NodeCommand::GetCounts { reply: reply_tx }, reply_rx)
            .await?;

    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        admin: state.admin,
        uptime_secs: state.start_time.elapsed().as_secs(),
        verifiers: counts.verifiers,
        income_records: counts.income_records,
        credentials: counts.credentials,
        events: counts.events,
    }))
}

async fn handle_set_verifier(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<SetVerifierRequest>,
) -> Result<Json<VerifierResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::SetVerifierStatus {
        caller: req.caller,
        identity: req.identity,
        enabled: req.enabled,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_get_verifier(
    State(state): State<Arc<NodeState>>,
    Path(identity): Path<Address>,
) -> Result<Json<VerifierResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::GetVerifier {
        identity,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_record_income(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<RecordIncomeRequest>,
) -> Result<Json<IncomeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::RecordIncome {
        caller: req.caller,
        worker: req.worker,
        amount: req.amount,
        source: req.source,
        attestation_ref: req.attestation_ref,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_get_incomes(
    State(state): State<Arc<NodeState>>,
    Path(worker): Path<Address>,
) -> Result<Json<IncomesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::GetIncomes {
        worker,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_mint_credential(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<MintCredentialRequest>,
) -> Result<Json<CredentialResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::MintCredential {
        caller: req.caller,
        recipient: req.recipient,
        total_income: req.total_income,
        period_start: req.period_start,
        period_end: req.period_end,
        category: req.category,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_get_credential(
    State(state): State<Arc<NodeState>>,
    Path(token_id): Path<u64>,
) -> Result<Json<CredentialResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::GetCredential {
        token_id,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_list_credentials(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<CredentialsQuery>,
) -> Result<Json<CredentialListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::ListCredentials {
        owner: query.owner,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_transfer(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::Transfer {
        caller: req.caller,
        from: req.from,
        to: req.to,
        token_id: req.token_id,
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_events(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::GetEvents {
        since: query.since.unwrap_or(0),
        reply: reply_tx,
    };

    send_command_and_await(&state, cmd, reply_rx).await
}

/// Helper to send a command and await the reply. Domain rejections map to
/// 400; operational faults map to 500.
async fn send_command_and_await<T: Serialize>(
    state: &Arc<NodeState>,
    cmd: NodeCommand,
    reply_rx: tokio::sync::oneshot::Receiver<Result<T, CommandError>>,
) -> Result<Json<T>, (StatusCode, Json<ErrorResponse>)> {
    state.command_tx.send(cmd).await.map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "node command loop not running".into(),
            }),
        )
    })?;

    match reply_rx.await {
        Ok(Ok(resp)) => Ok(Json(resp)),
        Ok(Err(CommandError::Rejected(e))) => {
            Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })))
        }
        Ok(Err(CommandError::Internal(e))) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e }),
        )),
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "command loop dropped the reply channel".into(),
            }),
        )),
    }
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/verifiers", post(handle_set_verifier))
        .route("/api/v1/verifiers/{identity}", get(handle_get_verifier))
        .route("/api/v1/incomes", post(handle_record_income))
        .route("/api/v1/incomes/{worker}", get(handle_get_incomes))
        .route(
            "/api/v1/credentials",
            get(handle_list_credentials).post(handle_mint_credential),
        )
        .route("/api/v1/credentials/{token_id}", get(handle_get_credential))
        .route("/api/v1/transfers", post(handle_transfer))
        .route("/api/v1/events", get(handle_events))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
