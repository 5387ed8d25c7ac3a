//! API-facing request/response models and handlers.
//!
//! Handlers are transport-agnostic: a host web framework extracts the
//! credential header and peer address into a [`ClientIdentity`], calls the
//! handler, and maps [`ApiError::status`] onto its response.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{EngineError, Participant, ParticipantState, Spawn, WaitingRoom};
use crate::util::metrics::MetricsSnapshot;

/// Who is calling, as far as rate limiting and authentication care.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Tenant credential from the `app_api_key` header.
    pub credential: Option<String>,
    /// Raw `X-Forwarded-For` header.
    pub forwarded_for: Option<String>,
    /// Socket peer address.
    pub peer_addr: Option<IpAddr>,
}

impl ClientIdentity {
    /// Rate-limit key: the credential if present, else the originating address.
    pub fn client_key(&self) -> String {
        if let Some(credential) = self.credential.as_deref().filter(|c| !c.is_empty()) {
            return format!("api_key:{credential}");
        }
        if let Some(first) = self
            .forwarded_for
            .as_deref()
            .and_then(|h| h.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return format!("ip:{first}");
        }
        self.peer_addr
            .map_or_else(|| "ip:unknown".to_string(), |ip| format!("ip:{ip}"))
    }
}

/// Join request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Target queue.
    pub queue_id: Uuid,
    /// Caller-supplied visitor identifier.
    pub visitor_id: String,
    /// Optional redirect hint forwarded to the release callback.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Real admission or client integration test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// Persist a waiting participant.
    #[default]
    Real,
    /// Answer with an ephemeral ready participant.
    Simulation,
}

/// Participant as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResponse {
    /// Queue identifier.
    pub queue_id: Uuid,
    /// Visitor identifier.
    pub visitor_id: String,
    /// Current state.
    pub status: ParticipantState,
    /// Bearer token.
    pub token: String,
    /// Redirect hint.
    pub redirect_url: Option<String>,
    /// Wait in seconds, once released.
    pub wait_time: Option<u64>,
    /// Expiry, ms since epoch.
    pub expires_at_ms: u128,
    /// Admission time, ms since epoch.
    pub created_at_ms: u128,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        let wait_time = p.wait_secs();
        Self {
            queue_id: p.queue_id,
            visitor_id: p.visitor_id,
            status: p.state,
            token: p.token,
            redirect_url: p.redirect_url,
            wait_time,
            expires_at_ms: p.expires_at_ms,
            created_at_ms: p.created_at_ms,
        }
    }
}

/// Values for the `X-RateLimit-*` response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    /// Ceiling per window.
    pub limit: usize,
    /// Admissions left in the window.
    pub remaining: usize,
    /// When the window frees a slot, seconds since epoch.
    pub reset_at_secs: u64,
}

/// Successful join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOutcome {
    /// Admitted (or simulated) participant.
    pub participant: ParticipantResponse,
    /// Rate-limit headers for the response.
    pub rate_limit: RateLimitInfo,
}

/// Caller-visible failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Human-readable reason.
    pub detail: String,
    /// Rate-limit headers, when the limiter was consulted.
    pub rate_limit: Option<RateLimitInfo>,
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let detail = match &err {
            EngineError::InvalidCredential => "Invalid app_api_key".to_string(),
            EngineError::QueueNotFound => "Queue not found".to_string(),
            EngineError::TokenNotFound => "Token not found".to_string(),
            EngineError::RateLimited { .. } => "Rate limit exceeded".to_string(),
            EngineError::DuplicateToken
            | EngineError::StoreConflict
            | EngineError::DeliveryFailure(_)
            | EngineError::Backend(_) => {
                tracing::error!(error = %err, "internal error while serving request");
                "Internal server error".to_string()
            }
        };
        Self {
            status: err.status_code(),
            detail,
            rate_limit: None,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

fn rate_limit_info<S>(room: &WaitingRoom<S>, key: &str) -> RateLimitInfo
where
    S: Spawn + Send + Sync + 'static,
{
    let limiter = room.rate_limiter();
    RateLimitInfo {
        limit: limiter.limit(),
        remaining: limiter.remaining(key),
        reset_at_secs: u64::try_from(limiter.reset_at_ms(key) / 1_000).unwrap_or(u64::MAX),
    }
}

/// Admit a visitor, subject to the admission rate limit.
///
/// The limiter runs before any credential or queue check, so callers over
/// the ceiling never reach the admission controller.
pub fn join<S>(
    room: &WaitingRoom<S>,
    client: &ClientIdentity,
    req: JoinRequest,
    mode: JoinMode,
) -> Result<JoinOutcome, ApiError>
where
    S: Spawn + Send + Sync + 'static,
{
    let key = client.client_key();
    if !room.rate_limiter().allowed(&key) {
        room.metrics().record_rate_limited();
        let info = rate_limit_info(room, &key);
        tracing::warn!(client = %key, "admission rate limit exceeded");
        let mut err = ApiError::from(EngineError::RateLimited {
            remaining: info.remaining,
        });
        err.rate_limit = Some(info);
        return Err(err);
    }
    let info = rate_limit_info(room, &key);
    let with_info = |err: EngineError| {
        let mut api = ApiError::from(err);
        api.rate_limit = Some(info);
        api
    };

    let Some(credential) = client.credential.as_deref().filter(|c| !c.is_empty()) else {
        return Err(ApiError {
            status: 401,
            detail: "Missing app_api_key".to_string(),
            rate_limit: Some(info),
        });
    };
    let participant = match mode {
        JoinMode::Real => room.admit(credential, req.queue_id, &req.visitor_id, req.redirect_url),
        JoinMode::Simulation => room.simulate(credential, req.queue_id, &req.visitor_id),
    }
    .map_err(with_info)?;

    Ok(JoinOutcome {
        participant: participant.into(),
        rate_limit: info,
    })
}

/// Look up a participant by token.
pub fn queue_status<S>(room: &WaitingRoom<S>, token: &str) -> Result<ParticipantResponse, ApiError>
where
    S: Spawn + Send + Sync + 'static,
{
    Ok(room.status(token)?.into())
}

/// Cancel a waiting participant by token.
pub fn cancel<S>(room: &WaitingRoom<S>, token: &str) -> Result<(), ApiError>
where
    S: Spawn + Send + Sync + 'static,
{
    room.cancel(token)?;
    Ok(())
}

/// List a queue's participants for its owning application.
pub fn list_participants<S>(
    room: &WaitingRoom<S>,
    credential: &str,
    queue_id: Uuid,
    state: Option<ParticipantState>,
    skip: usize,
    limit: usize,
) -> Result<Vec<ParticipantResponse>, ApiError>
where
    S: Spawn + Send + Sync + 'static,
{
    Ok(room
        .list(credential, queue_id, state, skip, limit)?
        .into_iter()
        .map(ParticipantResponse::from)
        .collect())
}

/// Operational counters for external monitoring.
pub fn metrics<S>(room: &WaitingRoom<S>) -> MetricsSnapshot
where
    S: Spawn + Send + Sync + 'static,
{
    room.metrics_snapshot()
}

/// Return a health payload.
pub const fn health() -> Health {
    Health { ok: true }
}
