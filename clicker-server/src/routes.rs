//! API route handlers.
//!
//! Each handler validates its inputs, runs one engine operation and returns
//! the full aggregate. Failures become [`ApiError`] bodies.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use clicker_core::{EngineError, GameSnapshot, SessionId, UpgradeView};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::ApiError;
use crate::metrics;
use crate::validation::{
    validate_click_count, validate_session_id, validate_upgrade_id, ValidationError,
};
use crate::AppState;

/// Body of a click request.
#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    /// Clicks to register; one when omitted.
    #[serde(default = "default_clicks")]
    pub clicks: u64,
}

impl Default for ClickRequest {
    fn default() -> Self {
        Self {
            clicks: default_clicks(),
        }
    }
}

fn default_clicks() -> u64 {
    1
}

/// Body of an upgrade purchase request.
#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    /// Upgrade to buy one level of.
    pub upgrade_id: String,
}

type ApiResult<T> = Result<T, ApiError>;

/// Start a new session.
#[tracing::instrument(name = "start_game", skip_all)]
pub async fn start_game(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<GameSnapshot>)> {
    let snapshot = state.engine.start()?;
    metrics::set_sessions(state.engine.store().len());
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Fetch a session's aggregate.
#[tracing::instrument(name = "get_game", skip_all, fields(session = %id))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GameSnapshot>> {
    let id = parse_session_id(id)?;
    Ok(Json(state.engine.load(&id)?))
}

/// Register manual clicks.
#[tracing::instrument(name = "click", skip_all, fields(session = %id))]
pub async fn click(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<GameSnapshot>> {
    let id = parse_session_id(id)?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ClickRequest::default()
    } else {
        parse_body::<ClickRequest>(&body).map_err(|e| reject_input(&state, &id, e))?
    };
    validate_click_count(request.clicks).map_err(|e| reject_input(&state, &id, e))?;

    let snapshot = state
        .engine
        .click(&id, request.clicks)
        .map_err(|e| rejected(&state, &id, e))?;
    metrics::record_clicks(request.clicks);
    metrics::record_achievements_unlocked(snapshot.newly_unlocked.len());
    Ok(Json(snapshot))
}

/// Credit passive income since the last tick.
#[tracing::instrument(name = "passive_tick", skip_all, fields(session = %id))]
pub async fn passive_tick(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GameSnapshot>> {
    let id = parse_session_id(id)?;
    let snapshot = state.engine.tick(&id).map_err(|e| rejected(&state, &id, e))?;
    metrics::record_achievements_unlocked(snapshot.newly_unlocked.len());
    Ok(Json(snapshot))
}

/// Buy one level of an upgrade.
#[tracing::instrument(name = "purchase_upgrade", skip_all, fields(session = %id))]
pub async fn purchase_upgrade(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<GameSnapshot>> {
    let id = parse_session_id(id)?;
    let request =
        parse_body::<UpgradeRequest>(&body).map_err(|e| reject_input(&state, &id, e))?;
    validate_upgrade_id(&request.upgrade_id).map_err(|e| reject_input(&state, &id, e))?;

    let snapshot = state
        .engine
        .purchase(&id, &request.upgrade_id)
        .map_err(|e| rejected(&state, &id, e))?;
    metrics::record_purchase(&request.upgrade_id);
    metrics::record_achievements_unlocked(snapshot.newly_unlocked.len());
    Ok(Json(snapshot))
}

/// Trade the current run for the next prestige level.
#[tracing::instrument(name = "prestige", skip_all, fields(session = %id))]
pub async fn prestige(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GameSnapshot>> {
    let id = parse_session_id(id)?;
    let snapshot = state
        .engine
        .prestige(&id)
        .map_err(|e| rejected(&state, &id, e))?;
    metrics::record_prestige();
    metrics::record_achievements_unlocked(snapshot.newly_unlocked.len());
    Ok(Json(snapshot))
}

/// List the upgrade catalog new sessions start from.
#[tracing::instrument(name = "list_upgrades", skip_all)]
pub async fn list_upgrades(State(state): State<AppState>) -> Json<Vec<UpgradeView>> {
    Json(
        state
            .engine
            .catalog()
            .upgrades()
            .iter()
            .map(UpgradeView::from)
            .collect(),
    )
}

fn parse_session_id(raw: String) -> Result<SessionId, ValidationError> {
    validate_session_id(&raw)?;
    Ok(SessionId::from(raw))
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ValidationError> {
    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
}

/// Turn an engine failure into a response, attaching the session's current
/// aggregate when the session exists.
fn rejected(state: &AppState, id: &SessionId, err: EngineError) -> ApiError {
    let game = match err {
        EngineError::SessionNotFound(_) | EngineError::Store(_) => None,
        _ => state.engine.load(id).ok(),
    };
    ApiError::from(err).with_game(game)
}

fn reject_input(state: &AppState, id: &SessionId, err: ValidationError) -> ApiError {
    ApiError::from(err).with_game(state.engine.load(id).ok())
}
