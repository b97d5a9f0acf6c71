//! HTTP routes.
//!
//! Every route addresses one session. GET routes read it from the
//! `session_id` query parameter, write routes from the JSON body; both fall
//! back to the default session when absent.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wrldkeep_domain::{
    AreaSnapshot, CalendarId, DomainError, GameLogEntry, GameLogSettings, InteractionId,
    LogPayload, PlayerStaticData, Position, SaveFile, SessionId, SubZoneId, ZoneId,
};

use crate::app::App;
use crate::use_cases::{
    discovery::{
        DiscoverInteractionsInput, DiscoverInteractionsResult, ExecuteInteractionInput,
        ExecuteInteractionResult,
    },
    game_log::AddGameLogInput,
    movement::{MoveToSubZoneInput, MoveToSubZoneResult, MoveToZoneInput, MoveToZoneResult},
    region::{GenerateRegionsInput, GenerateRegionsResult},
    save::ClearSaveResult,
    time::{InitClockInput, InitClockResult},
    EngineError,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/v1/world-map/regions/generate", post(generate_regions))
        .route("/api/v1/world-map/move", post(move_to_zone))
        .route("/api/v1/world-map/area/move-sub-zone", post(move_to_sub_zone))
        .route("/api/v1/world-map/clock/init", post(init_clock))
        .route("/api/v1/world-map/area/current", get(get_current_area))
        .route(
            "/api/v1/world-map/area/discover-interactions",
            post(discover_interactions),
        )
        .route(
            "/api/v1/world-map/area/execute-interaction",
            post(execute_interaction),
        )
        .route("/api/v1/saves/current", get(get_save).put(put_save))
        .route("/api/v1/saves/clear", post(clear_save))
        .route("/api/v1/game-logs", get(list_game_logs).post(add_game_log))
        .route(
            "/api/v1/game-logs/settings",
            get(get_game_log_settings).put(set_game_log_settings),
        )
        .route(
            "/api/v1/player/profile",
            get(get_player_profile).put(set_player_profile),
        )
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Default, Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

fn session_id(raw: Option<String>) -> Result<SessionId, ApiError> {
    match raw {
        Some(raw) => Ok(SessionId::new(raw)?),
        None => Ok(SessionId::default()),
    }
}

// =============================================================================
// World map
// =============================================================================

fn default_desired_count() -> usize {
    6
}

fn default_max_count() -> usize {
    10
}

#[derive(Debug, Deserialize)]
struct GenerateRegionsRequest {
    session_id: Option<String>,
    #[serde(default = "default_desired_count")]
    desired_count: usize,
    #[serde(default = "default_max_count")]
    max_count: usize,
    #[serde(default)]
    world_prompt: String,
    #[serde(default)]
    force_regenerate: bool,
    #[serde(default)]
    player_position: Option<Position>,
}

async fn generate_regions(
    State(app): State<Arc<App>>,
    Json(req): Json<GenerateRegionsRequest>,
) -> Result<Json<GenerateRegionsResult>, ApiError> {
    for (field, value) in [("desired_count", req.desired_count), ("max_count", req.max_count)] {
        if !(1..=10).contains(&value) {
            return Err(EngineError::Validation(format!("{field} must be between 1 and 10")).into());
        }
    }
    let result = app
        .use_cases
        .region
        .generate
        .execute(GenerateRegionsInput {
            session_id: session_id(req.session_id)?,
            desired_count: req.desired_count,
            max_count: req.max_count,
            world_prompt: req.world_prompt,
            force_regenerate: req.force_regenerate,
            player_position: req.player_position,
        })
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct MoveRequest {
    session_id: Option<String>,
    from_zone_id: Option<String>,
    to_zone_id: String,
}

async fn move_to_zone(
    State(app): State<Arc<App>>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveToZoneResult>, ApiError> {
    let result = app
        .use_cases
        .movement
        .move_to_zone
        .execute(MoveToZoneInput {
            session_id: session_id(req.session_id)?,
            from_zone_id: req.from_zone_id.map(ZoneId::from_string),
            to_zone_id: ZoneId::from_string(req.to_zone_id),
        })
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct MoveSubZoneRequest {
    session_id: Option<String>,
    to_sub_zone_id: String,
}

async fn move_to_sub_zone(
    State(app): State<Arc<App>>,
    Json(req): Json<MoveSubZoneRequest>,
) -> Result<Json<MoveToSubZoneResult>, ApiError> {
    let result = app
        .use_cases
        .movement
        .move_to_sub_zone
        .execute(MoveToSubZoneInput {
            session_id: session_id(req.session_id)?,
            to_sub_zone_id: SubZoneId::from_string(req.to_sub_zone_id),
        })
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct InitClockRequest {
    session_id: Option<String>,
    calendar: Option<String>,
}

async fn init_clock(
    State(app): State<Arc<App>>,
    Json(req): Json<InitClockRequest>,
) -> Result<Json<InitClockResult>, ApiError> {
    let calendar = req.calendar.map(CalendarId::new).transpose()?;
    let result = app
        .use_cases
        .time
        .init_clock
        .execute(InitClockInput {
            session_id: session_id(req.session_id)?,
            calendar,
        })
        .await?;
    Ok(Json(result))
}

async fn get_current_area(
    State(app): State<Arc<App>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<AreaSnapshot>, ApiError> {
    let area = app
        .use_cases
        .area
        .get_current
        .execute(&session_id(query.session_id)?)
        .await?;
    Ok(Json(area))
}

#[derive(Debug, Deserialize)]
struct DiscoverRequest {
    session_id: Option<String>,
    sub_zone_id: String,
    #[serde(default)]
    intent: String,
}

async fn discover_interactions(
    State(app): State<Arc<App>>,
    Json(req): Json<DiscoverRequest>,
) -> Result<Json<DiscoverInteractionsResult>, ApiError> {
    let result = app
        .use_cases
        .discovery
        .discover
        .execute(DiscoverInteractionsInput {
            session_id: session_id(req.session_id)?,
            sub_zone_id: SubZoneId::from_string(req.sub_zone_id),
            intent: req.intent,
        })
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    session_id: Option<String>,
    interaction_id: String,
}

async fn execute_interaction(
    State(app): State<Arc<App>>,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteInteractionResult>, ApiError> {
    let result = app
        .use_cases
        .discovery
        .execute
        .execute(ExecuteInteractionInput {
            session_id: session_id(req.session_id)?,
            interaction_id: InteractionId::from_string(req.interaction_id),
        })
        .await?;
    Ok(Json(result))
}

// =============================================================================
// Saves
// =============================================================================

async fn get_save(
    State(app): State<Arc<App>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SaveFile>, ApiError> {
    let save = app
        .use_cases
        .save
        .get
        .execute(&session_id(query.session_id)?)
        .await?;
    Ok(Json(save))
}

#[derive(Debug, Deserialize)]
struct PutSaveRequest {
    save_data: SaveFile,
}

/// Without a `session_id` query parameter the save targets its own session.
async fn put_save(
    State(app): State<Arc<App>>,
    Query(query): Query<SessionQuery>,
    Json(req): Json<PutSaveRequest>,
) -> Result<Json<SaveFile>, ApiError> {
    let target = match query.session_id {
        Some(raw) => SessionId::new(raw)?,
        None => req.save_data.session_id.clone(),
    };
    let save = app.use_cases.save.put.execute(&target, req.save_data).await?;
    Ok(Json(save))
}

#[derive(Debug, Default, Deserialize)]
struct SessionBody {
    session_id: Option<String>,
}

async fn clear_save(
    State(app): State<Arc<App>>,
    Json(req): Json<SessionBody>,
) -> Result<Json<ClearSaveResult>, ApiError> {
    let result = app
        .use_cases
        .save
        .clear
        .execute(&session_id(req.session_id)?)
        .await?;
    Ok(Json(result))
}

// =============================================================================
// Game logs
// =============================================================================

#[derive(Debug, Deserialize)]
struct AddGameLogRequest {
    session_id: Option<String>,
    kind: String,
    message: String,
    #[serde(default)]
    payload: LogPayload,
}

async fn add_game_log(
    State(app): State<Arc<App>>,
    Json(req): Json<AddGameLogRequest>,
) -> Result<Json<GameLogEntry>, ApiError> {
    let entry = app
        .use_cases
        .game_log
        .add
        .execute(AddGameLogInput {
            session_id: session_id(req.session_id)?,
            kind: req.kind,
            message: req.message,
            payload: req.payload,
        })
        .await?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
struct ListGameLogsQuery {
    session_id: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct GameLogListResponse {
    session_id: SessionId,
    items: Vec<GameLogEntry>,
}

async fn list_game_logs(
    State(app): State<Arc<App>>,
    Query(query): Query<ListGameLogsQuery>,
) -> Result<Json<GameLogListResponse>, ApiError> {
    let session_id = session_id(query.session_id)?;
    let items = app
        .use_cases
        .game_log
        .list
        .execute(&session_id, query.limit)
        .await?;
    Ok(Json(GameLogListResponse { session_id, items }))
}

#[derive(Debug, Serialize)]
struct GameLogSettingsResponse {
    session_id: SessionId,
    settings: GameLogSettings,
}

async fn get_game_log_settings(
    State(app): State<Arc<App>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<GameLogSettingsResponse>, ApiError> {
    let session_id = session_id(query.session_id)?;
    let settings = app.use_cases.game_log.settings.get(&session_id).await?;
    Ok(Json(GameLogSettingsResponse {
        session_id,
        settings,
    }))
}

#[derive(Debug, Deserialize)]
struct SetGameLogSettingsRequest {
    session_id: Option<String>,
    ai_fetch_limit: u32,
}

async fn set_game_log_settings(
    State(app): State<Arc<App>>,
    Json(req): Json<SetGameLogSettingsRequest>,
) -> Result<Json<GameLogSettingsResponse>, ApiError> {
    let session_id = session_id(req.session_id)?;
    let settings = app
        .use_cases
        .game_log
        .settings
        .set(&session_id, req.ai_fetch_limit)
        .await?;
    Ok(Json(GameLogSettingsResponse {
        session_id,
        settings,
    }))
}

// =============================================================================
// Player profile
// =============================================================================

async fn get_player_profile(
    State(app): State<Arc<App>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<PlayerStaticData>, ApiError> {
    let profile = app
        .use_cases
        .player
        .profile
        .get(&session_id(query.session_id)?)
        .await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
struct SetPlayerProfileRequest {
    session_id: Option<String>,
    #[serde(flatten)]
    profile: PlayerStaticData,
}

async fn set_player_profile(
    State(app): State<Arc<App>>,
    Json(req): Json<SetPlayerProfileRequest>,
) -> Result<Json<PlayerStaticData>, ApiError> {
    let profile = app
        .use_cases
        .player
        .profile
        .set(&session_id(req.session_id)?, req.profile)
        .await?;
    Ok(Json(profile))
}

// =============================================================================
// Errors
// =============================================================================

/// Engine failure rendered as `{"code", "message"}`.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            EngineError::ZoneNotFound(_) | EngineError::SubZoneNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            EngineError::ClockNotInitialized | EngineError::SessionMismatch(_) => {
                StatusCode::CONFLICT
            }
            EngineError::InvalidInteraction(_)
            | EngineError::InvalidGeneratedContent(_)
            | EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::StorageCorruption(_) | EngineError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            EngineError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                "Internal error".to_string()
            }
            EngineError::StorageCorruption(detail) => {
                tracing::error!(error = %detail, "Save storage is corrupted");
                self.0.to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            code: self.0.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError(e)
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError(e.into())
    }
}
