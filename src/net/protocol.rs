//! Wire types for the scoring server
//!
//! All bodies are JSON with camelCase field names. Every response is wrapped
//! in an `{ok, ...}` envelope; `ok: false` carries an optional `error`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ApiError;

pub const STATE_PATH: &str = "/api/game/state";
pub const NEW_GAME_PATH: &str = "/api/game/new";
pub const THROW_PATH: &str = "/api/game/throw";
pub const LEADERBOARD_PATH: &str = "/api/leaderboard";

/// Authoritative game record, replaced wholesale on every response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub game_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed32: Option<u32>,
    pub total_score: i64,
    pub darts_left: i32,
    pub darts_total: i32,
    pub throw_index: i32,
    #[serde(default)]
    pub history: Vec<ThrowResult>,
}

impl GameState {
    /// Visual seed: server value or a hash of the game id
    pub fn resolved_seed(&self) -> u32 {
        crate::sim::resolve_seed(self.seed32, &self.game_id)
    }

    pub fn is_finished(&self) -> bool {
        self.darts_left <= 0
    }

    /// New record with a throw folded in
    pub fn with_throw(&self, result: ThrowResult) -> GameState {
        let (total_score, darts_left, throw_index) =
            (result.total_score, result.darts_left.max(0), result.throw_index);
        let mut history = self.history.clone();
        history.push(result);
        GameState {
            game_id: self.game_id.clone(),
            seed32: self.seed32,
            total_score,
            darts_left,
            darts_total: self.darts_total,
            throw_index,
            history,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPoint {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub label: String,
    pub points: i32,
}

/// One scored throw as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrowResult {
    pub aim: AimPoint,
    pub hit: HitPoint,
    pub segment: Segment,
    pub total_score: i64,
    pub darts_left: i32,
    pub throw_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    pub darts_total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrowRequest {
    pub game_id: String,
    pub aim_x: f32,
    pub aim_y: f32,
    pub radius: f32,
    pub client_elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub score: i64,
}

fn server_error(error: Option<String>) -> ApiError {
    ApiError::Server(error.unwrap_or_else(|| "Request failed".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct StateEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub state: Option<GameState>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StateEnvelope {
    /// `{ok: false}` means there is no live game
    pub fn into_live_state(self) -> Result<Option<GameState>, ApiError> {
        match (self.ok, self.state) {
            (true, Some(state)) => Ok(Some(state)),
            (true, None) => Err(ApiError::Decode("missing state".to_string())),
            (false, _) => Ok(None),
        }
    }

    pub fn into_state(self) -> Result<GameState, ApiError> {
        match (self.ok, self.state) {
            (true, Some(state)) => Ok(state),
            (true, None) => Err(ApiError::Decode("missing state".to_string())),
            (false, _) => Err(server_error(self.error)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ThrowEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<ThrowResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ThrowEnvelope {
    pub fn into_result(self) -> Result<ThrowResult, ApiError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ApiError::Decode("missing result".to_string())),
            (false, _) => Err(server_error(self.error)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub entries: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LeaderboardEnvelope {
    pub fn into_entries(self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        if self.ok {
            Ok(self.entries)
        } else {
            Err(server_error(self.error))
        }
    }
}

/// Decode an envelope. Error statuses still carry `{ok: false}` bodies; only
/// when the body is unreadable does the HTTP status become the error.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    match serde_json::from_str::<T>(body) {
        Ok(envelope) => Ok(envelope),
        Err(e) if (200..300).contains(&status) => Err(ApiError::Decode(e.to_string())),
        Err(_) => Err(ApiError::Status(status)),
    }
}
