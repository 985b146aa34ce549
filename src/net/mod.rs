//! REST contract with the scoring server
//!
//! `GameApi` is the seam the session drives; the browser build talks through
//! `fetch`, the native build through `ureq`, and tests through a mock.

pub mod http;
#[cfg(test)]
pub mod mock;
pub mod protocol;

pub use protocol::{
    GameState, LeaderboardEntry, NewGameRequest, Segment, ThrowRequest, ThrowResult,
};

use thiserror::Error;

/// Anything that can go wrong talking to the server
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Server(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// The four server operations
#[allow(async_fn_in_trait)]
pub trait GameApi {
    /// Current game, or `None` when there is no live game
    async fn fetch_state(&self) -> Result<Option<GameState>, ApiError>;

    async fn new_game(&self, request: &NewGameRequest) -> Result<GameState, ApiError>;

    async fn throw(&self, request: &ThrowRequest) -> Result<ThrowResult, ApiError>;

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError>;
}

/// Join the configured base (empty = same origin) with an endpoint path
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        assert_eq!(endpoint("", protocol::STATE_PATH), "/api/game/state");
        assert_eq!(
            endpoint("http://localhost:3000/", protocol::THROW_PATH),
            "http://localhost:3000/api/game/throw"
        );
    }

    #[test]
    fn test_errors_read_as_toasts() {
        assert_eq!(ApiError::Server("No darts left".into()).to_string(), "No darts left");
        assert_eq!(ApiError::Status(503).to_string(), "Server returned HTTP 503");
    }
}
