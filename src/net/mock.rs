//! In-memory scoring server for tests

use std::cell::{Cell, RefCell};

use super::protocol::{AimPoint, HitPoint};
use super::{
    ApiError, GameApi, GameState, LeaderboardEntry, NewGameRequest, Segment, ThrowRequest,
    ThrowResult,
};
use crate::sim::classify;

/// Scores throws exactly at the aim point with the client classifier
#[derive(Default)]
pub struct MockApi {
    state: RefCell<Option<GameState>>,
    pub seed32: Cell<Option<u32>>,
    pub fail_throws: Cell<bool>,
    pub fail_all: Cell<bool>,
    pub leaderboard_entries: RefCell<Vec<LeaderboardEntry>>,
    games_created: Cell<u32>,
    pub state_calls: Cell<u32>,
    pub new_game_calls: Cell<u32>,
    pub throw_calls: Cell<u32>,
    pub leaderboard_calls: Cell<u32>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a game already on the server
    pub fn with_game(state: GameState) -> Self {
        let api = Self::default();
        *api.state.borrow_mut() = Some(state);
        api
    }

    pub fn server_state(&self) -> Option<GameState> {
        self.state.borrow().clone()
    }

    fn check_down(&self) -> Result<(), ApiError> {
        if self.fail_all.get() {
            Err(ApiError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

impl GameApi for MockApi {
    async fn fetch_state(&self) -> Result<Option<GameState>, ApiError> {
        bump(&self.state_calls);
        self.check_down()?;
        Ok(self.state.borrow().clone())
    }

    async fn new_game(&self, request: &NewGameRequest) -> Result<GameState, ApiError> {
        bump(&self.new_game_calls);
        self.check_down()?;
        bump(&self.games_created);
        let state = GameState {
            game_id: format!("game-{}", self.games_created.get()),
            seed32: self.seed32.get(),
            total_score: 0,
            darts_left: request.darts_total as i32,
            darts_total: request.darts_total as i32,
            throw_index: 0,
            history: Vec::new(),
        };
        *self.state.borrow_mut() = Some(state.clone());
        Ok(state)
    }

    async fn throw(&self, request: &ThrowRequest) -> Result<ThrowResult, ApiError> {
        bump(&self.throw_calls);
        self.check_down()?;
        if self.fail_throws.get() {
            return Err(ApiError::Server("Throw rejected".to_string()));
        }

        let mut slot = self.state.borrow_mut();
        let state = slot
            .as_mut()
            .filter(|s| s.game_id == request.game_id)
            .ok_or_else(|| ApiError::Server("No active game".to_string()))?;
        if state.darts_left <= 0 {
            return Err(ApiError::Server("No darts left".to_string()));
        }

        let score = classify(request.aim_x, request.aim_y);
        let result = ThrowResult {
            aim: AimPoint {
                x: request.aim_x,
                y: request.aim_y,
                radius: request.radius,
            },
            hit: HitPoint {
                x: request.aim_x,
                y: request.aim_y,
            },
            segment: Segment {
                label: score.label(),
                points: score.points(),
            },
            total_score: state.total_score + score.points() as i64,
            darts_left: state.darts_left - 1,
            throw_index: state.throw_index + 1,
        };
        *state = state.with_throw(result.clone());
        Ok(result)
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        bump(&self.leaderboard_calls);
        self.check_down()?;
        Ok(self.leaderboard_entries.borrow().clone())
    }
}
