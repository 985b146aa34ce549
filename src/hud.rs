//! HUD state mirror
//!
//! Holds the last authoritative `GameState`, the animating gate, the epoch
//! counter, toasts and the round summary. Never touches the aim controller;
//! the app wires the two together.

use crate::consts::{ROUND_SUMMARY_DELAY_MS, TOAST_DURATION_MS};
use crate::leaderboard::LeaderboardRow;
use crate::net::{GameState, ThrowResult};

/// History entries shown in the HUD
pub const RECENT_THROWS: usize = 5;

/// Transient message
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub expires_at_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub total_score: i64,
    pub throws: usize,
    /// Highest-scoring segment of the round
    pub best: Option<String>,
    /// Where the score would land on the loaded leaderboard
    pub rank_hint: Option<usize>,
}

/// Everything the DOM layer needs for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HudView {
    pub score: i64,
    pub darts_left: i32,
    pub darts_total: i32,
    /// Newest first, e.g. "T20 (60)"
    pub recent: Vec<String>,
    /// Segment under the reticle
    pub hover: String,
    pub toast: Option<String>,
    pub summary: Option<RoundSummary>,
    pub leaderboard: Option<Vec<LeaderboardRow>>,
    pub fps: Option<u32>,
    pub can_throw: bool,
}

impl HudView {
    pub fn darts_text(&self) -> String {
        format!("{}/{}", self.darts_left, self.darts_total)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HudController {
    state: Option<GameState>,
    epoch: u64,
    animating: bool,
    toast: Option<Toast>,
    summary_due_ms: Option<f64>,
    summary_visible: bool,
    game_started_ms: f64,
}

impl HudController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Generation counter, bumped on every state replacement
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
    }

    pub fn darts_left(&self) -> i32 {
        self.state.as_ref().map_or(0, |s| s.darts_left)
    }

    /// Darts remain and no throw is in the air
    pub fn can_throw(&self) -> bool {
        self.darts_left() > 0 && !self.animating
    }

    /// Whole milliseconds since this client started the current game
    pub fn elapsed_ms(&self, now_ms: f64) -> u64 {
        (now_ms - self.game_started_ms).max(0.0).round() as u64
    }

    /// Swap in a fresh record from the server
    pub fn replace_state(&mut self, state: GameState, now_ms: f64) {
        self.epoch += 1;
        self.animating = false;
        self.summary_due_ms = None;
        self.summary_visible = state.is_finished();
        self.game_started_ms = now_ms;
        log::info!(
            "Game {} ({} of {} darts left, epoch {})",
            state.game_id,
            state.darts_left,
            state.darts_total,
            self.epoch
        );
        self.state = Some(state);
    }

    /// Fold a throw result into a new state record. Returns the updated state.
    pub fn apply_throw(&mut self, result: ThrowResult) -> Option<&GameState> {
        let next = self.state.as_ref()?.with_throw(result);
        self.state = Some(next);
        self.state.as_ref()
    }

    /// Reveal the summary after the final dart has had time to land
    pub fn schedule_summary(&mut self, now_ms: f64) {
        self.summary_due_ms = Some(now_ms + ROUND_SUMMARY_DELAY_MS);
    }

    pub fn summary_visible(&self) -> bool {
        self.summary_visible
    }

    pub fn show_toast(&mut self, message: impl Into<String>, now_ms: f64) {
        let message = message.into();
        log::warn!("Toast: {message}");
        self.toast = Some(Toast {
            message,
            expires_at_ms: now_ms + TOAST_DURATION_MS,
        });
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Expire toasts and reveal a due summary
    pub fn advance(&mut self, now_ms: f64) {
        if self.toast.as_ref().is_some_and(|t| now_ms >= t.expires_at_ms) {
            self.toast = None;
        }
        if self.summary_due_ms.is_some_and(|due| now_ms >= due) {
            self.summary_due_ms = None;
            self.summary_visible = true;
            log::info!("Round over: {} points", self.state.as_ref().map_or(0, |s| s.total_score));
        }
    }

    pub fn round_summary(&self) -> Option<RoundSummary> {
        if !self.summary_visible {
            return None;
        }
        let state = self.state.as_ref()?;
        let best = state
            .history
            .iter()
            .max_by_key(|t| t.segment.points)
            .filter(|t| t.segment.points > 0)
            .map(|t| t.segment.label.clone());
        Some(RoundSummary {
            total_score: state.total_score,
            throws: state.history.len(),
            best,
            rank_hint: None,
        })
    }

    pub fn recent_throws(&self) -> Vec<String> {
        self.state
            .as_ref()
            .map(|s| {
                s.history
                    .iter()
                    .rev()
                    .take(RECENT_THROWS)
                    .map(|t| format!("{} ({})", t.segment.label, t.segment.points))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Frames-per-second over a rolling 60-frame window
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    pub fn record(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample sits where the next write goes
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time_ms - oldest;
            if elapsed > 0.0 {
                let intervals = (self.frame_times.len() - 1) as f64;
                self.fps = (intervals * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::{AimPoint, HitPoint};
    use crate::net::Segment;

    fn game(darts: i32) -> GameState {
        GameState {
            game_id: "g".into(),
            seed32: Some(1),
            total_score: 0,
            darts_left: darts,
            darts_total: darts,
            throw_index: 0,
            history: Vec::new(),
        }
    }

    fn result(label: &str, points: i32, total: i64, left: i32, index: i32) -> ThrowResult {
        ThrowResult {
            aim: AimPoint { x: 0.0, y: 0.0, radius: 0.1 },
            hit: HitPoint { x: 0.0, y: 0.0 },
            segment: Segment { label: label.into(), points },
            total_score: total,
            darts_left: left,
            throw_index: index,
        }
    }

    #[test]
    fn test_replace_bumps_epoch_and_releases_gate() {
        let mut hud = HudController::new();
        hud.replace_state(game(10), 0.0);
        hud.set_animating(true);
        let before = hud.epoch();
        hud.replace_state(game(10), 5.0);
        assert_eq!(hud.epoch(), before + 1);
        assert!(!hud.is_animating());
        assert!(hud.can_throw());
    }

    #[test]
    fn test_apply_throw_and_recent() {
        let mut hud = HudController::new();
        hud.replace_state(game(3), 0.0);
        hud.apply_throw(result("T20", 60, 60, 2, 1));
        hud.apply_throw(result("S5", 5, 65, 1, 2));
        let state = hud.state().unwrap();
        assert_eq!(state.total_score, 65);
        assert_eq!(state.darts_left, 1);
        assert_eq!(hud.recent_throws(), vec!["S5 (5)", "T20 (60)"]);
    }

    #[test]
    fn test_summary_waits_for_delay() {
        let mut hud = HudController::new();
        hud.replace_state(game(1), 0.0);
        hud.apply_throw(result("DB", 50, 50, 0, 1));
        hud.schedule_summary(1000.0);
        hud.advance(1000.0 + ROUND_SUMMARY_DELAY_MS - 1.0);
        assert!(!hud.summary_visible());
        hud.advance(1000.0 + ROUND_SUMMARY_DELAY_MS);
        let summary = hud.round_summary().unwrap();
        assert_eq!(summary.total_score, 50);
        assert_eq!(summary.best.as_deref(), Some("DB"));
    }

    #[test]
    fn test_finished_game_shows_summary_immediately() {
        let mut hud = HudController::new();
        hud.replace_state(game(0), 0.0);
        assert!(hud.summary_visible());
        assert!(!hud.can_throw());
    }

    #[test]
    fn test_toast_expires() {
        let mut hud = HudController::new();
        hud.show_toast("Network error", 100.0);
        hud.advance(100.0 + TOAST_DURATION_MS - 1.0);
        assert!(hud.toast().is_some());
        hud.advance(100.0 + TOAST_DURATION_MS);
        assert!(hud.toast().is_none());
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::default();
        for i in 1..=120 {
            fps.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(fps.fps(), 60);
    }
}
