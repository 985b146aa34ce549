//! Carnival Darts - a hold-to-aim darts mini-game for the browser
//!
//! Core modules:
//! - `sim`: Deterministic gameplay pieces (PRNG, board geometry, aim, flight, sparkles)
//! - `texture`: Procedural pixel synthesis for the board face and background layers
//! - `net`: REST contract with the scoring server
//! - `hud`: Authoritative state mirror, toasts, round summary
//! - `app`: The per-frame pipeline tying everything together
//! - `session`: Async operations (fetch/new game/throw/leaderboard) on a shared `App`
//! - `scene`: Scene graph service seam; `renderer` is the WebGPU implementation

pub mod app;
pub mod hud;
pub mod leaderboard;
pub mod net;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod settings;
pub mod sim;
pub mod texture;

pub use app::{App, FrameReport};
pub use leaderboard::LeaderboardPanel;
pub use session::Session;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Confidence radius at the start of a game (board units)
    pub const PROB_RADIUS_START: f32 = 0.48;
    /// Smallest reachable confidence radius (end of a full hold)
    pub const PROB_RADIUS_MIN: f32 = 0.03;
    /// Time for a hold to shrink the radius from start to minimum
    pub const HOLD_SHRINK_DURATION_MS: f64 = 1500.0;
    /// Post-throw lockout
    pub const COOLDOWN_MS: f64 = 500.0;

    /// Idle drift amplitudes (board units, must stay below 1)
    pub const IDLE_AMPLITUDE_X: f32 = 0.55;
    pub const IDLE_AMPLITUDE_Y: f32 = 0.42;
    /// Idle drift angular rates (radians per ms)
    pub const IDLE_RATE_X: f64 = 0.0011;
    pub const IDLE_RATE_Y: f64 = 0.0017;
    /// Idle radius breathing (fraction of base radius)
    pub const IDLE_RADIUS_WOBBLE: f32 = 0.06;
    pub const IDLE_RADIUS_RATE: f64 = 0.0023;

    /// Dart flight duration
    pub const FLIGHT_DURATION_MS: f64 = 220.0;
    /// Cosmetic spin range (rad/s)
    pub const FLIGHT_SPIN_MIN: f32 = 8.0;
    pub const FLIGHT_SPIN_MAX: f32 = 12.0;

    /// Sparkle bursts
    pub const SPARKLE_PARTICLES: usize = 120;
    pub const SPARKLE_LIFE_MIN: f32 = 0.7;
    pub const SPARKLE_LIFE_MAX: f32 = 1.0;
    pub const SPARKLE_SPEED_MIN: f32 = 0.15;
    pub const SPARKLE_SPEED_MAX: f32 = 0.6;

    /// Delay between the last dart landing and the round summary
    pub const ROUND_SUMMARY_DELAY_MS: f64 = 900.0;
    /// Toast lifetime
    pub const TOAST_DURATION_MS: f64 = 2500.0;

    /// Darts per game when settings don't say otherwise
    pub const DEFAULT_DARTS_PER_GAME: u32 = 10;

    /// Dartboard face texture resolution
    pub const BOARD_TEXTURE_SIZE: u32 = 512;
}

/// Cubic ease-out: fast start, gentle landing
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_wrap_angle() {
        use std::f32::consts::{PI, TAU};
        assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
        assert!(wrap_angle(TAU).abs() < 1e-5);
    }
}
