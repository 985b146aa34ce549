//! Hold-to-aim state machine
//!
//! Priority each frame: a pending shot freezes the reticle, otherwise an
//! active hold shrinks the confidence radius, otherwise the reticle drifts.
//! Cooldown is tracked separately and only gates new presses.

use crate::consts::*;
use crate::ease_out_cubic;

/// Aim point and confidence radius in board space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSample {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Captured when the pointer goes down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldSession {
    pub start_time_ms: f64,
    pub start_x: f32,
    pub start_y: f32,
    pub start_radius: f32,
}

impl HoldSession {
    /// Hold progress in [0, 1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        ((now_ms - self.start_time_ms) / HOLD_SHRINK_DURATION_MS).clamp(0.0, 1.0) as f32
    }

    /// Aim at `now_ms`: position stays where the press happened
    pub fn sample(&self, now_ms: f64) -> AimSample {
        let eased = ease_out_cubic(self.progress(now_ms));
        AimSample {
            x: self.start_x,
            y: self.start_y,
            radius: self.start_radius + (PROB_RADIUS_MIN - self.start_radius) * eased,
        }
    }
}

/// Frozen aim shown while the server decides the throw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingShot {
    pub aim_x: f32,
    pub aim_y: f32,
    pub radius: f32,
}

impl From<AimSample> for PendingShot {
    fn from(s: AimSample) -> Self {
        Self {
            aim_x: s.x,
            aim_y: s.y,
            radius: s.radius,
        }
    }
}

/// Which rule governs the reticle this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimMode {
    Idle,
    Holding(HoldSession),
    Pending(PendingShot),
}

/// One-shot input flags for a frame (cleared after processing)
#[derive(Debug, Clone, Default)]
pub struct AimInput {
    /// Pointer-down or Space pressed
    pub press: bool,
    /// Pointer-up, pointer-cancel or Space released
    pub release: bool,
}

/// Result of advancing the controller one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimTick {
    pub sample: AimSample,
    /// Set when a hold ended this frame (by release or by timeout)
    pub released: Option<AimSample>,
}

#[derive(Debug, Clone)]
pub struct AimController {
    mode: AimMode,
    base_radius: f32,
    cooldown_until_ms: f64,
    /// Scales idle drift (reduced motion shrinks it)
    drift_scale: f32,
    last: AimSample,
}

impl Default for AimController {
    fn default() -> Self {
        Self::new()
    }
}

impl AimController {
    pub fn new() -> Self {
        Self {
            mode: AimMode::Idle,
            base_radius: PROB_RADIUS_START,
            cooldown_until_ms: f64::NEG_INFINITY,
            drift_scale: 1.0,
            last: AimSample {
                x: 0.0,
                y: 0.0,
                radius: PROB_RADIUS_START,
            },
        }
    }

    pub fn mode(&self) -> AimMode {
        self.mode
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.mode, AimMode::Holding(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.mode, AimMode::Pending(_))
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Most recent sample produced by `advance`
    pub fn last_sample(&self) -> AimSample {
        self.last
    }

    pub fn set_drift_scale(&mut self, scale: f32) {
        self.drift_scale = scale.clamp(0.0, 1.0);
    }

    /// Tighten the base radius as darts run out
    pub fn rescale(&mut self, darts_left: i32, darts_total: i32) {
        let fraction = if darts_total > 0 {
            (darts_left as f32 / darts_total as f32).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.base_radius = PROB_RADIUS_START * (0.6 + 0.4 * fraction);
    }

    pub fn in_cooldown(&self, now_ms: f64) -> bool {
        now_ms < self.cooldown_until_ms
    }

    pub fn start_cooldown(&mut self, now_ms: f64) {
        self.cooldown_until_ms = now_ms + COOLDOWN_MS;
    }

    /// Cosmetic "looking for a target" drift
    pub fn idle_sample(&self, now_ms: f64) -> AimSample {
        let x = IDLE_AMPLITUDE_X * self.drift_scale * (now_ms * IDLE_RATE_X).sin() as f32;
        let y = IDLE_AMPLITUDE_Y * self.drift_scale * (now_ms * IDLE_RATE_Y + 0.6).sin() as f32;
        let wobble = IDLE_RADIUS_WOBBLE * (now_ms * IDLE_RADIUS_RATE).sin() as f32;
        AimSample {
            x,
            y,
            radius: self.base_radius * (1.0 + wobble),
        }
    }

    /// Start a hold if allowed. `can_throw` folds in darts-left and the animating gate.
    pub fn press(&mut self, now_ms: f64, can_throw: bool) -> bool {
        if !can_throw || self.in_cooldown(now_ms) || self.mode != AimMode::Idle {
            return false;
        }
        let start = self.idle_sample(now_ms);
        self.mode = AimMode::Holding(HoldSession {
            start_time_ms: now_ms,
            start_x: start.x,
            start_y: start.y,
            start_radius: start.radius,
        });
        log::debug!("Hold started at ({:.3}, {:.3}) r={:.3}", start.x, start.y, start.radius);
        true
    }

    /// End a hold; returns the committed aim
    pub fn release(&mut self, now_ms: f64) -> Option<AimSample> {
        let AimMode::Holding(session) = self.mode else {
            return None;
        };
        self.mode = AimMode::Idle;
        Some(session.sample(now_ms))
    }

    /// Freeze the reticle on the aim that was sent to the server
    pub fn begin_pending(&mut self, shot: PendingShot) {
        self.mode = AimMode::Pending(shot);
    }

    /// Server answered (or failed); the reticle goes back to drifting
    pub fn resolve_pending(&mut self) -> Option<PendingShot> {
        match self.mode {
            AimMode::Pending(shot) => {
                self.mode = AimMode::Idle;
                Some(shot)
            }
            _ => None,
        }
    }

    /// Drop any hold or pending shot (a new game started)
    pub fn reset(&mut self) {
        self.mode = AimMode::Idle;
        self.cooldown_until_ms = f64::NEG_INFINITY;
    }

    /// Advance one frame: apply input, enforce forced release, produce the sample
    pub fn advance(&mut self, now_ms: f64, input: &AimInput, can_throw: bool) -> AimTick {
        if input.press {
            self.press(now_ms, can_throw);
        }

        let mut released = if input.release {
            self.release(now_ms)
        } else {
            None
        };

        if let AimMode::Holding(session) = self.mode {
            if session.progress(now_ms) >= 1.0 {
                log::debug!("Hold reached minimum radius, forcing release");
                released = self.release(now_ms);
            }
        }

        let sample = match self.mode {
            AimMode::Pending(shot) => AimSample {
                x: shot.aim_x,
                y: shot.aim_y,
                radius: shot.radius,
            },
            AimMode::Holding(session) => session.sample(now_ms),
            AimMode::Idle => released.unwrap_or_else(|| self.idle_sample(now_ms)),
        };
        self.last = sample;

        AimTick { sample, released }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn press() -> AimInput {
        AimInput {
            press: true,
            ..Default::default()
        }
    }

    fn release() -> AimInput {
        AimInput {
            release: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_press_captures_idle_aim() {
        let mut aim = AimController::new();
        let idle = aim.idle_sample(1000.0);
        aim.advance(1000.0, &press(), true);
        match aim.mode() {
            AimMode::Holding(s) => {
                assert_eq!(s.start_x, idle.x);
                assert_eq!(s.start_y, idle.y);
                assert_eq!(s.start_radius, idle.radius);
            }
            other => panic!("expected Holding, got {other:?}"),
        }
    }

    #[test]
    fn test_press_rejected_without_darts_or_in_cooldown() {
        let mut aim = AimController::new();
        assert!(!aim.press(0.0, false));
        aim.start_cooldown(0.0);
        assert!(!aim.press(100.0, true));
        assert!(aim.press(COOLDOWN_MS + 1.0, true));
    }

    #[test]
    fn test_hold_keeps_position_and_shrinks() {
        let mut aim = AimController::new();
        aim.advance(0.0, &press(), true);
        let a = aim.advance(300.0, &AimInput::default(), true).sample;
        let b = aim.advance(900.0, &AimInput::default(), true).sample;
        assert_eq!((a.x, a.y), (b.x, b.y));
        assert!(b.radius < a.radius);
    }

    #[test]
    fn test_forced_release_at_minimum() {
        let mut aim = AimController::new();
        aim.advance(0.0, &press(), true);
        let tick = aim.advance(HOLD_SHRINK_DURATION_MS, &AimInput::default(), true);
        let shot = tick.released.expect("hold should auto-release");
        assert!((shot.radius - PROB_RADIUS_MIN).abs() < 1e-6);
        assert_eq!(aim.mode(), AimMode::Idle);
    }

    #[test]
    fn test_zero_duration_hold_is_valid() {
        let mut aim = AimController::new();
        let input = AimInput {
            press: true,
            release: true,
        };
        let tick = aim.advance(50.0, &input, true);
        let shot = tick.released.expect("tap should throw");
        assert!((shot.radius - aim.idle_sample(50.0).radius).abs() < 1e-6);
    }

    #[test]
    fn test_pending_overrides_everything() {
        let mut aim = AimController::new();
        let shot = PendingShot {
            aim_x: 0.2,
            aim_y: -0.1,
            radius: 0.07,
        };
        aim.begin_pending(shot);
        // A press while pending cannot start a hold
        let tick = aim.advance(10.0, &press(), true);
        assert!(!aim.is_holding());
        assert_eq!(tick.sample, AimSample { x: 0.2, y: -0.1, radius: 0.07 });
        assert_eq!(aim.resolve_pending(), Some(shot));
        assert_eq!(aim.mode(), AimMode::Idle);
    }

    #[test]
    fn test_rescale_tracks_darts_left() {
        let mut aim = AimController::new();
        aim.rescale(10, 10);
        assert!((aim.base_radius() - 0.48).abs() < 1e-6);
        aim.rescale(5, 10);
        assert!((aim.base_radius() - 0.48 * 0.8).abs() < 1e-6);
        aim.rescale(0, 10);
        assert!((aim.base_radius() - 0.48 * 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_idle_stays_on_board() {
        let aim = AimController::new();
        for i in 0..2000 {
            let s = aim.idle_sample(i as f64 * 17.0);
            assert!(s.x.abs() < 1.0 && s.y.abs() < 1.0);
        }
    }

    proptest! {
        #[test]
        fn prop_hold_radius_non_increasing(
            start in 0.0f64..10_000.0,
            mut offsets in proptest::collection::vec(0.0f64..2000.0, 2..40),
        ) {
            offsets.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let mut aim = AimController::new();
            aim.advance(start, &press(), true);
            let mut previous = f32::INFINITY;
            for offset in offsets {
                let tick = aim.advance(start + offset, &AimInput::default(), true);
                let radius = tick.released.map(|s| s.radius).unwrap_or(tick.sample.radius);
                if !aim.is_holding() && tick.released.is_none() {
                    break;
                }
                prop_assert!(radius <= previous + 1e-6);
                previous = radius;
            }
        }

        #[test]
        fn prop_never_pending_and_holding(ops in proptest::collection::vec(0u8..4, 1..60)) {
            let mut aim = AimController::new();
            let mut now = 0.0;
            for op in ops {
                now += 120.0;
                match op {
                    0 => { aim.advance(now, &press(), true); }
                    1 => {
                        if let Some(s) = aim.advance(now, &release(), true).released {
                            aim.begin_pending(s.into());
                        }
                    }
                    2 => { aim.resolve_pending(); }
                    _ => { aim.advance(now, &AimInput::default(), true); }
                }
                prop_assert!(!(aim.is_holding() && aim.is_pending()));
            }
        }
    }

    #[test]
    fn test_full_hold_ends_at_minimum() {
        let mut aim = AimController::new();
        aim.advance(0.0, &press(), true);
        let mut last = None;
        let mut t = 0.0;
        while last.is_none() {
            t += 16.0;
            last = aim.advance(t, &AimInput::default(), true).released;
        }
        assert!((last.unwrap().radius - PROB_RADIUS_MIN).abs() < 1e-6);
    }
}
