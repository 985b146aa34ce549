//! Dartboard geometry and hit classification
//!
//! Board-normalized space: center at origin, +Y up, board edge at radius 1.
//! Band radii are fractions of that radius and are shared by the face painter
//! and the classifier so the two can never disagree.

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::wrap_angle;

/// Number of scoring wedges
pub const WEDGE_COUNT: usize = 20;
/// Canonical numbering, clockwise from the top
pub const WEDGE_ORDER: [u8; WEDGE_COUNT] = [
    20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5,
];
pub const WEDGE_ANGLE: f32 = TAU / WEDGE_COUNT as f32;
pub const HALF_WEDGE: f32 = WEDGE_ANGLE / 2.0;
/// Canvas angle (clockwise, 0 = +X) where wedge 0 starts, so wedge 20 is centered at top
pub const FIRST_WEDGE_START: f32 = -FRAC_PI_2 - HALF_WEDGE;

/// Outer edge of the double ring (edge of the scoring area)
pub const DOUBLE_OUTER: f32 = 0.82;
pub const DOUBLE_INNER: f32 = 0.781;
pub const TREBLE_OUTER: f32 = 0.516;
pub const TREBLE_INNER: f32 = 0.478;
/// Outer bull (25)
pub const SINGLE_BULL_RADIUS: f32 = 0.077;
/// Bullseye (50)
pub const DOUBLE_BULL_RADIUS: f32 = 0.031;
/// Radius at which the wedge numerals are centered
pub const NUMBER_RADIUS: f32 = 0.91;

/// Points at or above which a throw earns a sparkle burst
pub const CELEBRATION_POINTS: i32 = 50;

/// Radial band a point falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ring {
    DoubleBull,
    SingleBull,
    InnerSingle,
    Treble,
    OuterSingle,
    Double,
    /// Outside the scoring area (number ring or off the board)
    Miss,
}

impl Ring {
    pub fn at_radius(r: f32) -> Self {
        if r <= DOUBLE_BULL_RADIUS {
            Ring::DoubleBull
        } else if r <= SINGLE_BULL_RADIUS {
            Ring::SingleBull
        } else if r < TREBLE_INNER {
            Ring::InnerSingle
        } else if r <= TREBLE_OUTER {
            Ring::Treble
        } else if r < DOUBLE_INNER {
            Ring::OuterSingle
        } else if r <= DOUBLE_OUTER {
            Ring::Double
        } else {
            Ring::Miss
        }
    }
}

/// A classified hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub ring: Ring,
    /// Wedge number (1-20); meaningless for bulls and misses
    pub number: u8,
}

impl Score {
    pub fn points(&self) -> i32 {
        let n = self.number as i32;
        match self.ring {
            Ring::DoubleBull => 50,
            Ring::SingleBull => 25,
            Ring::InnerSingle | Ring::OuterSingle => n,
            Ring::Treble => 3 * n,
            Ring::Double => 2 * n,
            Ring::Miss => 0,
        }
    }

    pub fn label(&self) -> String {
        match self.ring {
            Ring::DoubleBull => "DB".to_string(),
            Ring::SingleBull => "SB".to_string(),
            Ring::InnerSingle | Ring::OuterSingle => format!("S{}", self.number),
            Ring::Treble => format!("T{}", self.number),
            Ring::Double => format!("D{}", self.number),
            Ring::Miss => "MISS".to_string(),
        }
    }
}

/// Wedge index (0 = the "20" wedge) containing a board-space point
pub fn wedge_index(x: f32, y: f32) -> usize {
    // Canvas angles grow clockwise with +Y pointing down
    let canvas_angle = (-y).atan2(x);
    let from_start = wrap_angle(canvas_angle - FIRST_WEDGE_START);
    ((from_start / WEDGE_ANGLE) as usize) % WEDGE_COUNT
}

/// Center angle of wedge `index` in board space (counter-clockwise from +X)
pub fn wedge_center_angle(index: usize) -> f32 {
    let canvas = FIRST_WEDGE_START + HALF_WEDGE + index as f32 * WEDGE_ANGLE;
    -canvas
}

/// Classify a board-space point
pub fn classify(x: f32, y: f32) -> Score {
    let ring = Ring::at_radius(x.hypot(y));
    Score {
        ring,
        number: WEDGE_ORDER[wedge_index(x, y)],
    }
}

/// Whether a server-reported segment deserves a sparkle burst
pub fn is_celebratory(points: i32) -> bool {
    points >= CELEBRATION_POINTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_is_at_top() {
        assert_eq!(WEDGE_ORDER[wedge_index(0.0, 0.6)], 20);
        assert_eq!(WEDGE_ORDER[wedge_index(0.6, 0.0)], 6);
        assert_eq!(WEDGE_ORDER[wedge_index(0.0, -0.6)], 3);
        assert_eq!(WEDGE_ORDER[wedge_index(-0.6, 0.0)], 11);
    }

    #[test]
    fn test_wedge_center_round_trips() {
        for i in 0..WEDGE_COUNT {
            let a = wedge_center_angle(i);
            let (x, y) = (0.6 * a.cos(), 0.6 * a.sin());
            assert_eq!(wedge_index(x, y), i, "wedge {i}");
        }
    }

    #[test]
    fn test_classify_rings() {
        assert_eq!(classify(0.0, 0.0).label(), "DB");
        assert_eq!(classify(0.0, 0.0).points(), 50);
        assert_eq!(classify(0.0, 0.05).label(), "SB");
        assert_eq!(classify(0.0, 0.3).label(), "S20");
        let treble = classify(0.0, (TREBLE_INNER + TREBLE_OUTER) / 2.0);
        assert_eq!(treble.label(), "T20");
        assert_eq!(treble.points(), 60);
        let double = classify(0.0, (DOUBLE_INNER + DOUBLE_OUTER) / 2.0);
        assert_eq!(double.label(), "D20");
        assert_eq!(double.points(), 40);
        assert_eq!(classify(0.0, 0.95).ring, Ring::Miss);
        assert_eq!(classify(0.0, 0.95).points(), 0);
    }

    #[test]
    fn test_band_constants_are_ordered() {
        let bands = [
            DOUBLE_BULL_RADIUS,
            SINGLE_BULL_RADIUS,
            TREBLE_INNER,
            TREBLE_OUTER,
            DOUBLE_INNER,
            DOUBLE_OUTER,
            NUMBER_RADIUS,
        ];
        assert!(bands.windows(2).all(|w| w[0] < w[1]));
        assert!(NUMBER_RADIUS < 1.0);
    }

    #[test]
    fn test_celebration_threshold() {
        assert!(is_celebratory(60));
        assert!(is_celebratory(50));
        assert!(!is_celebratory(40));
    }
}
