//! Dart flight animation
//!
//! One dart mesh is reused for every throw. A flight eases the dart from its
//! rest pose to the server-reported hit point, keeps it pointed at the
//! target, and spins it about its own axis for show.

use glam::{Quat, Vec2, Vec3};

use super::rng::SeededRng;
use crate::consts::*;
use crate::ease_out_cubic;

/// Where the dart waits between throws
pub const DART_REST: Vec3 = Vec3::new(0.0, -1.15, 0.6);
/// Depth at which a landed dart sits in front of the board
pub const DART_STICK_Z: f32 = 0.05;
/// The dart model points along local +Y
pub const DART_FORWARD: Vec3 = Vec3::Y;

/// Flight accent color, alternating per throw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DartVariant {
    Red,
    Blue,
}

impl DartVariant {
    pub fn toggled(self) -> Self {
        match self {
            DartVariant::Red => DartVariant::Blue,
            DartVariant::Blue => DartVariant::Red,
        }
    }

    pub fn color(self) -> [f32; 4] {
        match self {
            DartVariant::Red => [0.92, 0.18, 0.22, 1.0],
            DartVariant::Blue => [0.2, 0.45, 0.95, 1.0],
        }
    }
}

/// Dart transform for the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DartPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl DartPose {
    pub fn rest() -> Self {
        Self {
            position: DART_REST,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Emitted by `advance` on the frame the dart arrives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightEvent {
    Landed { hit: Vec2, celebrate: bool },
}

#[derive(Debug, Clone)]
struct Flight {
    from: Vec3,
    to: Vec3,
    start_ms: f64,
    duration_ms: f64,
    spin_rate: f32,
    celebrate: bool,
}

#[derive(Debug, Clone)]
pub struct DartFlight {
    active: Option<Flight>,
    pose: DartPose,
    variant: DartVariant,
    next_variant: DartVariant,
    spin_scale: f32,
}

impl Default for DartFlight {
    fn default() -> Self {
        Self::new()
    }
}

impl DartFlight {
    pub fn new() -> Self {
        Self {
            active: None,
            pose: DartPose::rest(),
            variant: DartVariant::Blue,
            next_variant: DartVariant::Red,
            spin_scale: 1.0,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn pose(&self) -> DartPose {
        self.pose
    }

    pub fn variant(&self) -> DartVariant {
        self.variant
    }

    /// Reduced motion slows the spin
    pub fn set_spin_scale(&mut self, scale: f32) {
        self.spin_scale = scale.max(0.0);
    }

    /// Start a flight from the rest pose. Refused while another dart is in the air.
    pub fn launch(&mut self, hit: Vec2, now_ms: f64, rng: &mut SeededRng, celebrate: bool) -> bool {
        self.launch_from(DartPose::rest(), hit, FLIGHT_DURATION_MS, now_ms, rng, celebrate)
    }

    pub fn launch_from(
        &mut self,
        from: DartPose,
        hit: Vec2,
        duration_ms: f64,
        now_ms: f64,
        rng: &mut SeededRng,
        celebrate: bool,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.variant = self.next_variant;
        self.next_variant = self.next_variant.toggled();

        let to = Vec3::new(hit.x, hit.y, DART_STICK_Z);
        self.pose = DartPose {
            position: from.position,
            rotation: look_rotation(to - from.position, 0.0),
        };
        self.active = Some(Flight {
            from: from.position,
            to,
            start_ms: now_ms,
            duration_ms: duration_ms.max(1.0),
            spin_rate: rng.uniform(FLIGHT_SPIN_MIN, FLIGHT_SPIN_MAX) * self.spin_scale,
            celebrate,
        });
        true
    }

    /// Move the dart; reports `Landed` once on arrival
    pub fn advance(&mut self, now_ms: f64) -> Option<FlightEvent> {
        let flight = self.active.as_ref()?;

        let elapsed_ms = (now_ms - flight.start_ms).max(0.0);
        let t = (elapsed_ms / flight.duration_ms).min(1.0) as f32;
        let position = flight.from.lerp(flight.to, ease_out_cubic(t));

        let to_target = flight.to - position;
        let look = if to_target.length_squared() > 1e-8 {
            to_target
        } else {
            flight.to - flight.from
        };
        let spin = flight.spin_rate * (elapsed_ms / 1000.0) as f32;
        self.pose = DartPose {
            position,
            rotation: look_rotation(look, spin),
        };

        if t >= 1.0 {
            let event = FlightEvent::Landed {
                hit: flight.to.truncate(),
                celebrate: flight.celebrate,
            };
            self.active = None;
            return Some(event);
        }
        None
    }

    /// Back to rest, dropping any flight (new game)
    pub fn reset(&mut self) {
        self.active = None;
        self.pose = DartPose::rest();
    }
}

/// Point the dart's forward axis along `dir`, then spin about it
fn look_rotation(dir: Vec3, spin: f32) -> Quat {
    let Some(dir) = dir.try_normalize() else {
        return Quat::from_axis_angle(DART_FORWARD, spin);
    };
    Quat::from_rotation_arc(DART_FORWARD, dir) * Quat::from_axis_angle(DART_FORWARD, spin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_reaches_target_and_lands_once() {
        let mut rng = SeededRng::new(1);
        let mut flight = DartFlight::new();
        assert!(flight.launch(Vec2::new(0.3, 0.2), 0.0, &mut rng, false));
        assert!(flight.is_animating());

        assert_eq!(flight.advance(100.0), None);
        let event = flight.advance(FLIGHT_DURATION_MS);
        assert_eq!(
            event,
            Some(FlightEvent::Landed {
                hit: Vec2::new(0.3, 0.2),
                celebrate: false
            })
        );
        assert!(!flight.is_animating());
        let p = flight.pose().position;
        assert!((p - Vec3::new(0.3, 0.2, DART_STICK_Z)).length() < 1e-5);
        assert_eq!(flight.advance(FLIGHT_DURATION_MS + 16.0), None);
    }

    #[test]
    fn test_ease_out_front_loads_motion() {
        let mut rng = SeededRng::new(2);
        let mut flight = DartFlight::new();
        flight.launch(Vec2::new(0.0, 0.5), 0.0, &mut rng, false);
        flight.advance(FLIGHT_DURATION_MS / 2.0);
        let total = (Vec3::new(0.0, 0.5, DART_STICK_Z) - DART_REST).length();
        let done = (flight.pose().position - DART_REST).length();
        assert!(done / total > 0.5);
    }

    #[test]
    fn test_one_dart_at_a_time() {
        let mut rng = SeededRng::new(3);
        let mut flight = DartFlight::new();
        assert!(flight.launch(Vec2::ZERO, 0.0, &mut rng, false));
        assert!(!flight.launch(Vec2::ONE, 10.0, &mut rng, false));
    }

    #[test]
    fn test_variant_alternates() {
        let mut rng = SeededRng::new(4);
        let mut flight = DartFlight::new();
        let mut seen = Vec::new();
        for i in 0..4 {
            let t = i as f64 * 1000.0;
            flight.launch(Vec2::ZERO, t, &mut rng, false);
            seen.push(flight.variant());
            flight.advance(t + FLIGHT_DURATION_MS);
        }
        assert_eq!(
            seen,
            vec![DartVariant::Red, DartVariant::Blue, DartVariant::Red, DartVariant::Blue]
        );
    }

    #[test]
    fn test_dart_faces_target_mid_flight() {
        let mut rng = SeededRng::new(5);
        let mut flight = DartFlight::new();
        flight.launch(Vec2::new(-0.4, 0.4), 0.0, &mut rng, false);
        flight.advance(50.0);
        let pose = flight.pose();
        let forward = pose.rotation * DART_FORWARD;
        let want = (Vec3::new(-0.4, 0.4, DART_STICK_Z) - pose.position).normalize();
        assert!(forward.dot(want) > 0.999);
    }
}
