//! Deterministic gameplay pieces
//!
//! Everything here is pure state advanced by explicit time values:
//! - No rendering, DOM or network dependencies
//! - Seeded RNG only
//! - Time always passed in (milliseconds or seconds), never read from a clock

pub mod aim;
pub mod board;
pub mod flight;
pub mod rng;
pub mod sparkle;

pub use aim::{AimController, AimInput, AimMode, AimSample, AimTick, HoldSession, PendingShot};
pub use board::{Ring, Score, classify, is_celebratory};
pub use flight::{DartFlight, DartPose, DartVariant, FlightEvent};
pub use rng::{SeededRng, fnv1a_32, resolve_seed};
pub use sparkle::{Sparkle, SparkleBurst, SparkleField};
