//! Celebration sparkle bursts
//!
//! Each burst is integrated on its own with explicit Euler steps and fades
//! linearly over its lifetime. The number of live bursts is capped; spawning
//! past the cap retires the oldest burst first.

use glam::{Vec2, Vec3};

use super::rng::SeededRng;
use crate::consts::*;

/// Depth of sparkles in front of the board
pub const SPARKLE_Z: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sparkle {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone)]
pub struct SparkleBurst {
    pub id: u32,
    pub particles: Vec<Sparkle>,
    /// Lifetime in seconds
    pub life: f32,
    /// Seconds since spawn
    pub age: f32,
    pub start_time_ms: f64,
}

impl SparkleBurst {
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / self.life).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.life
    }
}

#[derive(Debug, Clone)]
pub struct SparkleField {
    bursts: Vec<SparkleBurst>,
    max_bursts: usize,
    particles_per_burst: usize,
    next_id: u32,
}

impl Default for SparkleField {
    fn default() -> Self {
        Self::new(4, SPARKLE_PARTICLES)
    }
}

impl SparkleField {
    pub fn new(max_bursts: usize, particles_per_burst: usize) -> Self {
        Self {
            bursts: Vec::with_capacity(max_bursts),
            max_bursts: max_bursts.max(1),
            particles_per_burst,
            next_id: 1,
        }
    }

    pub fn bursts(&self) -> &[SparkleBurst] {
        &self.bursts
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    pub fn max_bursts(&self) -> usize {
        self.max_bursts
    }

    pub fn particles_per_burst(&self) -> usize {
        self.particles_per_burst
    }

    /// Spawn a burst at a board-space hit point; returns its id
    pub fn spawn(&mut self, at: Vec2, now_ms: f64, rng: &mut SeededRng) -> u32 {
        while self.bursts.len() >= self.max_bursts {
            let retired = self.bursts.remove(0);
            log::debug!("Sparkle cap reached, retiring burst {}", retired.id);
        }

        let origin = Vec3::new(at.x, at.y, SPARKLE_Z);
        let particles = (0..self.particles_per_burst)
            .map(|_| {
                let (dx, dy) = rng.unit_circle();
                let speed = rng.uniform(SPARKLE_SPEED_MIN, SPARKLE_SPEED_MAX);
                Sparkle {
                    position: origin,
                    velocity: Vec3::new(dx, dy, 0.0) * speed,
                }
            })
            .collect();

        let id = self.next_id;
        self.next_id += 1;
        self.bursts.push(SparkleBurst {
            id,
            particles,
            life: rng.uniform(SPARKLE_LIFE_MIN, SPARKLE_LIFE_MAX),
            age: 0.0,
            start_time_ms: now_ms,
        });
        id
    }

    /// Integrate all bursts by `dt` seconds and drop the expired ones
    pub fn advance(&mut self, dt: f32) {
        for burst in &mut self.bursts {
            burst.age += dt;
            for p in &mut burst.particles {
                p.position += p.velocity * dt;
            }
        }
        self.bursts.retain(|b| !b.is_expired());
    }

    pub fn clear(&mut self) {
        self.bursts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_lifecycle() {
        let mut rng = SeededRng::new(9);
        let mut field = SparkleField::new(4, SPARKLE_PARTICLES);
        let id = field.spawn(Vec2::new(0.0, 0.5), 0.0, &mut rng);
        assert_eq!(field.bursts().len(), 1);
        assert_eq!(field.bursts()[0].id, id);
        assert_eq!(field.bursts()[0].particles.len(), SPARKLE_PARTICLES);

        let life = field.bursts()[0].life;
        assert!((SPARKLE_LIFE_MIN..SPARKLE_LIFE_MAX).contains(&life));

        field.advance(life * 0.5);
        let opacity = field.bursts()[0].opacity();
        assert!((opacity - 0.5).abs() < 1e-4);

        field.advance(life * 0.6);
        assert!(field.is_empty());
    }

    #[test]
    fn test_particles_move_outward() {
        let mut rng = SeededRng::new(10);
        let mut field = SparkleField::new(1, 16);
        field.spawn(Vec2::ZERO, 0.0, &mut rng);
        field.advance(0.1);
        for p in &field.bursts()[0].particles {
            let dist = p.position.truncate().length();
            let speed = p.velocity.length();
            assert!((dist - speed * 0.1).abs() < 1e-5);
            assert!(speed >= SPARKLE_SPEED_MIN && speed <= SPARKLE_SPEED_MAX);
        }
    }

    #[test]
    fn test_cap_retires_oldest() {
        let mut rng = SeededRng::new(11);
        let mut field = SparkleField::new(3, 8);
        let ids: Vec<u32> = (0..5)
            .map(|i| field.spawn(Vec2::ZERO, i as f64, &mut rng))
            .collect();
        assert_eq!(field.bursts().len(), 3);
        let alive: Vec<u32> = field.bursts().iter().map(|b| b.id).collect();
        assert_eq!(alive, ids[2..].to_vec());
    }
}
