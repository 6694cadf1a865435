//! Explosion particles (visual only, no gameplay effect)

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Rgb, direction};

/// Velocity damping applied every tick
pub const PARTICLE_DAMPING: f32 = 0.95;

/// Burst sizes
pub const ENEMY_BURST: usize = 15;
pub const BOSS_BURST: usize = 30;
pub const PLAYER_BURST: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    /// Ticks remaining
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

impl Particle {
    pub fn spawn<R: Rng>(rng: &mut R, pos: Vec2, color: Rgb) -> Self {
        let angle = rng.random_range(0.0..TAU);
        let speed = rng.random_range(2.0..8.0);
        let life = rng.random_range(15..=30);
        Self {
            pos,
            vel: direction(angle) * speed,
            color,
            life,
            max_life: life,
            size: rng.random_range(2..=5) as f32,
        }
    }

    /// Step one tick. Returns false once life is exhausted.
    pub fn advance(&mut self) -> bool {
        self.pos += self.vel;
        self.vel *= PARTICLE_DAMPING;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }

    /// Remaining life in [0, 1] (render fade)
    pub fn fade(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Push `count` particles at `pos`, never growing the pool past `cap`
pub fn burst<R: Rng>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    pos: Vec2,
    color: Rgb,
    count: usize,
    cap: usize,
) {
    let room = cap.saturating_sub(particles.len());
    for _ in 0..count.min(room) {
        particles.push(Particle::spawn(rng, pos, color));
    }
}
