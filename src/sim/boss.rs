//! The wave boss: scripted entry, lateral sweep and rotating attack patterns

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::Player;
use super::projectile::Bullet;
use crate::{Field, angle_to};

pub const BOSS_RADIUS: f32 = 60.0;
/// Spawn height above the field
const SPAWN_Y: f32 = -100.0;
/// Resting height once on screen
const REST_Y: f32 = 100.0;
const ENTRY_SPEED: f32 = 2.0;
/// Oscillation phase advance per tick
const SWEEP_RATE: f32 = 0.02;
const SWEEP_AMPLITUDE: f32 = 200.0;
/// Milliseconds each attack pattern lasts
pub const PATTERN_DURATION_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Five-bullet downward fan
    Fan,
    /// One bullet at each living player
    Aimed,
    /// Single bullets along a rotating angle
    Spiral,
}

impl AttackPattern {
    pub fn index(self) -> u8 {
        match self {
            AttackPattern::Fan => 0,
            AttackPattern::Aimed => 1,
            AttackPattern::Spiral => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            AttackPattern::Fan => AttackPattern::Aimed,
            AttackPattern::Aimed => AttackPattern::Spiral,
            AttackPattern::Spiral => AttackPattern::Fan,
        }
    }

    /// Milliseconds between volleys
    pub fn interval_ms(self) -> u64 {
        match self {
            AttackPattern::Fan => 300,
            AttackPattern::Aimed => 500,
            AttackPattern::Spiral => 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub radius: f32,
    pub points: u64,
    pub entering: bool,
    /// Sweep phase; also drives the spiral angle
    pub phase: f32,
    pub pattern: AttackPattern,
    /// When the current pattern began
    pub pattern_started: u64,
    pub last_shot: Option<u64>,
}

impl Boss {
    /// A boss scaled to wave `wave`
    pub fn new(wave: u32, field: &Field) -> Self {
        let health = i32::try_from(wave)
            .unwrap_or(i32::MAX)
            .saturating_mul(100)
            .saturating_add(500);
        Self {
            pos: Vec2::new(field.center_x(), SPAWN_Y),
            health,
            max_health: health,
            radius: BOSS_RADIUS,
            points: 1000 + 200 * u64::from(wave),
            entering: true,
            phase: 0.0,
            pattern: AttackPattern::Fan,
            pattern_started: 0,
            last_shot: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Advance one tick. The boss keeps moving even with no one to shoot.
    pub fn update(&mut self, now: u64, field: &Field) -> bool {
        if self.entering {
            self.pos.y += ENTRY_SPEED;
            if self.pos.y >= REST_Y {
                self.entering = false;
                self.pattern_started = now;
            }
            return self.is_alive();
        }

        self.phase += SWEEP_RATE;
        self.pos.x = field.center_x() + self.phase.sin() * SWEEP_AMPLITUDE;

        if now.saturating_sub(self.pattern_started) > PATTERN_DURATION_MS {
            self.pattern = self.pattern.next();
            self.pattern_started = now;
            log::debug!("Boss switched to pattern {}", self.pattern.index());
        }
        self.is_alive()
    }

    pub fn try_shoot(&mut self, alive_players: &[&Player], now: u64) -> Vec<Bullet> {
        if self.entering || alive_players.is_empty() {
            return Vec::new();
        }
        if let Some(last) = self.last_shot {
            if now.saturating_sub(last) < self.pattern.interval_ms() {
                return Vec::new();
            }
        }
        self.last_shot = Some(now);

        let muzzle = self.pos + Vec2::new(0.0, self.radius);
        match self.pattern {
            AttackPattern::Fan => (0..5)
                .map(|i| {
                    let angle = FRAC_PI_2 + (i as f32 - 2.0) * 0.3;
                    Bullet::enemy(muzzle, angle, 4.0, 15)
                })
                .collect(),
            AttackPattern::Aimed => alive_players
                .iter()
                .map(|p| Bullet::enemy(muzzle, angle_to(self.pos, p.pos), 6.0, 20))
                .collect(),
            AttackPattern::Spiral => vec![Bullet::enemy(muzzle, self.phase * 5.0, 3.0, 10)],
        }
    }
}
