//! Player ships: movement, firing, damage and power-up effects

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::Controls;
use super::powerup::{ActiveEffects, EffectKind, HEALTH_PICKUP_AMOUNT, PowerUpKind};
use super::projectile::Bullet;
use crate::{Field, Rgb, palette, sanitize_position};

pub const PLAYER_RADIUS: f32 = 20.0;
pub const BASE_SPEED: f32 = 5.0;
pub const BASE_DAMAGE: i32 = 10;
/// Milliseconds between shots before upgrades
pub const BASE_FIRE_INTERVAL_MS: u64 = 200;
pub const BASE_MAX_HEALTH: i32 = 100;

/// Per-level upgrade increments
const SPEED_PER_LEVEL: f32 = 0.5;
const DAMAGE_PER_LEVEL: i32 = 5;
const FIRE_INTERVAL_PER_LEVEL_MS: u64 = 20;
const HEALTH_PER_LEVEL: i32 = 20;

/// Spread-shot angular offsets (radians)
const SPREAD_OFFSETS: [f32; 3] = [-0.3, 0.0, 0.3];

/// Purchased ship upgrade levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub fire_rate: u32,
    #[serde(default)]
    pub health: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Local slot (0..4)
    pub slot: u8,
    pub pos: Vec2,
    /// Facing angle (radians)
    pub angle: f32,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub upgrades: Upgrades,
    pub last_shot: Option<u64>,
    pub score: u64,
    pub effects: ActiveEffects,
    pub color: Rgb,
}

impl Player {
    pub fn new(slot: u8, pos: Vec2, upgrades: Upgrades) -> Self {
        let max_health = BASE_MAX_HEALTH + upgrades.health as i32 * HEALTH_PER_LEVEL;
        Self {
            slot,
            pos,
            angle: -std::f32::consts::FRAC_PI_2, // facing up
            radius: PLAYER_RADIUS,
            health: max_health,
            max_health,
            upgrades,
            last_shot: None,
            score: 0,
            effects: ActiveEffects::default(),
            color: palette::PLAYER_COLORS[slot as usize % palette::PLAYER_COLORS.len()],
        }
    }

    /// Standard spawn point for a slot
    pub fn start_position(slot: usize, field: &Field) -> Vec2 {
        let (w, h) = (field.width, field.height);
        match slot {
            0 => Vec2::new(w / 2.0, h - 100.0),
            1 => Vec2::new(w / 3.0, h - 100.0),
            2 => Vec2::new(2.0 * w / 3.0, h - 100.0),
            _ => Vec2::new(w / 2.0, h - 150.0),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn speed(&self) -> f32 {
        BASE_SPEED + self.upgrades.speed as f32 * SPEED_PER_LEVEL
    }

    pub fn damage(&self) -> i32 {
        let damage = BASE_DAMAGE + self.upgrades.damage as i32 * DAMAGE_PER_LEVEL;
        if self.effects.is_active(EffectKind::DamageBoost) {
            damage * 2
        } else {
            damage
        }
    }

    /// Current minimum gap between shots (ms)
    pub fn fire_interval(&self) -> u64 {
        let interval = BASE_FIRE_INTERVAL_MS
            .saturating_sub(self.upgrades.fire_rate as u64 * FIRE_INTERVAL_PER_LEVEL_MS);
        if self.effects.is_active(EffectKind::RapidFire) {
            interval / 2
        } else {
            interval
        }
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Apply one tick of movement and aiming, then expire effects
    pub fn update(&mut self, controls: &Controls, now: u64, field: &Field) {
        let step = controls.movement.normalize_or_zero() * self.speed();
        let moved = field.clamp_inset(self.pos + step, self.radius);
        self.pos = sanitize_position(moved, Player::start_position(self.slot as usize, field));

        // Facing persists when there is nothing to aim at
        if controls.aim != Vec2::ZERO {
            self.angle = controls.aim.y.atan2(controls.aim.x);
        }

        self.effects.expire(now);
    }

    /// Fire if the rate gate allows it
    pub fn shoot(&mut self, now: u64) -> Vec<Bullet> {
        if let Some(last) = self.last_shot {
            if now.saturating_sub(last) < self.fire_interval() {
                return Vec::new();
            }
        }
        self.last_shot = Some(now);

        let damage = self.damage();
        if self.effects.is_active(EffectKind::SpreadShot) {
            SPREAD_OFFSETS
                .iter()
                .map(|offset| Bullet::player(self.pos, self.angle + offset, damage, self.slot))
                .collect()
        } else {
            vec![Bullet::player(self.pos, self.angle, damage, self.slot)]
        }
    }

    /// Returns false (and changes nothing) while shielded.
    ///
    /// Health bottoms out at zero; callers see every applied hit in full.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.effects.is_active(EffectKind::Shield) {
            return false;
        }
        self.health = (self.health - amount).clamp(0, self.max_health);
        true
    }

    pub fn apply_powerup(&mut self, kind: PowerUpKind, now: u64) {
        match kind {
            PowerUpKind::Effect(effect) => self.effects.activate(effect, now),
            PowerUpKind::Health => {
                self.health = (self.health + HEALTH_PICKUP_AMOUNT).min(self.max_health);
            }
        }
    }
}
