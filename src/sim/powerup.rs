//! Timed collectibles and the per-player active-effect set

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Field, Rgb, palette};

pub const POWERUP_RADIUS: f32 = 15.0;
/// Milliseconds a dropped power-up stays collectible
pub const POWERUP_LIFETIME_MS: u64 = 10_000;
/// Milliseconds a collected timed effect lasts
pub const EFFECT_DURATION_MS: u64 = 8_000;
/// Health restored by a health pickup
pub const HEALTH_PICKUP_AMOUNT: i32 = 30;
/// Downward drift per tick
const FALL_SPEED: f32 = 0.5;
/// Cosmetic spin per tick
const SPIN_SPEED: f32 = 0.1;

/// Timed modifiers a player can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Shield,
    RapidFire,
    SpreadShot,
    DamageBoost,
}

/// What a power-up grants when collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Effect(EffectKind),
    Health,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Effect(EffectKind::Shield),
        PowerUpKind::Effect(EffectKind::RapidFire),
        PowerUpKind::Effect(EffectKind::SpreadShot),
        PowerUpKind::Effect(EffectKind::DamageBoost),
        PowerUpKind::Health,
    ];

    /// Uniform draw over all kinds
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn color(self) -> Rgb {
        match self {
            PowerUpKind::Effect(EffectKind::Shield) => palette::CYAN,
            PowerUpKind::Effect(EffectKind::RapidFire) => palette::YELLOW,
            PowerUpKind::Effect(EffectKind::SpreadShot) => palette::PURPLE,
            PowerUpKind::Effect(EffectKind::DamageBoost) => palette::RED,
            PowerUpKind::Health => palette::GREEN,
        }
    }

    /// One-letter badge for the HUD
    pub fn icon(self) -> char {
        match self {
            PowerUpKind::Effect(EffectKind::Shield) => 'S',
            PowerUpKind::Effect(EffectKind::RapidFire) => 'R',
            PowerUpKind::Effect(EffectKind::SpreadShot) => 'W',
            PowerUpKind::Effect(EffectKind::DamageBoost) => 'D',
            PowerUpKind::Health => '+',
        }
    }
}

/// A collectible drifting down the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub radius: f32,
    pub spawned_at: u64,
    /// Animation phase (render only)
    pub spin: f32,
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind, now: u64) -> Self {
        Self {
            pos,
            kind,
            radius: POWERUP_RADIUS,
            spawned_at: now,
            spin: 0.0,
        }
    }

    /// Drift one tick. Returns true while unexpired and above the bottom edge.
    pub fn advance(&mut self, now: u64, field: &Field) -> bool {
        self.spin += SPIN_SPEED;
        self.pos.y += FALL_SPEED;
        now.saturating_sub(self.spawned_at) < POWERUP_LIFETIME_MS && self.pos.y < field.height
    }
}

/// Effect kind -> absolute expiry timestamp (ms)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    expiries: BTreeMap<EffectKind, u64>,
}

impl ActiveEffects {
    /// (Re)start an effect; an existing timer is overwritten, never extended
    pub fn activate(&mut self, kind: EffectKind, now: u64) {
        self.expiries.insert(kind, now + EFFECT_DURATION_MS);
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.expiries.contains_key(&kind)
    }

    pub fn expiry(&self, kind: EffectKind) -> Option<u64> {
        self.expiries.get(&kind).copied()
    }

    /// Drop every effect whose expiry has passed
    pub fn expire(&mut self, now: u64) {
        self.expiries.retain(|_, expiry| now <= *expiry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, u64)> + '_ {
        self.expiries.iter().map(|(k, v)| (*k, *v))
    }
}
