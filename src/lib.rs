//! Nova Strike - A top-down co-op arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (actors, projectiles, collisions, waves)
//! - `game`: Mode state machine (menus, shop, play session, game over)
//! - `persistence`: Save/load of credits and ship upgrades
//! - `net`: Best-effort peer transport and its message contract
//! - `view`: Read-only snapshots for the render collaborator
//! - `config`: Data-driven runtime configuration

pub mod config;
pub mod game;
pub mod net;
pub mod persistence;
pub mod sim;
pub mod view;

pub use config::Config;
pub use game::{FrameInput, Game, Mode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Default play field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Default peer-to-peer port
    pub const DEFAULT_PORT: u16 = 5555;

    /// Score to credits conversion ratio
    pub const SCORE_PER_CREDIT: u64 = 10;
}

/// An sRGB color handed to the render collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Entity identity colors
pub mod palette {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
    pub const PURPLE: Rgb = Rgb(150, 0, 255);
    pub const CYAN: Rgb = Rgb(0, 255, 255);
    pub const PINK: Rgb = Rgb(255, 100, 150);

    /// Ship color per local slot
    pub const PLAYER_COLORS: [Rgb; 4] = [CYAN, GREEN, ORANGE, PINK];
}

/// The bounded 2D play area. Origin top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: consts::FIELD_WIDTH,
            height: consts::FIELD_HEIGHT,
        }
    }
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "field must have positive extent");
        Self { width, height }
    }

    /// Inclusive bounds check
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }

    /// Clamp a circle's center so the whole circle stays inside the field
    pub fn clamp_inset(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(radius, (self.width - radius).max(radius)),
            pos.y.clamp(radius, (self.height - radius).max(radius)),
        )
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

/// Angle (radians) of the direction from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit vector for an angle
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Circle-circle overlap: strictly closer than the sum of radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Replace a non-finite position with `fallback`.
///
/// A NaN position is a programmer error; debug builds stop here, release
/// builds recover so one bad entity doesn't poison the whole collision pass.
#[inline]
pub fn sanitize_position(pos: Vec2, fallback: Vec2) -> Vec2 {
    debug_assert!(pos.is_finite(), "non-finite position {pos:?}");
    if pos.is_finite() { pos } else { fallback }
}
