//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, time read from an injected `SimClock`
//! - Seeded RNG only
//! - Stable iteration order (collections scanned front to back)
//! - No rendering, input-device or transport dependencies

pub mod boss;
pub mod clock;
pub mod collision;
pub mod enemy;
pub mod input;
pub mod particle;
pub mod player;
pub mod powerup;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod wave;

pub use boss::{AttackPattern, Boss};
pub use clock::SimClock;
pub use collision::resolve_collisions;
pub use enemy::{Enemy, EnemyKind, nearest_target};
pub use input::{Controls, InputSnapshot, Key, KeyBindings};
pub use particle::Particle;
pub use player::{Player, Upgrades};
pub use powerup::{ActiveEffects, EffectKind, PowerUp, PowerUpKind};
pub use projectile::Bullet;
pub use state::{GameEvent, RemotePlayer, World};
pub use tick::tick;
pub use wave::WaveDirector;
