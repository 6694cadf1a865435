//! World state: the single entity roster of a play session
//!
//! Everything a session needs to advance lives here and is only ever
//! mutated by `tick` and the collision pass.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemy::{Enemy, EnemyKind};
use super::particle::Particle;
use super::player::{Player, Upgrades};
use super::powerup::{PowerUp, PowerUpKind};
use super::projectile::Bullet;
use super::wave::WaveDirector;
use crate::Field;

/// Most local players a session supports
pub const MAX_LOCAL_PLAYERS: usize = 4;

/// Things that happened during a tick, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired {
        slot: u8,
        pos: Vec2,
        angle: f32,
        damage: i32,
    },
    EnemyKilled {
        kind: EnemyKind,
        pos: Vec2,
        points: u64,
    },
    BossKilled {
        points: u64,
    },
    PowerUpDropped {
        kind: PowerUpKind,
        pos: Vec2,
    },
    PlayerHit {
        slot: u8,
        damage: i32,
    },
    DamageAbsorbed {
        slot: u8,
    },
    PlayerDied {
        slot: u8,
    },
    PowerUpCollected {
        slot: u8,
        kind: PowerUpKind,
    },
    WaveStarted {
        wave: u32,
        boss: bool,
    },
}

/// A peer's ship as last reported over the network (render only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePlayer {
    pub peer: u64,
    pub slot: u8,
    pub pos: Vec2,
    pub angle: f32,
    pub health: i32,
    pub last_seen: u64,
}

#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub field: Field,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub powerups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    pub director: WaveDirector,
    pub remote_players: Vec<RemotePlayer>,
}

impl World {
    /// Fresh roster with `num_players` ships at their start positions,
    /// already in wave 1
    pub fn new(
        seed: u64,
        field: Field,
        num_players: usize,
        upgrades: Upgrades,
        now: u64,
        max_particles: usize,
    ) -> Self {
        let count = num_players.clamp(1, MAX_LOCAL_PLAYERS);
        let players = (0..count)
            .map(|slot| Player::new(slot as u8, Player::start_position(slot, &field), upgrades))
            .collect();

        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            field,
            players,
            enemies: Vec::new(),
            boss: None,
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            powerups: Vec::new(),
            particles: Vec::new(),
            max_particles,
            director: WaveDirector::default(),
            remote_players: Vec::new(),
        };
        world.start_wave(1, now);
        world
    }

    /// Begin a wave, installing or clearing the boss
    pub fn start_wave(&mut self, wave: u32, now: u64) -> GameEvent {
        self.boss = self.director.start_wave(wave, now, &self.field);
        GameEvent::WaveStarted {
            wave,
            boss: self.boss.is_some(),
        }
    }

    pub fn wave(&self) -> u32 {
        self.director.wave
    }

    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_alive()).collect()
    }

    pub fn any_player_alive(&self) -> bool {
        self.players.iter().any(Player::is_alive)
    }

    /// Sum of every roster member's score
    pub fn total_score(&self) -> u64 {
        self.players.iter().map(|p| p.score).sum()
    }

    /// Record a peer's reported ship state
    pub fn upsert_remote(&mut self, remote: RemotePlayer) {
        match self
            .remote_players
            .iter_mut()
            .find(|r| r.peer == remote.peer && r.slot == remote.slot)
        {
            Some(existing) => *existing = remote,
            None => self.remote_players.push(remote),
        }
    }

    pub fn drop_remote_peer(&mut self, peer: u64) {
        self.remote_players.retain(|r| r.peer != peer);
    }
}
