//! Wave director: spawn pacing, enemy mix and boss waves

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemy::{Enemy, EnemyKind};
use crate::Field;

/// Milliseconds between enemy spawns
pub const SPAWN_INTERVAL_MS: u64 = 1_000;
/// Every Nth wave is a boss wave
pub const BOSS_WAVE_EVERY: u32 = 5;
/// Highest wave a peer may announce
pub const MAX_WAVE: u32 = 10_000;
/// How far outside the field enemies appear
const SPAWN_MARGIN: f32 = 30.0;
/// Keep edge spawns away from the corners
const SPAWN_INSET: f32 = 50.0;
/// Smallest field width or height that leaves room for edge spawns
pub const MIN_FIELD_EXTENT: f32 = 2.0 * SPAWN_INSET;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub wave: u32,
    /// Enemies still to be spawned this wave
    pub remaining: u32,
    /// Enemies spawned so far this wave
    pub spawned: u32,
    pub last_spawn: u64,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self {
            wave: 1,
            remaining: 0,
            spawned: 0,
            last_spawn: 0,
        }
    }
}

impl WaveDirector {
    /// Enemy quota of a non-boss wave
    pub fn quota(wave: u32) -> u32 {
        wave.saturating_mul(2).saturating_add(5)
    }

    pub fn is_boss_wave(wave: u32) -> bool {
        wave % BOSS_WAVE_EVERY == 0
    }

    /// Begin wave `wave`. Returns the boss for boss waves; ordinary waves
    /// return `None`, which also clears any boss the caller holds.
    pub fn start_wave(&mut self, wave: u32, now: u64, field: &Field) -> Option<Boss> {
        self.wave = wave;
        self.spawned = 0;
        self.last_spawn = now;

        if Self::is_boss_wave(wave) {
            self.remaining = 0;
            log::info!("Wave {wave}: boss incoming");
            Some(Boss::new(wave, field))
        } else {
            self.remaining = Self::quota(wave);
            log::info!("Wave {wave}: {} enemies", self.remaining);
            None
        }
    }

    /// Spawn at most one enemy if the spawn interval has elapsed
    pub fn spawn_tick<R: Rng>(&mut self, now: u64, rng: &mut R, field: &Field) -> Option<Enemy> {
        if self.remaining == 0 || now.saturating_sub(self.last_spawn) < SPAWN_INTERVAL_MS {
            return None;
        }

        // Upper bounds never drop below the inset, so tiny fields still sample
        let max_x = (field.width - SPAWN_INSET).max(SPAWN_INSET);
        let max_y = (field.height / 2.0).max(SPAWN_INSET);
        let edge = match rng.random_range(0..3) {
            0 => Edge::Top,
            1 => Edge::Left,
            _ => Edge::Right,
        };
        let pos = match edge {
            Edge::Top => Vec2::new(
                rng.random_range(SPAWN_INSET..=max_x),
                -SPAWN_MARGIN,
            ),
            Edge::Left => Vec2::new(
                -SPAWN_MARGIN,
                rng.random_range(SPAWN_INSET..=max_y),
            ),
            Edge::Right => Vec2::new(
                field.width + SPAWN_MARGIN,
                rng.random_range(SPAWN_INSET..=max_y),
            ),
        };
        let kind = EnemyKind::random(rng);

        self.remaining -= 1;
        self.spawned += 1;
        self.last_spawn = now;
        log::debug!("Spawned {kind:?} at {pos:?} ({} left)", self.remaining);
        Some(Enemy::new(kind, pos))
    }

    /// True once the wave has nothing left to spawn and nothing left alive
    pub fn is_cleared(&self, enemies_alive: usize, boss_present: bool) -> bool {
        enemies_alive == 0 && !boss_present && self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_quota_and_boss_waves() {
        let field = Field::default();
        let mut director = WaveDirector::default();
        for wave in 1..=20 {
            let boss = director.start_wave(wave, 0, &field);
            if wave % 5 == 0 {
                let boss = boss.expect("boss wave");
                assert_eq!(boss.health, 500 + 100 * wave as i32);
                assert_eq!(director.remaining, 0);
            } else {
                assert!(boss.is_none());
                assert_eq!(director.remaining, 5 + 2 * wave);
            }
        }
    }

    #[test]
    fn test_huge_wave_saturates() {
        let field = Field::default();
        let mut director = WaveDirector::default();
        assert!(director.start_wave(u32::MAX - 1, 0, &field).is_none());
        assert_eq!(director.remaining, u32::MAX);
        assert_eq!(WaveDirector::quota(MAX_WAVE), 20_005);
    }

    #[test]
    fn test_tiny_field_still_spawns() {
        let field = Field::new(80.0, 60.0);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut director = WaveDirector::default();
        director.start_wave(1, 0, &field);
        for i in 1..=7 {
            assert!(director.spawn_tick(i * SPAWN_INTERVAL_MS, &mut rng, &field).is_some());
        }
    }

    #[test]
    fn test_spawn_interval() {
        let field = Field::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut director = WaveDirector::default();
        director.start_wave(1, 0, &field);
        assert!(director.spawn_tick(999, &mut rng, &field).is_none());
        assert!(director.spawn_tick(1_000, &mut rng, &field).is_some());
        assert!(director.spawn_tick(1_500, &mut rng, &field).is_none());
        assert!(director.spawn_tick(2_000, &mut rng, &field).is_some());
        assert_eq!(director.remaining, 5);
        assert_eq!(director.spawned, 2);
    }

    #[test]
    fn test_spawns_off_field_never_bottom() {
        let field = Field::default();
        let mut rng = Pcg32::seed_from_u64(99);
        let mut director = WaveDirector::default();
        for round in 0..50u64 {
            director.start_wave(1, round * 100_000, &field);
            let mut now = round * 100_000;
            while director.remaining > 0 {
                now += SPAWN_INTERVAL_MS;
                let enemy = director.spawn_tick(now, &mut rng, &field).unwrap();
                let p = enemy.pos;
                let top = p.y == -30.0 && (50.0..=750.0).contains(&p.x);
                let left = p.x == -30.0 && (50.0..=300.0).contains(&p.y);
                let right = p.x == 830.0 && (50.0..=300.0).contains(&p.y);
                assert!(top || left || right, "bad spawn point {p:?}");
            }
        }
    }

    #[test]
    fn test_cleared() {
        let mut director = WaveDirector::default();
        director.remaining = 0;
        assert!(director.is_cleared(0, false));
        assert!(!director.is_cleared(1, false));
        assert!(!director.is_cleared(0, true));
        director.remaining = 1;
        assert!(!director.is_cleared(0, false));
    }
}
