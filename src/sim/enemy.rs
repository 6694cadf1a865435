//! Enemy ships
//!
//! One struct for every variant; `EnemyKind` selects the numeric profile and
//! the movement policy.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::Player;
use super::projectile::Bullet;
use crate::{Field, Rgb, angle_to, direction, palette, sanitize_position};

/// Non-Sniper enemies only fire at targets closer than this
pub const ENGAGEMENT_RANGE: f32 = 400.0;
/// Sniper standoff distance and dead-band
pub const SNIPER_PREFERRED_DISTANCE: f32 = 300.0;
pub const SNIPER_DEAD_BAND: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Standard,
    Fast,
    Heavy,
    Sniper,
}

/// Numeric stats for a variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub health: i32,
    pub speed: f32,
    pub radius: f32,
    pub points: u64,
    /// Contact and default bullet damage
    pub damage: i32,
    pub fire_interval_ms: u64,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    pub color: Rgb,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Standard,
        EnemyKind::Fast,
        EnemyKind::Heavy,
        EnemyKind::Sniper,
    ];

    /// Spawn weights, same order as `ALL` (percent)
    const WEIGHTS: [u32; 4] = [40, 30, 15, 15];

    pub fn profile(self) -> EnemyProfile {
        match self {
            EnemyKind::Standard => EnemyProfile {
                health: 30,
                speed: 2.0,
                radius: 15.0,
                points: 100,
                damage: 10,
                fire_interval_ms: 2000,
                bullet_speed: 5.0,
                bullet_damage: 10,
                color: palette::RED,
            },
            EnemyKind::Fast => EnemyProfile {
                health: 20,
                speed: 4.0,
                radius: 12.0,
                points: 75,
                damage: 10,
                fire_interval_ms: 3000,
                bullet_speed: 5.0,
                bullet_damage: 10,
                color: palette::YELLOW,
            },
            EnemyKind::Heavy => EnemyProfile {
                health: 80,
                speed: 1.0,
                radius: 25.0,
                points: 200,
                damage: 20,
                fire_interval_ms: 1500,
                bullet_speed: 5.0,
                bullet_damage: 20,
                color: palette::PURPLE,
            },
            EnemyKind::Sniper => EnemyProfile {
                health: 25,
                speed: 1.5,
                radius: 15.0,
                points: 150,
                damage: 10,
                fire_interval_ms: 1200,
                bullet_speed: 10.0,
                bullet_damage: 15,
                color: palette::ORANGE,
            },
        }
    }

    /// Weighted draw: Standard 40%, Fast 30%, Heavy 15%, Sniper 15%
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let total: u32 = Self::WEIGHTS.iter().sum();
        let mut roll = rng.random_range(0..total);
        for (kind, weight) in Self::ALL.iter().zip(Self::WEIGHTS) {
            if roll < weight {
                return *kind;
            }
            roll -= weight;
        }
        EnemyKind::Standard
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub speed: f32,
    pub radius: f32,
    pub points: u64,
    pub damage: i32,
    pub fire_interval_ms: u64,
    pub last_shot: Option<u64>,
}

/// Nearest player by straight-line distance; the first one wins a tie
pub fn nearest_target<'a>(from: Vec2, players: &[&'a Player]) -> Option<&'a Player> {
    let mut best: Option<(&'a Player, f32)> = None;
    for &player in players {
        let dist = from.distance(player.pos);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((player, dist)),
        }
    }
    best.map(|(p, _)| p)
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2) -> Self {
        let profile = kind.profile();
        Self {
            kind,
            pos,
            health: profile.health,
            max_health: profile.health,
            speed: profile.speed,
            radius: profile.radius,
            points: profile.points,
            damage: profile.damage,
            fire_interval_ms: profile.fire_interval_ms,
            last_shot: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn color(&self) -> Rgb {
        self.kind.profile().color
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    /// Move one tick toward (or, for snipers, relative to) the nearest player
    pub fn update(&mut self, alive_players: &[&Player], field: &Field) -> bool {
        let Some(target) = nearest_target(self.pos, alive_players) else {
            return self.is_alive();
        };
        let toward = direction(angle_to(self.pos, target.pos));
        let prev = self.pos;

        match self.kind {
            EnemyKind::Standard | EnemyKind::Fast | EnemyKind::Heavy => {
                self.pos += toward * self.speed;
            }
            EnemyKind::Sniper => {
                let dist = self.pos.distance(target.pos);
                if dist < SNIPER_PREFERRED_DISTANCE - SNIPER_DEAD_BAND {
                    self.pos -= toward * self.speed;
                } else if dist > SNIPER_PREFERRED_DISTANCE + SNIPER_DEAD_BAND {
                    self.pos += toward * self.speed;
                }
                self.pos = field.clamp_inset(self.pos, self.radius);
            }
        }

        self.pos = sanitize_position(self.pos, prev);
        self.is_alive()
    }

    /// Fire at the nearest player when the rate gate (and range) allow
    pub fn try_shoot(&mut self, alive_players: &[&Player], now: u64) -> Option<Bullet> {
        let target = nearest_target(self.pos, alive_players)?;

        if let Some(last) = self.last_shot {
            if now.saturating_sub(last) < self.fire_interval_ms {
                return None;
            }
        }
        let ranged = self.kind == EnemyKind::Sniper;
        if !ranged && self.pos.distance(target.pos) >= ENGAGEMENT_RANGE {
            return None;
        }

        self.last_shot = Some(now);
        let profile = self.kind.profile();
        Some(Bullet::enemy(
            self.pos,
            angle_to(self.pos, target.pos),
            profile.bullet_speed,
            profile.bullet_damage,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::Upgrades;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player_at(slot: u8, x: f32, y: f32) -> Player {
        Player::new(slot, Vec2::new(x, y), Upgrades::default())
    }

    #[test]
    fn test_no_target_no_action() {
        let field = Field::default();
        let mut e = Enemy::new(EnemyKind::Standard, Vec2::new(100.0, 100.0));
        assert!(e.update(&[], &field));
        assert_eq!(e.pos, Vec2::new(100.0, 100.0));
        assert!(e.try_shoot(&[], 10_000).is_none());
    }

    #[test]
    fn test_nearest_target_first_wins_tie() {
        let a = player_at(0, 200.0, 100.0);
        let b = player_at(1, 0.0, 100.0);
        let target = nearest_target(Vec2::new(100.0, 100.0), &[&a, &b]).unwrap();
        assert_eq!(target.slot, 0);
        let target = nearest_target(Vec2::new(100.0, 100.0), &[&b, &a]).unwrap();
        assert_eq!(target.slot, 1);
    }

    #[test]
    fn test_chaser_moves_toward_target_unclamped() {
        let field = Field::default();
        let p = player_at(0, 400.0, 500.0);
        let mut e = Enemy::new(EnemyKind::Fast, Vec2::new(400.0, -30.0));
        e.update(&[&p], &field);
        assert!((e.pos - Vec2::new(400.0, -26.0)).length() < 1e-4);
    }

    #[test]
    fn test_sniper_keeps_standoff() {
        let field = Field::default();
        let p = player_at(0, 400.0, 500.0);

        // Too close: backs off
        let mut e = Enemy::new(EnemyKind::Sniper, Vec2::new(400.0, 400.0));
        e.update(&[&p], &field);
        assert!((e.pos.y - 398.5).abs() < 1e-4);

        // Inside the band: holds
        let mut e = Enemy::new(EnemyKind::Sniper, Vec2::new(400.0, 200.0));
        e.update(&[&p], &field);
        assert_eq!(e.pos, Vec2::new(400.0, 200.0));

        // Too far: closes in
        let mut e = Enemy::new(EnemyKind::Sniper, Vec2::new(400.0, 100.0));
        e.update(&[&p], &field);
        assert!((e.pos.y - 101.5).abs() < 1e-4);
    }

    #[test]
    fn test_sniper_clamped_to_field() {
        let field = Field::default();
        let p = player_at(0, 400.0, 100.0);
        let mut e = Enemy::new(EnemyKind::Sniper, Vec2::new(400.0, 16.0));
        e.update(&[&p], &field);
        assert_eq!(e.pos.y, 15.0);
    }

    #[test]
    fn test_range_gate() {
        let p = player_at(0, 400.0, 500.0);
        let mut far = Enemy::new(EnemyKind::Heavy, Vec2::new(400.0, 50.0));
        assert!(far.try_shoot(&[&p], 0).is_none());

        let mut sniper = Enemy::new(EnemyKind::Sniper, Vec2::new(400.0, 50.0));
        let bullet = sniper.try_shoot(&[&p], 0).unwrap();
        assert_eq!(bullet.damage, 15);
        assert_eq!(bullet.speed, 10.0);
    }

    #[test]
    fn test_fire_interval() {
        let p = player_at(0, 400.0, 300.0);
        let mut e = Enemy::new(EnemyKind::Standard, Vec2::new(400.0, 200.0));
        assert!(e.try_shoot(&[&p], 5_000).is_some());
        assert!(e.try_shoot(&[&p], 6_999).is_none());
        let bullet = e.try_shoot(&[&p], 7_000).unwrap();
        assert!((bullet.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(bullet.damage, 10);
    }

    #[test]
    fn test_weighted_draw_distribution() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            let kind = EnemyKind::random(&mut rng);
            let idx = EnemyKind::ALL.iter().position(|k| *k == kind).unwrap();
            counts[idx] += 1;
        }
        // 40/30/15/15 within a generous tolerance
        assert!((3600..4400).contains(&counts[0]));
        assert!((2600..3400).contains(&counts[1]));
        assert!((1200..1800).contains(&counts[2]));
        assert!((1200..1800).contains(&counts[3]));
    }
}
