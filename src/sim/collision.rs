//! Collision detection and resolution
//!
//! Runs once per tick after everything has moved. Every test is a plain
//! circle overlap. Scans only flag bullets, enemies and power-ups as spent;
//! the collections are compacted once at the end, so no collection is
//! resized while it is being scanned.

use rand::Rng;

use super::particle::{BOSS_BURST, ENEMY_BURST, PLAYER_BURST, burst};
use super::player::Player;
use super::powerup::{PowerUp, PowerUpKind};
use super::state::{GameEvent, World};
use crate::{circles_overlap, palette};

/// Damage per overlapped enemy per tick
pub const CONTACT_DAMAGE: i32 = 20;
/// Chance that a killed enemy drops a power-up
pub const DROP_CHANCE: f64 = 0.2;

/// Credit every roster member with a kill
fn award(players: &mut [Player], points: u64) {
    for player in players {
        player.score += points;
    }
}

fn strike(player: &mut Player, amount: i32, events: &mut Vec<GameEvent>) {
    if player.take_damage(amount) {
        events.push(GameEvent::PlayerHit {
            slot: player.slot,
            damage: amount,
        });
    } else {
        events.push(GameEvent::DamageAbsorbed { slot: player.slot });
    }
}

/// Drop every element whose flag is set
fn compact<T>(items: &mut Vec<T>, spent: Vec<bool>) {
    let mut flags = spent.into_iter();
    items.retain(|_| !flags.next().unwrap_or(false));
}

/// Resolve all pairwise interactions for this tick
pub fn resolve_collisions(world: &mut World, now: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let was_alive: Vec<bool> = world.players.iter().map(Player::is_alive).collect();

    // --- PLAYER BULLETS vs ENEMIES ---
    let mut bullet_spent = vec![false; world.player_bullets.len()];
    for (i, bullet) in world.player_bullets.iter().enumerate() {
        for enemy in world.enemies.iter_mut() {
            if !enemy.is_alive()
                || !circles_overlap(bullet.pos, bullet.radius, enemy.pos, enemy.radius)
            {
                continue;
            }
            enemy.health -= bullet.damage;
            bullet_spent[i] = true;

            if !enemy.is_alive() {
                burst(
                    &mut world.particles,
                    &mut world.rng,
                    enemy.pos,
                    enemy.color(),
                    ENEMY_BURST,
                    world.max_particles,
                );
                award(&mut world.players, enemy.points);
                events.push(GameEvent::EnemyKilled {
                    kind: enemy.kind,
                    pos: enemy.pos,
                    points: enemy.points,
                });
                log::debug!("{:?} destroyed (+{})", enemy.kind, enemy.points);

                if world.rng.random_bool(DROP_CHANCE) {
                    let kind = PowerUpKind::random(&mut world.rng);
                    world.powerups.push(PowerUp::new(enemy.pos, kind, now));
                    events.push(GameEvent::PowerUpDropped {
                        kind,
                        pos: enemy.pos,
                    });
                }
            }
            // One enemy per bullet
            break;
        }
    }

    // --- PLAYER BULLETS vs BOSS ---
    if let Some(boss) = world.boss.as_mut() {
        for (i, bullet) in world.player_bullets.iter().enumerate() {
            if bullet_spent[i] || !boss.is_alive() {
                continue;
            }
            if !circles_overlap(bullet.pos, bullet.radius, boss.pos, boss.radius) {
                continue;
            }
            boss.health -= bullet.damage;
            bullet_spent[i] = true;

            if !boss.is_alive() {
                burst(
                    &mut world.particles,
                    &mut world.rng,
                    boss.pos,
                    palette::PURPLE,
                    BOSS_BURST,
                    world.max_particles,
                );
                award(&mut world.players, boss.points);
                events.push(GameEvent::BossKilled {
                    points: boss.points,
                });
                log::info!("Boss destroyed (+{})", boss.points);
            }
        }
    }
    if world.boss.as_ref().is_some_and(|b| !b.is_alive()) {
        world.boss = None;
    }

    // --- ENEMY BULLETS vs PLAYERS ---
    let mut enemy_bullet_spent = vec![false; world.enemy_bullets.len()];
    for (i, bullet) in world.enemy_bullets.iter().enumerate() {
        for player in world.players.iter_mut() {
            if !player.is_alive()
                || !circles_overlap(bullet.pos, bullet.radius, player.pos, player.radius)
            {
                continue;
            }
            strike(player, bullet.damage, &mut events);
            enemy_bullet_spent[i] = true;
            break;
        }
    }

    // --- CONTACT DAMAGE ---
    // Every overlapping enemy hurts every tick; there is no cooldown.
    for player in world.players.iter_mut() {
        if !player.is_alive() {
            continue;
        }
        for enemy in world.enemies.iter().filter(|e| e.is_alive()) {
            if circles_overlap(player.pos, player.radius, enemy.pos, enemy.radius) {
                strike(player, CONTACT_DAMAGE, &mut events);
            }
        }
    }

    // --- PICKUPS ---
    let mut claimed = vec![false; world.powerups.len()];
    for player in world.players.iter_mut() {
        if !player.is_alive() {
            continue;
        }
        for (i, powerup) in world.powerups.iter().enumerate() {
            if claimed[i] || !circles_overlap(player.pos, player.radius, powerup.pos, powerup.radius)
            {
                continue;
            }
            player.apply_powerup(powerup.kind, now);
            claimed[i] = true;
            events.push(GameEvent::PowerUpCollected {
                slot: player.slot,
                kind: powerup.kind,
            });
        }
    }

    // --- DEATHS ---
    for (player, alive_before) in world.players.iter().zip(was_alive) {
        if alive_before && !player.is_alive() {
            burst(
                &mut world.particles,
                &mut world.rng,
                player.pos,
                player.color,
                PLAYER_BURST,
                world.max_particles,
            );
            events.push(GameEvent::PlayerDied { slot: player.slot });
            log::info!("Player {} destroyed", player.slot + 1);
        }
    }

    compact(&mut world.player_bullets, bullet_spent);
    compact(&mut world.enemy_bullets, enemy_bullet_spent);
    compact(&mut world.powerups, claimed);
    world.enemies.retain(|e| e.is_alive());

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use crate::sim::boss::Boss;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::player::Upgrades;
    use crate::sim::powerup::EffectKind;
    use crate::sim::projectile::Bullet;
    use glam::Vec2;

    fn world(players: usize) -> World {
        World::new(1234, Field::default(), players, Upgrades::default(), 0, 512)
    }

    fn damage_to(events: &[GameEvent], slot: u8) -> i32 {
        events
            .iter()
            .map(|e| match e {
                GameEvent::PlayerHit { slot: s, damage } if *s == slot => *damage,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_kill_awards_every_player() {
        let mut w = world(2);
        let pos = Vec2::new(400.0, 200.0);
        w.enemies.push(Enemy::new(EnemyKind::Standard, pos));
        w.enemies[0].health = 5;
        w.player_bullets.push(Bullet::player(pos, 0.0, 10, 0));

        let events = resolve_collisions(&mut w, 0);

        assert!(w.enemies.is_empty());
        assert!(w.player_bullets.is_empty());
        assert_eq!(w.players[0].score, 100);
        assert_eq!(w.players[1].score, 100);
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyKilled { points: 100, .. })));
        assert_eq!(w.particles.len(), ENEMY_BURST);
    }

    #[test]
    fn test_bullet_hits_only_first_enemy() {
        let mut w = world(1);
        let pos = Vec2::new(400.0, 200.0);
        w.enemies.push(Enemy::new(EnemyKind::Heavy, pos));
        w.enemies.push(Enemy::new(EnemyKind::Heavy, pos));
        w.player_bullets.push(Bullet::player(pos, 0.0, 10, 0));

        resolve_collisions(&mut w, 0);

        assert_eq!(w.enemies[0].health, 70);
        assert_eq!(w.enemies[1].health, 80);
        assert!(w.player_bullets.is_empty());
    }

    #[test]
    fn test_dead_enemy_not_hit_again_same_tick() {
        let mut w = world(1);
        let pos = Vec2::new(400.0, 200.0);
        w.enemies.push(Enemy::new(EnemyKind::Fast, pos));
        w.enemies[0].health = 10;
        w.player_bullets.push(Bullet::player(pos, 0.0, 10, 0));
        w.player_bullets.push(Bullet::player(pos, 0.0, 10, 0));

        resolve_collisions(&mut w, 0);

        // Second bullet found nothing alive and keeps flying
        assert_eq!(w.player_bullets.len(), 1);
        assert_eq!(w.players[0].score, 75);
    }

    #[test]
    fn test_boss_takes_unspent_bullets_only() {
        let mut w = world(2);
        let mut boss = Boss::new(5, &w.field);
        boss.pos = Vec2::new(400.0, 100.0);
        boss.health = 15;
        w.boss = Some(boss);
        w.enemies.push(Enemy::new(EnemyKind::Heavy, Vec2::new(400.0, 100.0)));
        // First bullet overlaps both and is spent on the enemy; the other two
        // only touch the boss
        w.player_bullets.push(Bullet::player(Vec2::new(400.0, 100.0), 0.0, 10, 0));
        for _ in 0..2 {
            w.player_bullets.push(Bullet::player(Vec2::new(440.0, 100.0), 0.0, 10, 0));
        }

        let events = resolve_collisions(&mut w, 0);

        assert!(w.boss.is_none());
        assert_eq!(w.enemies[0].health, 70);
        assert!(w.player_bullets.is_empty());
        assert!(events.contains(&GameEvent::BossKilled { points: 2000 }));
        assert_eq!(w.players[0].score, 2000);
        assert_eq!(w.players[1].score, 2000);
        assert_eq!(w.particles.len(), BOSS_BURST);
    }

    #[test]
    fn test_enemy_bullet_hits_one_player() {
        let mut w = world(2);
        let pos = Vec2::new(300.0, 300.0);
        w.players[0].pos = pos;
        w.players[1].pos = pos;
        w.enemy_bullets.push(Bullet::enemy(pos, 0.0, 5.0, 15));

        let events = resolve_collisions(&mut w, 0);

        assert_eq!(w.players[0].health, 85);
        assert_eq!(w.players[1].health, 100);
        assert!(w.enemy_bullets.is_empty());
        assert_eq!(damage_to(&events, 0), 15);
    }

    #[test]
    fn test_shield_absorbs_bullet_but_consumes_it() {
        let mut w = world(1);
        let pos = w.players[0].pos;
        w.players[0].apply_powerup(PowerUpKind::Effect(EffectKind::Shield), 0);
        w.enemy_bullets.push(Bullet::enemy(pos, 0.0, 5.0, 15));

        let events = resolve_collisions(&mut w, 0);

        assert_eq!(w.players[0].health, 100);
        assert!(w.enemy_bullets.is_empty());
        assert!(events.contains(&GameEvent::DamageAbsorbed { slot: 0 }));
    }

    /// Contact damage is applied per overlapping enemy on every tick with no
    /// cooldown. Crowding a ship is meant to be lethal.
    #[test]
    fn test_contact_damage_every_tick_per_enemy() {
        let mut w = world(1);
        let pos = w.players[0].pos;
        w.enemies.push(Enemy::new(EnemyKind::Standard, pos));
        w.enemies.push(Enemy::new(EnemyKind::Heavy, pos + Vec2::new(5.0, 0.0)));

        let events = resolve_collisions(&mut w, 0);
        assert_eq!(damage_to(&events, 0), 40);
        assert_eq!(w.players[0].health, 60);

        let events = resolve_collisions(&mut w, 16);
        assert_eq!(damage_to(&events, 0), 40);
        assert_eq!(w.players[0].health, 20);
    }

    #[test]
    fn test_contact_damage_kills_low_health_player() {
        let mut w = world(1);
        let pos = w.players[0].pos;
        w.players[0].health = 15;
        w.enemies.push(Enemy::new(EnemyKind::Standard, pos));
        w.enemies.push(Enemy::new(EnemyKind::Standard, pos));

        let events = resolve_collisions(&mut w, 0);

        assert_eq!(damage_to(&events, 0), 40);
        assert_eq!(w.players[0].health, 0);
        assert!(!w.players[0].is_alive());
        assert!(events.contains(&GameEvent::PlayerDied { slot: 0 }));
        assert_eq!(w.particles.len(), PLAYER_BURST);
    }

    #[test]
    fn test_contact_damage_blocked_by_shield() {
        let mut w = world(1);
        let pos = w.players[0].pos;
        w.players[0].health = 15;
        w.players[0].apply_powerup(PowerUpKind::Effect(EffectKind::Shield), 0);
        w.enemies.push(Enemy::new(EnemyKind::Standard, pos));
        w.enemies.push(Enemy::new(EnemyKind::Standard, pos));

        let events = resolve_collisions(&mut w, 0);

        assert_eq!(damage_to(&events, 0), 0);
        assert_eq!(w.players[0].health, 15);
    }

    #[test]
    fn test_powerup_claimed_by_first_player() {
        let mut w = world(2);
        let pos = Vec2::new(300.0, 300.0);
        w.players[0].pos = pos;
        w.players[1].pos = pos;
        w.powerups.push(PowerUp::new(
            pos,
            PowerUpKind::Effect(EffectKind::SpreadShot),
            0,
        ));

        let events = resolve_collisions(&mut w, 500);

        assert!(w.powerups.is_empty());
        assert_eq!(w.players[0].effects.expiry(EffectKind::SpreadShot), Some(8_500));
        assert!(!w.players[1].effects.is_active(EffectKind::SpreadShot));
        assert_eq!(
            events,
            vec![GameEvent::PowerUpCollected {
                slot: 0,
                kind: PowerUpKind::Effect(EffectKind::SpreadShot)
            }]
        );
    }

    #[test]
    fn test_dead_players_ignored() {
        let mut w = world(1);
        let pos = w.players[0].pos;
        w.players[0].health = 0;
        w.enemy_bullets.push(Bullet::enemy(pos, 0.0, 5.0, 15));
        w.enemies.push(Enemy::new(EnemyKind::Standard, pos));
        w.powerups.push(PowerUp::new(pos, PowerUpKind::Health, 0));

        let events = resolve_collisions(&mut w, 0);

        assert!(events.is_empty());
        assert_eq!(w.enemy_bullets.len(), 1);
        assert_eq!(w.powerups.len(), 1);
    }

    #[test]
    fn test_miss_when_just_touching() {
        let mut w = world(1);
        w.enemies.push(Enemy::new(EnemyKind::Standard, Vec2::new(400.0, 200.0)));
        // 4 + 15 = 19 apart exactly
        w.player_bullets.push(Bullet::player(Vec2::new(419.0, 200.0), 0.0, 10, 0));

        resolve_collisions(&mut w, 0);

        assert_eq!(w.enemies[0].health, 30);
        assert_eq!(w.player_bullets.len(), 1);
    }
}
