//! Fixed timestep simulation tick
//!
//! Core play loop that advances a session deterministically.

use super::collision::resolve_collisions;
use super::input::Controls;
use super::state::{GameEvent, World};

/// Advance the world by one fixed timestep.
///
/// `controls` is indexed by player slot; missing slots get no input. Returns
/// everything that happened this tick, in order.
pub fn tick(world: &mut World, controls: &[Controls], now: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // --- PLAYERS ---
    for player in world.players.iter_mut().filter(|p| p.is_alive()) {
        let input = controls
            .get(player.slot as usize)
            .copied()
            .unwrap_or_default();
        player.update(&input, now, &world.field);

        if input.fire {
            for bullet in player.shoot(now) {
                events.push(GameEvent::ShotFired {
                    slot: player.slot,
                    pos: bullet.pos,
                    angle: bullet.angle,
                    damage: bullet.damage,
                });
                world.player_bullets.push(bullet);
            }
        }
    }

    // --- ENEMIES & BOSS ---
    let alive: Vec<_> = world.players.iter().filter(|p| p.is_alive()).collect();
    for enemy in world.enemies.iter_mut() {
        enemy.update(&alive, &world.field);
        if let Some(bullet) = enemy.try_shoot(&alive, now) {
            world.enemy_bullets.push(bullet);
        }
    }
    if let Some(boss) = world.boss.as_mut() {
        boss.update(now, &world.field);
        world.enemy_bullets.extend(boss.try_shoot(&alive, now));
    }

    // --- PROJECTILES, PICKUPS, PARTICLES ---
    let field = world.field;
    world.player_bullets.retain_mut(|b| b.advance(&field));
    world.enemy_bullets.retain_mut(|b| b.advance(&field));
    world.powerups.retain_mut(|p| p.advance(now, &field));
    world.particles.retain_mut(|p| p.advance());

    // --- COLLISIONS ---
    events.extend(resolve_collisions(world, now));

    // --- WAVE DIRECTOR ---
    if let Some(enemy) = world.director.spawn_tick(now, &mut world.rng, &field) {
        world.enemies.push(enemy);
    }
    if world
        .director
        .is_cleared(world.enemies.len(), world.boss.is_some())
    {
        let next = world.director.wave.saturating_add(1);
        events.push(world.start_wave(next, now));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use crate::sim::enemy::{Enemy, EnemyKind};
    use crate::sim::player::Upgrades;
    use crate::sim::powerup::{EffectKind, PowerUpKind};
    use glam::Vec2;

    fn world(players: usize) -> World {
        World::new(777, Field::default(), players, Upgrades::default(), 0, 512)
    }

    #[test]
    fn test_idle_player_does_not_move() {
        let mut w = world(1);
        let start = w.players[0].pos;
        for t in 1..=30u64 {
            tick(&mut w, &[], t * 16);
        }
        assert_eq!(w.players[0].pos, start);
        assert!((w.players[0].angle + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_fire_spawns_and_moves_bullet() {
        let mut w = world(1);
        let controls = [Controls {
            fire: true,
            ..Default::default()
        }];
        let events = tick(&mut w, &controls, 0);
        assert_eq!(w.player_bullets.len(), 1);
        assert!(matches!(events[0], GameEvent::ShotFired { slot: 0, .. }));
        // Moved 12 up along the default facing
        assert!((w.player_bullets[0].pos.y - 488.0).abs() < 1e-3);
    }

    #[test]
    fn test_spread_shot_through_tick() {
        let mut w = world(1);
        w.players[0].apply_powerup(PowerUpKind::Effect(EffectKind::SpreadShot), 0);
        let controls = [Controls {
            fire: true,
            ..Default::default()
        }];
        tick(&mut w, &controls, 0);
        assert_eq!(w.player_bullets.len(), 3);
    }

    #[test]
    fn test_dead_players_do_not_act() {
        let mut w = world(2);
        w.players[1].health = 0;
        let start = w.players[1].pos;
        let controls = [
            Controls::default(),
            Controls {
                movement: Vec2::new(1.0, 0.0),
                fire: true,
                ..Default::default()
            },
        ];
        tick(&mut w, &controls, 0);
        assert_eq!(w.players[1].pos, start);
        assert!(w.player_bullets.is_empty());
    }

    #[test]
    fn test_wave_advances_when_cleared() {
        let mut w = world(1);
        w.director.remaining = 0;
        let events = tick(&mut w, &[], 16);
        assert_eq!(w.wave(), 2);
        assert_eq!(w.director.remaining, 9);
        assert!(events.contains(&GameEvent::WaveStarted {
            wave: 2,
            boss: false
        }));
    }

    #[test]
    fn test_boss_wave_replaces_spawning() {
        let mut w = world(1);
        w.director.wave = 4;
        w.director.remaining = 0;
        tick(&mut w, &[], 16);
        assert_eq!(w.wave(), 5);
        assert!(w.boss.is_some());
        assert_eq!(w.director.remaining, 0);
        // Boss alive: the wave does not advance
        tick(&mut w, &[], 32);
        assert_eq!(w.wave(), 5);
    }

    #[test]
    fn test_wave_waits_for_living_enemies() {
        let mut w = world(1);
        w.director.remaining = 0;
        w.enemies.push(Enemy::new(EnemyKind::Heavy, Vec2::new(-100.0, -100.0)));
        tick(&mut w, &[], 16);
        assert_eq!(w.wave(), 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = world(2);
        let mut b = world(2);
        let controls = [
            Controls {
                movement: Vec2::new(1.0, -1.0),
                aim: Vec2::new(0.0, -1.0),
                fire: true,
            },
            Controls {
                movement: Vec2::new(-1.0, 0.0),
                aim: Vec2::new(1.0, -1.0),
                fire: true,
            },
        ];
        for t in 1..=900u64 {
            tick(&mut a, &controls, t * 1000 / 60);
            tick(&mut b, &controls, t * 1000 / 60);
        }
        assert_eq!(a.wave(), b.wave());
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.players[0].score, b.players[0].score);
        assert_eq!(a.players[0].health, b.players[0].health);
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.kind, eb.kind);
        }
    }
}
