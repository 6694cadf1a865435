//! Read-only snapshots for the render collaborator
//!
//! Rendering lives outside this crate. Each frame it asks the game for a flat
//! list of drawables plus the HUD contents; nothing here mutates state.

use glam::Vec2;
use serde::Serialize;

use crate::game::{Game, MENU_OPTIONS, MULTIPLAYER_OPTIONS, Mode, SHOP_ITEMS};
use crate::sim::{EffectKind, EnemyKind, PowerUpKind};
use crate::{Rgb, palette};

/// Remote ships are drawn dimmed
const REMOTE_TINT: Rgb = Rgb(160, 160, 160);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EntityKind {
    Player { slot: u8 },
    RemotePlayer { slot: u8 },
    Enemy(EnemyKind),
    Boss,
    PlayerBullet,
    EnemyBullet,
    PowerUp(PowerUpKind),
    Particle,
}

/// One drawable circle-ish thing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Facing (radians) where it matters, else 0
    pub angle: f32,
    pub color: Rgb,
    /// 0..1 for things with a health bar
    pub health: Option<f32>,
    /// 0..1 opacity (particles fade)
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerHud {
    pub slot: u8,
    pub color: Rgb,
    pub score: u64,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    /// Active effects with milliseconds left
    pub effects: Vec<(EffectKind, u64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    pub mode: Mode,
    pub credits: u64,
    /// Option labels of the current menu (empty outside menus)
    pub options: Vec<String>,
    pub selection: usize,
    pub join_address: String,
    pub wave: Option<u32>,
    pub boss_health: Option<f32>,
    pub players: Vec<PlayerHud>,
    pub total_score: u64,
    /// Credits the current total would convert to
    pub credits_earned: u64,
    pub online: bool,
}

fn labels(options: &[&str]) -> Vec<String> {
    options.iter().map(|s| s.to_string()).collect()
}

impl Game {
    /// Everything to draw this frame, back to front
    pub fn entity_views(&self) -> Vec<EntityView> {
        let Some(world) = self.world() else {
            return Vec::new();
        };

        let mut views = Vec::with_capacity(
            world.particles.len()
                + world.powerups.len()
                + world.enemies.len()
                + world.player_bullets.len()
                + world.enemy_bullets.len()
                + world.players.len()
                + world.remote_players.len()
                + 1,
        );

        views.extend(world.particles.iter().map(|p| EntityView {
            kind: EntityKind::Particle,
            pos: p.pos,
            radius: p.size,
            angle: 0.0,
            color: p.color,
            health: None,
            alpha: p.fade(),
        }));
        views.extend(world.powerups.iter().map(|p| EntityView {
            kind: EntityKind::PowerUp(p.kind),
            pos: p.pos,
            radius: p.radius,
            angle: p.spin,
            color: p.kind.color(),
            health: None,
            alpha: 1.0,
        }));
        views.extend(world.enemies.iter().map(|e| EntityView {
            kind: EntityKind::Enemy(e.kind),
            pos: e.pos,
            radius: e.radius,
            angle: 0.0,
            color: e.color(),
            health: Some(e.health_fraction()),
            alpha: 1.0,
        }));
        if let Some(boss) = &world.boss {
            views.push(EntityView {
                kind: EntityKind::Boss,
                pos: boss.pos,
                radius: boss.radius,
                angle: boss.phase,
                color: palette::PURPLE,
                health: Some(boss.health_fraction()),
                alpha: 1.0,
            });
        }
        views.extend(world.player_bullets.iter().map(|b| EntityView {
            kind: EntityKind::PlayerBullet,
            pos: b.pos,
            radius: b.radius,
            angle: b.angle,
            color: palette::CYAN,
            health: None,
            alpha: 1.0,
        }));
        views.extend(world.enemy_bullets.iter().map(|b| EntityView {
            kind: EntityKind::EnemyBullet,
            pos: b.pos,
            radius: b.radius,
            angle: b.angle,
            color: palette::RED,
            health: None,
            alpha: 1.0,
        }));
        views.extend(world.remote_players.iter().map(|r| EntityView {
            kind: EntityKind::RemotePlayer { slot: r.slot },
            pos: r.pos,
            radius: crate::sim::player::PLAYER_RADIUS,
            angle: r.angle,
            color: REMOTE_TINT,
            health: None,
            alpha: 1.0,
        }));
        // Dead ships are not drawn
        views.extend(world.players.iter().filter(|p| p.is_alive()).map(|p| EntityView {
            kind: EntityKind::Player { slot: p.slot },
            pos: p.pos,
            radius: p.radius,
            angle: p.angle,
            color: p.color,
            health: Some(p.health_fraction()),
            alpha: 1.0,
        }));

        views
    }

    pub fn hud(&self) -> HudView {
        let (options, selection) = match self.mode() {
            Mode::Menu => (labels(&MENU_OPTIONS), self.menu_selection()),
            Mode::MultiplayerMenu => (labels(&MULTIPLAYER_OPTIONS), self.menu_selection()),
            Mode::Shop => (
                SHOP_ITEMS
                    .iter()
                    .map(|item| format!("{} - {} credits", item.name, item.cost))
                    .collect(),
                self.shop_selection(),
            ),
            _ => (Vec::new(), 0),
        };

        let now = self.now_ms();
        let world = self.world();
        let players = world
            .map(|w| {
                w.players
                    .iter()
                    .map(|p| PlayerHud {
                        slot: p.slot,
                        color: p.color,
                        score: p.score,
                        health: p.health,
                        max_health: p.max_health,
                        alive: p.is_alive(),
                        effects: p
                            .effects
                            .iter()
                            .map(|(kind, expiry)| (kind, expiry.saturating_sub(now)))
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let total_score = world.map_or(0, |w| w.total_score());

        HudView {
            mode: self.mode(),
            credits: self.credits(),
            options,
            selection,
            join_address: self.join_address().to_string(),
            wave: world.map(|w| w.wave()),
            boss_health: world.and_then(|w| w.boss.as_ref()).map(|b| b.health_fraction()),
            players,
            total_score,
            credits_earned: total_score / crate::consts::SCORE_PER_CREDIT,
            online: self.online_role().is_some(),
        }
    }
}
