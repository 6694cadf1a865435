//! Straight-line projectiles fired by players and enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{Field, direction};

/// Player bullet defaults
pub const PLAYER_BULLET_SPEED: f32 = 12.0;
pub const PLAYER_BULLET_RADIUS: f32 = 4.0;
/// Enemy bullet collision radius
pub const ENEMY_BULLET_RADIUS: f32 = 5.0;

/// A projectile. Lives until it leaves the field; there is no timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Travel direction (radians)
    pub angle: f32,
    /// Field units per tick
    pub speed: f32,
    pub damage: i32,
    pub radius: f32,
    /// Firing player slot; `None` for enemy bullets
    pub owner: Option<u8>,
}

impl Bullet {
    pub fn player(pos: Vec2, angle: f32, damage: i32, owner: u8) -> Self {
        Self {
            pos,
            angle,
            speed: PLAYER_BULLET_SPEED,
            damage,
            radius: PLAYER_BULLET_RADIUS,
            owner: Some(owner),
        }
    }

    pub fn enemy(pos: Vec2, angle: f32, speed: f32, damage: i32) -> Self {
        Self {
            pos,
            angle,
            speed,
            damage,
            radius: ENEMY_BULLET_RADIUS,
            owner: None,
        }
    }

    /// Move one tick along `angle`. Returns true while still inside the field.
    pub fn advance(&mut self, field: &Field) -> bool {
        self.pos += direction(self.angle) * self.speed;
        field.contains(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bullet_dies_on_exit() {
        let field = Field::default();
        let mut b = Bullet::player(Vec2::new(400.0, 10.0), -std::f32::consts::FRAC_PI_2, 10, 0);
        assert!(!b.advance(&field)); // y = -2
    }

    #[test]
    fn test_bullet_on_edge_is_alive() {
        let field = Field::default();
        let mut b = Bullet::enemy(Vec2::new(795.0, 300.0), 0.0, 5.0, 10);
        assert!(b.advance(&field)); // exactly x = 800
        assert!(!b.advance(&field));
    }

    proptest! {
        #[test]
        fn prop_linear_motion(
            x in 100.0f32..700.0,
            y in 100.0f32..500.0,
            angle in -3.14f32..3.14,
            speed in 1.0f32..12.0,
            k in 1u32..8,
        ) {
            let field = Field::default();
            let start = Vec2::new(x, y);
            let mut b = Bullet::enemy(start, angle, speed, 10);
            for _ in 0..k {
                if !b.advance(&field) {
                    // Exited; kinematics no longer observable
                    return Ok(());
                }
            }
            let expected = start + Vec2::new(angle.cos(), angle.sin()) * speed * k as f32;
            prop_assert!((b.pos - expected).length() < 1e-3);
        }
    }
}
