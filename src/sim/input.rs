//! Per-slot control mapping
//!
//! The input collaborator samples the keyboard and pointer into an
//! `InputSnapshot` once per tick. Each local player slot reads its own keys
//! out of that snapshot through its `KeyBindings`.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Every key the simulation binds for in-game control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    I,
    J,
    K,
    L,
    T,
    F,
    G,
    H,
    B,
    Space,
    Up,
    Down,
    Left,
    Right,
    Kp2,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    KpDivide,
    KpEnter,
    Home,
    End,
    Delete,
    PageDown,
}

/// Pressed-state of the keyboard and pointer for one tick
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub pressed: HashSet<Key>,
    /// Pointer position in field coordinates
    pub pointer: Option<Vec2>,
    /// Primary pointer button held
    pub pointer_down: bool,
}

impl InputSnapshot {
    pub fn with_keys(keys: &[Key]) -> Self {
        Self {
            pressed: keys.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// How a slot aims
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimSource {
    Pointer,
    Keys {
        up: Key,
        down: Key,
        left: Key,
        right: Key,
    },
}

/// How a slot fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireSource {
    PointerButton,
    Key(Key),
}

/// Key layout for one local player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub up: Key,
    pub down: Key,
    pub left: Key,
    pub right: Key,
    pub aim: AimSource,
    pub fire: FireSource,
}

impl KeyBindings {
    /// Number of local slots with a binding
    pub const SLOTS: usize = 4;

    pub fn for_slot(slot: usize) -> Self {
        match slot {
            0 => Self {
                up: Key::W,
                down: Key::S,
                left: Key::A,
                right: Key::D,
                aim: AimSource::Pointer,
                fire: FireSource::PointerButton,
            },
            1 => Self {
                up: Key::I,
                down: Key::K,
                left: Key::J,
                right: Key::L,
                aim: AimSource::Keys {
                    up: Key::Up,
                    down: Key::Down,
                    left: Key::Left,
                    right: Key::Right,
                },
                fire: FireSource::Key(Key::Space),
            },
            2 => Self {
                up: Key::T,
                down: Key::G,
                left: Key::F,
                right: Key::H,
                aim: AimSource::Keys {
                    up: Key::Kp8,
                    down: Key::Kp2,
                    left: Key::Kp4,
                    right: Key::Kp6,
                },
                fire: FireSource::Key(Key::B),
            },
            _ => Self {
                up: Key::Home,
                down: Key::End,
                left: Key::Delete,
                right: Key::PageDown,
                aim: AimSource::Keys {
                    up: Key::KpDivide,
                    down: Key::Kp5,
                    left: Key::Kp7,
                    right: Key::Kp9,
                },
                fire: FireSource::Key(Key::KpEnter),
            },
        }
    }

    /// Resolve this slot's controls from the snapshot. `pos` is the ship's
    /// current position, needed to turn the pointer into an aim vector.
    pub fn controls(&self, snapshot: &InputSnapshot, pos: Vec2) -> Controls {
        let axis = |neg: Key, plus: Key| -> f32 {
            let mut v = 0.0;
            if snapshot.is_down(neg) {
                v -= 1.0;
            }
            if snapshot.is_down(plus) {
                v += 1.0;
            }
            v
        };

        let movement = Vec2::new(axis(self.left, self.right), axis(self.up, self.down));
        let aim = match self.aim {
            AimSource::Pointer => snapshot.pointer.map(|p| p - pos).unwrap_or(Vec2::ZERO),
            AimSource::Keys {
                up,
                down,
                left,
                right,
            } => Vec2::new(axis(left, right), axis(up, down)),
        };
        let fire = match self.fire {
            FireSource::PointerButton => snapshot.pointer_down,
            FireSource::Key(key) => snapshot.is_down(key),
        };

        Controls {
            movement,
            aim,
            fire,
        }
    }
}

/// One slot's resolved intent for a tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    /// Raw movement direction, each axis in {-1, 0, 1}
    pub movement: Vec2,
    /// Aim vector; zero means "keep facing"
    pub aim: Vec2,
    pub fire: bool,
}
