//! Wire contract between peers
//!
//! One JSON object per line:
//! `{"v": 1, "peer": <u64>, "type": "<Kind>", "data": {...}}`

use serde::{Deserialize, Serialize};

/// Bumped on any incompatible change to `Payload`
pub const PROTOCOL_VERSION: u32 = 1;
/// Longest line a peer may send
pub const MAX_LINE_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    /// A local ship's current state, sent every tick
    PlayerState {
        slot: u8,
        x: f32,
        y: f32,
        angle: f32,
        health: i32,
    },
    /// A bullet fired by the sender's ship
    Shot {
        slot: u8,
        x: f32,
        y: f32,
        angle: f32,
        damage: i32,
    },
    /// Host announces the wave it just started
    WaveSync { wave: u32 },
    /// Sender is leaving the session
    Goodbye,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetMessage {
    pub v: u32,
    /// Sender's peer id
    pub peer: u64,
    #[serde(flatten)]
    pub payload: Payload,
}

impl NetMessage {
    pub fn new(peer: u64, payload: Payload) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            peer,
            payload,
        }
    }

    /// Serialize as one newline-terminated line
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Parse one line. Anything malformed, oversized or from another
    /// protocol version is dropped with a warning.
    pub fn decode(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.len() > MAX_LINE_BYTES {
            log::warn!("Dropping oversized message ({} bytes)", line.len());
            return None;
        }

        match serde_json::from_str::<NetMessage>(line) {
            Ok(msg) if msg.v == PROTOCOL_VERSION => Some(msg),
            Ok(msg) => {
                log::warn!("Dropping message with protocol version {}", msg.v);
                None
            }
            Err(e) => {
                log::warn!("Dropping malformed message: {e}");
                None
            }
        }
    }
}
