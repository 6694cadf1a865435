//! Best-effort peer networking
//!
//! The simulation only ever talks to a `Network`: it pushes messages out and
//! drains whatever arrived since the last tick. Nothing here blocks a tick.

pub mod protocol;
pub mod tcp;

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};

pub use protocol::{NetMessage, PROTOCOL_VERSION, Payload};
pub use tcp::TcpNetwork;

#[derive(Debug)]
pub enum NetError {
    /// Could not listen on the requested port
    Bind(io::Error),
    /// Could not reach the host
    Connect(io::Error),
    /// Transport runtime failed to start
    Runtime(io::Error),
    NotConnected,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Bind(e) => write!(f, "bind failed: {e}"),
            NetError::Connect(e) => write!(f, "connect failed: {e}"),
            NetError::Runtime(e) => write!(f, "transport runtime failed: {e}"),
            NetError::NotConnected => write!(f, "not connected"),
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetError::Bind(e) | NetError::Connect(e) | NetError::Runtime(e) => Some(e),
            NetError::NotConnected => None,
        }
    }
}

impl From<io::Error> for NetError {
    fn from(e: io::Error) -> Self {
        NetError::Runtime(e)
    }
}

/// A link to zero or more peers
pub trait Network {
    /// Listen for peers on `port`
    fn host(&mut self, port: u16) -> Result<(), NetError>;
    /// Connect to a host. This may wait on the connection attempt (the TCP
    /// transport gives up after five seconds), so call it from the join menu
    /// and never from inside a running session.
    fn join(&mut self, addr: &str, port: u16) -> Result<(), NetError>;
    /// Queue a message for every connected peer. Never blocks.
    fn send(&mut self, msg: &NetMessage);
    /// Everything received since the last call, in arrival order
    fn receive(&mut self) -> Vec<NetMessage>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
}

#[derive(Debug, Default)]
struct MemoryLink {
    connected: bool,
    refuse: bool,
    sent: Vec<NetMessage>,
    inbound: VecDeque<NetMessage>,
}

/// In-process `Network`. Clones share one link, so a test keeps a handle to
/// inject inbound messages and inspect what was sent.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    link: Arc<Mutex<MemoryLink>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// A link whose `host` and `join` always fail
    pub fn refusing() -> Self {
        let net = Self::default();
        net.with_link(|link| link.refuse = true);
        net
    }

    /// Make `msg` arrive on the next `receive`
    pub fn inject(&self, msg: NetMessage) {
        self.with_link(|link| link.inbound.push_back(msg));
    }

    /// Drain everything sent so far
    pub fn take_sent(&self) -> Vec<NetMessage> {
        self.with_link(|link| std::mem::take(&mut link.sent))
            .unwrap_or_default()
    }

    fn with_link<T>(&self, f: impl FnOnce(&mut MemoryLink) -> T) -> Option<T> {
        self.link.lock().ok().map(|mut link| f(&mut link))
    }

    fn open(&self) -> Result<(), NetError> {
        match self.with_link(|link| {
            if !link.refuse {
                link.connected = true;
            }
            link.connected
        }) {
            Some(true) => Ok(()),
            _ => Err(NetError::Connect(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "memory link refused",
            ))),
        }
    }
}

impl Network for MemoryNetwork {
    fn host(&mut self, _port: u16) -> Result<(), NetError> {
        self.open()
    }

    fn join(&mut self, _addr: &str, _port: u16) -> Result<(), NetError> {
        self.open()
    }

    fn send(&mut self, msg: &NetMessage) {
        self.with_link(|link| {
            if link.connected {
                link.sent.push(msg.clone());
            }
        });
    }

    fn receive(&mut self) -> Vec<NetMessage> {
        self.with_link(|link| {
            if link.connected {
                link.inbound.drain(..).collect()
            } else {
                Vec::new()
            }
        })
        .unwrap_or_default()
    }

    fn disconnect(&mut self) {
        self.with_link(|link| link.connected = false);
    }

    fn is_connected(&self) -> bool {
        self.with_link(|link| link.connected).unwrap_or(false)
    }
}
