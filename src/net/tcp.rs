//! TCP transport: newline-delimited JSON over tokio
//!
//! The transport owns a small tokio runtime. Reader tasks parse lines and
//! push them into a bounded inbox the simulation drains each tick; writer
//! tasks forward a broadcast of encoded lines to each connection.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::protocol::{MAX_LINE_BYTES, NetMessage};
use super::{NetError, Network};

/// Inbound messages buffered between ticks
pub const INBOX_CAPACITY: usize = 256;
/// Outbound lines buffered per writer before it starts skipping
const OUTBOX_CAPACITY: usize = 256;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Back-off after a failed accept
const ACCEPT_RETRY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Host,
    Client,
}

/// Live transport state; dropped as a whole on disconnect
struct Link {
    runtime: Runtime,
    role: Role,
    inbox: mpsc::Receiver<NetMessage>,
    outbound: broadcast::Sender<Arc<str>>,
    tasks: Vec<JoinHandle<()>>,
    open: bool,
}

#[derive(Default)]
pub struct TcpNetwork {
    link: Option<Link>,
}

impl TcpNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_host(&self) -> bool {
        self.link.as_ref().is_some_and(|l| l.role == Role::Host)
    }
}

fn build_runtime() -> Result<Runtime, NetError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("nova-net")
        .enable_all()
        .build()
        .map_err(NetError::Runtime)
}

impl Network for TcpNetwork {
    fn host(&mut self, port: u16) -> Result<(), NetError> {
        self.disconnect();
        let runtime = build_runtime()?;
        let listener = runtime
            .block_on(TcpListener::bind(("0.0.0.0", port)))
            .map_err(NetError::Bind)?;

        let (inbox_tx, inbox) = mpsc::channel(INBOX_CAPACITY);
        let (outbound, _) = broadcast::channel(OUTBOX_CAPACITY);
        let accept = runtime.spawn(accept_loop(listener, inbox_tx, outbound.clone()));

        log::info!("Hosting on port {port}");
        self.link = Some(Link {
            runtime,
            role: Role::Host,
            inbox,
            outbound,
            tasks: vec![accept],
            open: true,
        });
        Ok(())
    }

    fn join(&mut self, addr: &str, port: u16) -> Result<(), NetError> {
        self.disconnect();
        let runtime = build_runtime()?;
        let stream = runtime
            .block_on(async {
                tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((addr, port))).await
            })
            .map_err(|_| {
                NetError::Connect(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "connect timed out",
                ))
            })?
            .map_err(NetError::Connect)?;

        let (inbox_tx, inbox) = mpsc::channel(INBOX_CAPACITY);
        let (outbound, outbound_rx) = broadcast::channel(OUTBOX_CAPACITY);
        let (read, write) = stream.into_split();
        let tasks = vec![
            runtime.spawn(read_loop(read, inbox_tx)),
            runtime.spawn(write_loop(write, outbound_rx)),
        ];

        log::info!("Joined {addr}:{port}");
        self.link = Some(Link {
            runtime,
            role: Role::Client,
            inbox,
            outbound,
            tasks,
            open: true,
        });
        Ok(())
    }

    fn send(&mut self, msg: &NetMessage) {
        let Some(link) = self.link.as_ref().filter(|l| l.open) else {
            return;
        };
        match msg.encode() {
            // No receivers just means no peer has connected yet
            Ok(line) => {
                let _ = link.outbound.send(Arc::from(line));
            }
            Err(e) => log::warn!("Could not encode outbound message: {e}"),
        }
    }

    fn receive(&mut self) -> Vec<NetMessage> {
        let Some(link) = self.link.as_mut() else {
            return Vec::new();
        };

        let mut messages = Vec::new();
        loop {
            match link.inbox.try_recv() {
                Ok(msg) => messages.push(msg),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if link.open {
                        log::warn!("Connection to host lost");
                    }
                    link.open = false;
                    break;
                }
            }
        }
        messages
    }

    fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            for task in &link.tasks {
                task.abort();
            }
            link.runtime.shutdown_background();
            log::info!("Disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(|l| l.open)
    }
}

impl Drop for TcpNetwork {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn accept_loop(
    listener: TcpListener,
    inbox: mpsc::Sender<NetMessage>,
    outbound: broadcast::Sender<Arc<str>>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                log::info!("Peer connected from {addr}");
                let (read, write) = stream.into_split();
                tokio::spawn(read_loop(read, inbox.clone()));
                tokio::spawn(write_loop(write, outbound.subscribe()));
            }
            Err(e) => {
                log::warn!("Accept failed: {e}");
                tokio::time::sleep(ACCEPT_RETRY).await;
            }
        }
    }
}

/// Read newline-terminated messages. A line longer than `MAX_LINE_BYTES`
/// ends the connection before it is buffered in full.
async fn read_loop(read: OwnedReadHalf, inbox: mpsc::Sender<NetMessage>) {
    let mut reader = BufReader::new(read);
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        let limit = MAX_LINE_BYTES as u64 + 1;
        match (&mut reader).take(limit).read_until(b'\n', &mut buf).await {
            Ok(0) => {
                log::info!("Peer closed the connection");
                break;
            }
            Ok(_) if buf.len() > MAX_LINE_BYTES && buf.last() != Some(&b'\n') => {
                log::warn!("Peer sent a line over {MAX_LINE_BYTES} bytes, closing");
                break;
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let Some(msg) = NetMessage::decode(&line) else {
                    continue;
                };
                match inbox.try_send(msg) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => log::warn!("Inbox full, dropping message"),
                    Err(TrySendError::Closed(_)) => break,
                }
            }
            Err(e) => {
                log::warn!("Read failed: {e}");
                break;
            }
        }
    }
}

async fn write_loop(mut write: OwnedWriteHalf, mut outbound: broadcast::Receiver<Arc<str>>) {
    loop {
        match outbound.recv().await {
            Ok(line) => {
                if let Err(e) = write.write_all(line.as_bytes()).await {
                    log::warn!("Write failed: {e}");
                    break;
                }
            }
            Err(RecvError::Lagged(n)) => log::warn!("Writer lagged, skipped {n} messages"),
            Err(RecvError::Closed) => break,
        }
    }
}
