//! Common test utilities for socklink integration tests
//!
//! - [`MockWsServer`]: in-process WebSocket server that can drop its sessions
//! - [`ScriptedTransport`]: transport double that reports events on a timer
//! - [`StatusLog`]: records a manager's status transitions

#![allow(dead_code)]

use parking_lot::Mutex;
use socklink::{
    ConnectionManager, EventEmitter, ManagerEvent, ManagerEventKind, StatusChange, Transport,
    TransportEvent,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// A mock WebSocket server for testing
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    kick: Arc<Notify>,
    accepted: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server on a free port
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let kick = Arc::new(Notify::new());
        let accepted = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));

        {
            let shutdown = Arc::clone(&shutdown);
            let kick = Arc::clone(&kick);
            let accepted = Arc::clone(&accepted);
            let active = Arc::clone(&active);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            match result {
                                Ok((stream, _)) => {
                                    accepted.fetch_add(1, Ordering::SeqCst);
                                    let shutdown = Arc::clone(&shutdown);
                                    let kick = Arc::clone(&kick);
                                    let active = Arc::clone(&active);
                                    tokio::spawn(async move {
                                        Self::handle_connection(stream, shutdown, kick, active).await;
                                    });
                                }
                                Err(e) => {
                                    eprintln!("Accept error: {}", e);
                                    break;
                                }
                            }
                        }
                        _ = shutdown.notified() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            addr,
            shutdown,
            kick,
            accepted,
            active,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        shutdown: Arc<Notify>,
        kick: Arc<Notify>,
        active: Arc<AtomicUsize>,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        active.fetch_add(1, Ordering::SeqCst);
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            if msg.is_text() || msg.is_binary() {
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = kick.notified() => {
                    let _ = write.close().await;
                    break;
                }
                _ = shutdown.notified() => {
                    let _ = write.close().await;
                    break;
                }
            }
        }

        active.fetch_sub(1, Ordering::SeqCst);
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of TCP connections accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Number of WebSocket sessions currently open
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Close every open session from the server side, keep accepting
    pub fn kick_all(&self) {
        self.kick.notify_waiters();
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Address on which nothing is listening
pub async fn unused_ws_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

/// Poll `condition` every 10ms until it holds or `within` elapses
pub async fn eventually(within: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Transport double: reports `connect`/`disconnect` after a fixed delay
///
/// A delay of `None` means the command is recorded but never answered.
pub struct ScriptedTransport {
    events: Arc<EventEmitter<TransportEvent>>,
    connect_delay: Option<Duration>,
    disconnect_delay: Option<Duration>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(connect_delay: Option<Duration>, disconnect_delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            events: Arc::new(EventEmitter::new()),
            connect_delay,
            disconnect_delay,
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Report an event as if the socket produced it
    pub fn emit(&self, event: TransportEvent) {
        self.events.emit(&event);
    }

    fn report_later(&self, delay: Option<Duration>, event: TransportEvent) {
        if let Some(delay) = delay {
            let events = Arc::clone(&self.events);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                events.emit(&event);
            });
        }
    }
}

impl Transport for ScriptedTransport {
    fn connect(&self) {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.report_later(self.connect_delay, TransportEvent::Connect);
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.report_later(
            self.disconnect_delay,
            TransportEvent::Disconnect("io client disconnect".to_string()),
        );
    }

    fn events(&self) -> &EventEmitter<TransportEvent> {
        &self.events
    }
}

/// Records every `StatusChanged` a manager emits
#[derive(Clone, Default)]
pub struct StatusLog(Arc<Mutex<Vec<StatusChange>>>);

impl StatusLog {
    pub fn attach(manager: &ConnectionManager) -> Self {
        let log = Self::default();
        let inner = Arc::clone(&log.0);
        manager.on(ManagerEventKind::StatusChanged, move |event| {
            if let ManagerEvent::StatusChanged(change) = event {
                inner.lock().push(*change);
            }
        });
        log
    }

    pub fn changes(&self) -> Vec<StatusChange> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}
