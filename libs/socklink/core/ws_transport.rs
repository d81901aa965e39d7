//! WebSocket transport built on `tokio-tungstenite`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  connect / disconnect   ┌──────────────────────────┐
//! │ WsTransport  │ ──── unbounded mpsc ──> │ driver task (Tokio)      │
//! │  (handle)    │                         │  idle → open → session   │
//! └──────┬───────┘                         │   ↑        │             │
//!        │ events()                        │   └─ reconnect schedule  │
//!        ▼                                 └────────────┬─────────────┘
//!  EventEmitter<TransportEvent>  <──── emit ────────────┘
//! ```
//!
//! The driver owns the socket, the connect timeout and the reconnection
//! schedule. Every `connect` it accepts ends in `Connect` or in
//! `Disconnect`/`ReconnectFailed` being reported, so an observer that
//! marked itself connecting is never left waiting on a transport that went
//! idle.

use crate::config::{TransportConfig, TransportKind};
use crate::emitter::EventEmitter;
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Disconnect reason when the local side closed the socket
pub const CLIENT_DISCONNECT: &str = "io client disconnect";

/// Disconnect reason when the remote side went away
pub const TRANSPORT_CLOSE: &str = "transport close";

#[derive(Debug)]
enum TransportCommand {
    Connect,
    Disconnect,
    Shutdown,
}

/// How the driver left a connection cycle
enum Cycle {
    Idle,
    Shutdown,
}

/// Outcome of waiting on a future while still obeying commands
enum Step<T> {
    Done(T),
    Disconnect,
    Shutdown,
}

/// How an open session ended
enum SessionEnd {
    ClientDisconnect,
    Lost(String),
    Shutdown,
}

/// WebSocket implementation of [`Transport`]
///
/// Must be created inside a Tokio runtime: construction spawns the driver
/// task. Dropping the handle stops the driver and closes any open socket.
pub struct WsTransport {
    url: String,
    events: Arc<EventEmitter<TransportEvent>>,
    command_tx: mpsc::UnboundedSender<TransportCommand>,
}

impl WsTransport {
    /// Create the transport in the idle (disconnected) state
    ///
    /// `auto_connect` is not acted on here; the owner issues the first
    /// `connect` once its listeners are attached.
    ///
    /// # Errors
    /// - [`SockLinkError::Configuration`] if `websocket` is not an allowed transport
    /// - [`SockLinkError::Transport`] if called outside a Tokio runtime
    pub fn new(url: impl Into<String>, config: TransportConfig) -> Result<Self> {
        let url = url.into();

        if !config.allows(TransportKind::Websocket) {
            return Err(SockLinkError::Configuration(format!(
                "transports {:?} do not include websocket",
                config.transports
            )));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SockLinkError::Transport(format!("no Tokio runtime: {}", e)))?;

        let events = Arc::new(EventEmitter::new());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        runtime.spawn(run_transport(
            url.clone(),
            config,
            Arc::clone(&events),
            command_rx,
        ));

        debug!(url = %url, "WebSocket transport initialized");

        Ok(Self {
            url,
            events,
            command_tx,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn send(&self, command: TransportCommand) {
        if let Err(e) = self.command_tx.send(command) {
            warn!(url = %self.url, "Transport task is gone, dropping {:?}", e.0);
        }
    }
}

impl Transport for WsTransport {
    fn connect(&self) {
        self.send(TransportCommand::Connect);
    }

    fn disconnect(&self) {
        self.send(TransportCommand::Disconnect);
    }

    fn events(&self) -> &EventEmitter<TransportEvent> {
        &self.events
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        let _ = self.command_tx.send(TransportCommand::Shutdown);
    }
}

/// Driver task: waits for `connect` while idle, then runs connection cycles
async fn run_transport(
    url: String,
    config: TransportConfig,
    events: Arc<EventEmitter<TransportEvent>>,
    mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
) {
    let mut strategy = config.reconnect_strategy();

    loop {
        match command_rx.recv().await {
            Some(TransportCommand::Connect) => {}
            Some(TransportCommand::Disconnect) => {
                trace!(url = %url, "Disconnect while idle, nothing to do");
                continue;
            }
            Some(TransportCommand::Shutdown) | None => break,
        }

        let cycle = run_cycle(
            &url,
            &config,
            strategy.as_mut(),
            &events,
            &mut command_rx,
        )
        .await;

        if let Cycle::Shutdown = cycle {
            break;
        }
    }

    debug!(url = %url, "Transport task exiting");
}

/// One connection cycle: initial attempt, sessions and reconnections,
/// until the transport goes idle again
async fn run_cycle(
    url: &str,
    config: &TransportConfig,
    strategy: &mut dyn ReconnectionStrategy,
    events: &EventEmitter<TransportEvent>,
    command_rx: &mut mpsc::UnboundedReceiver<TransportCommand>,
) -> Cycle {
    // 0 = initial attempt, n > 0 = n-th reconnection attempt
    let mut attempt = 0usize;

    loop {
        if attempt > 0 {
            let Some(delay) = strategy.next_delay(attempt - 1) else {
                warn!(url, attempts = attempt - 1, "Reconnection strategy exhausted, stopping");
                events.emit(&TransportEvent::ReconnectFailed);
                return Cycle::Idle;
            };

            info!(url, "Reconnecting in {:?} (attempt {})", delay, attempt);
            events.emit(&TransportEvent::ReconnectAttempt(attempt));
            events.emit(&TransportEvent::Reconnecting(attempt));

            match until_command(tokio::time::sleep(delay), command_rx).await {
                Step::Done(()) => {}
                Step::Disconnect => {
                    events.emit(&TransportEvent::Disconnect(CLIENT_DISCONNECT.to_string()));
                    return Cycle::Idle;
                }
                Step::Shutdown => return Cycle::Shutdown,
            }
        }

        match until_command(open(url, config.timeout()), command_rx).await {
            Step::Done(Ok(ws_stream)) => {
                info!(url, "Connected");
                if attempt > 0 {
                    events.emit(&TransportEvent::Reconnect(attempt));
                }
                events.emit(&TransportEvent::Connect);
                strategy.reset();

                match run_session(ws_stream, events, command_rx).await {
                    SessionEnd::ClientDisconnect => {
                        events.emit(&TransportEvent::Disconnect(CLIENT_DISCONNECT.to_string()));
                        return Cycle::Idle;
                    }
                    SessionEnd::Shutdown => return Cycle::Shutdown,
                    SessionEnd::Lost(reason) => {
                        warn!(url, reason = %reason, "Connection lost");
                        events.emit(&TransportEvent::Disconnect(reason));
                        if !config.reconnection {
                            return Cycle::Idle;
                        }
                        attempt = 1;
                    }
                }
            }
            Step::Done(Err(reason)) => {
                error!(url, reason = %reason, attempt, "Failed to connect");
                if attempt == 0 {
                    events.emit(&TransportEvent::ConnectError(reason.clone()));
                    if !config.reconnection {
                        events.emit(&TransportEvent::Disconnect(reason));
                        return Cycle::Idle;
                    }
                } else {
                    events.emit(&TransportEvent::ReconnectError(reason));
                }
                attempt += 1;
            }
            Step::Disconnect => {
                debug!(url, "Connection attempt abandoned");
                events.emit(&TransportEvent::Disconnect(CLIENT_DISCONNECT.to_string()));
                return Cycle::Idle;
            }
            Step::Shutdown => return Cycle::Shutdown,
        }
    }
}

/// Open the WebSocket, bounded by `timeout`
async fn open(url: &str, timeout: Duration) -> std::result::Result<WsStream, String> {
    match tokio::time::timeout(timeout, connect_async(url)).await {
        Ok(Ok((ws_stream, _response))) => Ok(ws_stream),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("timeout".to_string()),
    }
}

/// Drive `future` to completion unless a disconnect/shutdown arrives first
async fn until_command<F: Future>(
    future: F,
    command_rx: &mut mpsc::UnboundedReceiver<TransportCommand>,
) -> Step<F::Output> {
    tokio::pin!(future);

    loop {
        tokio::select! {
            output = &mut future => return Step::Done(output),
            command = command_rx.recv() => match command {
                Some(TransportCommand::Connect) => {
                    trace!("Connect while already connecting, ignoring");
                }
                Some(TransportCommand::Disconnect) => return Step::Disconnect,
                Some(TransportCommand::Shutdown) | None => return Step::Shutdown,
            }
        }
    }
}

/// Keep an open socket alive until either side closes it
///
/// Inbound frames are drained; ping replies are handled by tungstenite.
async fn run_session(
    ws_stream: WsStream,
    events: &EventEmitter<TransportEvent>,
    command_rx: &mut mpsc::UnboundedReceiver<TransportCommand>,
) -> SessionEnd {
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Close(_))) | None => {
                    return SessionEnd::Lost(TRANSPORT_CLOSE.to_string());
                }
                Some(Ok(frame)) => {
                    trace!(len = frame.len(), "Dropping inbound frame");
                }
                Some(Err(e)) => {
                    error!("WebSocket error: {}", e);
                    events.emit(&TransportEvent::Error(e.to_string()));
                    return SessionEnd::Lost(format!("transport error: {}", e));
                }
            },
            command = command_rx.recv() => match command {
                Some(TransportCommand::Connect) => {
                    trace!("Connect while connected, ignoring");
                }
                Some(TransportCommand::Disconnect) => {
                    let _ = write.close().await;
                    return SessionEnd::ClientDisconnect;
                }
                Some(TransportCommand::Shutdown) | None => {
                    let _ = write.close().await;
                    return SessionEnd::Shutdown;
                }
            }
        }
    }
}
