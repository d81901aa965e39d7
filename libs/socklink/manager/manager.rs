use super::events::{ManagerEvent, ManagerEventKind};
use crate::core::config::{ManagerConfig, TransportConfig};
use crate::core::emitter::{EventEmitter, ListenerId};
use crate::core::status::{AtomicStatus, Status, StatusChange};
use crate::core::ws_transport::WsTransport;
use crate::traits::{Result, SockLinkError, Transport, TransportEvent, TransportEventKind};
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Pause between checks while another operation holds the status at `Connecting`
pub const BACKOFF_WAIT: Duration = Duration::from_millis(500);

/// How a `start`/`stop` timeout applies across backoff waits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// The timeout is a hard deadline measured from the call
    #[default]
    Deadline,
    /// Every retry after a backoff wait gets the full timeout again
    PerAttempt,
}

/// Options for [`ConnectionManager::start_with`] and [`ConnectionManager::stop_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleOptions {
    /// Overrides the manager's default timeout
    pub timeout: Option<Duration>,
    pub policy: TimeoutPolicy,
}

impl LifecycleOptions {
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// State shared with the listeners attached to the transport
struct ManagerState {
    label: String,
    status: AtomicStatus,
    /// Serialises transitions and their emissions; re-entrant so a listener
    /// may call back into the manager from the emitting thread
    transition: ReentrantMutex<()>,
    events: EventEmitter<ManagerEvent>,
}

impl ManagerState {
    /// Move to `status`, emitting the status event then `StatusChanged`
    ///
    /// Returns `false` (and emits nothing) if `status` is already current.
    fn set_status(&self, status: Status) -> bool {
        let _transition = self.transition.lock();

        let previous = self.status.swap(status);
        if previous == status {
            return false;
        }

        debug!(manager = %self.label, %previous, to = %status, "Status changed");
        self.events.emit(&ManagerEvent::for_status(status));
        self.events.emit(&ManagerEvent::StatusChanged(StatusChange {
            previous,
            to: status,
        }));
        true
    }
}

/// Connection lifecycle manager for one socket
///
/// Tracks a three-valued [`Status`] driven by the transport's lifecycle
/// events, and offers idempotent, timeout-bounded [`start`](Self::start) /
/// [`stop`](Self::stop) that tolerate overlapping calls.
///
/// All methods take `&self`; share the manager between tasks with an `Arc`.
///
/// # Example
/// ```ignore
/// let manager = socklink::builder()
///     .server_address("ws://127.0.0.1:3000")
///     .timeout(Duration::from_secs(2))
///     .build()?;
///
/// manager.on(ManagerEventKind::StatusChanged, |event| println!("{:?}", event));
/// manager.start().await?;
/// assert!(manager.is_connected());
/// manager.stop().await?;
/// ```
pub struct ConnectionManager {
    state: Arc<ManagerState>,
    transport: Arc<dyn Transport>,
    transport_listeners: Vec<ListenerId>,
    server_address: String,
    transport_config: TransportConfig,
    default_timeout: Duration,
}

impl ConnectionManager {
    /// Create a manager backed by a [`WsTransport`] to `config.server_address`
    ///
    /// # Errors
    /// Fails if the WebSocket transport cannot be created (no Tokio runtime,
    /// or `websocket` missing from the allowed transports).
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let transport = WsTransport::new(config.server_address.clone(), config.transport.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a manager around an existing transport
    ///
    /// The transport must be idle; the manager starts `Disconnected` and
    /// attaches its listeners here, once.
    pub fn with_transport(config: ManagerConfig, transport: Arc<dyn Transport>) -> Self {
        let ManagerConfig {
            server_address,
            timeout_ms,
            label,
            transport: transport_config,
        } = config;

        let state = Arc::new(ManagerState {
            label: label.unwrap_or_else(|| server_address.clone()),
            status: AtomicStatus::new(Status::Disconnected),
            transition: ReentrantMutex::new(()),
            events: EventEmitter::new(),
        });

        let transport_listeners = attach_transport_listeners(&state, transport.as_ref());
        debug!(manager = %state.label, "socket initialized");

        if transport_config.auto_connect {
            debug!(manager = %state.label, "auto-connecting the socket");
            transport.connect();
        }

        Self {
            state,
            transport,
            transport_listeners,
            server_address,
            transport_config,
            default_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Begin connecting if currently `Disconnected`
    ///
    /// Marks the status `Connecting` before issuing the transport command.
    /// Returns `false` without doing anything if already connecting or
    /// connected.
    pub fn connect(&self) -> bool {
        let _transition = self.state.transition.lock();

        if !self.state.status.is_disconnected() {
            return false;
        }

        debug!(manager = %self.state.label, "connect the socket");
        self.state.set_status(Status::Connecting);
        self.transport.connect();
        true
    }

    /// Ask the transport to disconnect
    ///
    /// The status is not touched here: it becomes `Disconnected` when the
    /// transport reports its `disconnect` event.
    pub fn disconnect(&self) {
        debug!(manager = %self.state.label, "disconnect the socket");
        self.transport.disconnect();
    }

    /// [`start_with`](Self::start_with) using the default timeout
    pub async fn start(&self) -> Result<()> {
        self.start_with(LifecycleOptions::default()).await
    }

    /// Connect and wait until `Connected`
    ///
    /// - already `Connected`: returns immediately
    /// - `Connecting` (someone else is connecting): waits [`BACKOFF_WAIT`]
    ///   and checks again, without issuing another connect
    /// - `Disconnected`: connects and races the transport's next `connect`
    ///   event against the timeout
    ///
    /// The first connect is always issued, even with a zero timeout; an
    /// expired deadline only cuts the loop short after a backoff wait.
    ///
    /// # Errors
    /// [`SockLinkError::ConnectionTimeout`] if still not connected when the
    /// timeout expires.
    pub async fn start_with(&self, options: LifecycleOptions) -> Result<()> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let span = info_span!(
            "start",
            manager = %self.state.label,
            timeout_ms = timeout.as_millis() as u64
        );

        async {
            let started = Instant::now();
            let mut waited = false;

            loop {
                let status = self.status();
                if status == Status::Connected {
                    debug!("already connected");
                    return Ok(());
                }

                let budget = remaining(options.policy, timeout, started);
                if waited && budget.is_zero() {
                    return Err(self.timeout_error("start", timeout));
                }

                if status == Status::Connecting {
                    debug!(wait_ms = BACKOFF_WAIT.as_millis() as u64, "already connecting, wait");
                    tokio::time::sleep(BACKOFF_WAIT).await;
                    waited = true;
                    continue;
                }

                info!("Starting connection");
                return self.race_connect(budget, timeout).await;
            }
        }
        .instrument(span)
        .await
    }

    /// [`stop_with`](Self::stop_with) using the default timeout
    pub async fn stop(&self) -> Result<()> {
        self.stop_with(LifecycleOptions::default()).await
    }

    /// Disconnect and wait until `Disconnected`
    ///
    /// Mirrors [`start_with`](Self::start_with): returns immediately when
    /// already disconnected, waits out a `Connecting` status, otherwise
    /// races the manager's own `Disconnected` event against the timeout.
    pub async fn stop_with(&self, options: LifecycleOptions) -> Result<()> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let span = info_span!(
            "stop",
            manager = %self.state.label,
            timeout_ms = timeout.as_millis() as u64
        );

        async {
            let started = Instant::now();
            let mut waited = false;

            loop {
                let status = self.status();
                if status == Status::Disconnected {
                    debug!("already disconnected");
                    return Ok(());
                }

                let budget = remaining(options.policy, timeout, started);
                if waited && budget.is_zero() {
                    return Err(self.timeout_error("stop", timeout));
                }

                if status == Status::Connecting {
                    debug!(wait_ms = BACKOFF_WAIT.as_millis() as u64, "connecting, wait");
                    tokio::time::sleep(BACKOFF_WAIT).await;
                    waited = true;
                    continue;
                }

                debug!("Disconnect socket");
                return self.race_disconnect(budget, timeout).await;
            }
        }
        .instrument(span)
        .await
    }

    async fn race_connect(&self, budget: Duration, timeout: Duration) -> Result<()> {
        let (settle, settled) = barrier();
        let listener = self
            .transport
            .events()
            .once(TransportEventKind::Connect, move |_| settle());

        if self.is_connected() {
            self.transport.events().off(listener);
            return Ok(());
        }

        self.connect();
        let outcome = tokio::time::timeout(budget, settled).await;
        self.transport.events().off(listener);

        match outcome {
            Ok(Ok(())) => Ok(()),
            _ if self.is_connected() => Ok(()),
            _ => {
                warn!(status = %self.status(), "Socket connection timed out");
                Err(self.timeout_error("start", timeout))
            }
        }
    }

    async fn race_disconnect(&self, budget: Duration, timeout: Duration) -> Result<()> {
        let (settle, settled) = barrier();
        let listener = self
            .state
            .events
            .once(ManagerEventKind::Disconnected, move |_| settle());

        if self.is_disconnected() {
            self.state.events.off(listener);
            return Ok(());
        }

        self.disconnect();
        let outcome = tokio::time::timeout(budget, settled).await;
        self.state.events.off(listener);

        match outcome {
            Ok(Ok(())) => Ok(()),
            _ if self.is_disconnected() => Ok(()),
            _ => {
                warn!(status = %self.status(), "Socket disconnection timed out");
                Err(self.timeout_error("stop", timeout))
            }
        }
    }

    fn timeout_error(&self, operation: &'static str, timeout: Duration) -> SockLinkError {
        SockLinkError::ConnectionTimeout { operation, timeout }
    }

    /// Register a listener for a manager event
    pub fn on<F>(&self, kind: ManagerEventKind, listener: F) -> ListenerId
    where
        F: Fn(&ManagerEvent) + Send + Sync + 'static,
    {
        self.state.events.on(kind, listener)
    }

    /// Register a listener for the next occurrence of a manager event
    pub fn once<F>(&self, kind: ManagerEventKind, listener: F) -> ListenerId
    where
        F: Fn(&ManagerEvent) + Send + Sync + 'static,
    {
        self.state.events.once(kind, listener)
    }

    /// Remove a listener registered with [`on`](Self::on) or [`once`](Self::once)
    pub fn off(&self, id: ListenerId) -> bool {
        self.state.events.off(id)
    }

    pub fn listener_count(&self, kind: ManagerEventKind) -> usize {
        self.state.events.listener_count(kind)
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.state.status.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.status.is_connected()
    }

    #[inline]
    pub fn is_connecting(&self) -> bool {
        self.state.status.is_connecting()
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.state.status.is_disconnected()
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn label(&self) -> &str {
        &self.state.label
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn transport_config(&self) -> &TransportConfig {
        &self.transport_config
    }

    #[cfg(test)]
    pub(crate) fn set_status(&self, status: Status) -> bool {
        self.state.set_status(status)
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        for id in self.transport_listeners.drain(..) {
            self.transport.events().off(id);
        }
    }
}

/// Wire transport lifecycle events to status transitions
fn attach_transport_listeners(state: &Arc<ManagerState>, transport: &dyn Transport) -> Vec<ListenerId> {
    let events = transport.events();
    let mut ids = Vec::with_capacity(8);

    for kind in [TransportEventKind::Connect, TransportEventKind::Reconnect] {
        let state = Arc::clone(state);
        ids.push(events.on(kind, move |_| {
            info!(manager = %state.label, event = %kind, "Socket is connected");
            state.set_status(Status::Connected);
        }));
    }

    {
        let state = Arc::clone(state);
        ids.push(events.on(TransportEventKind::Reconnecting, move |event| {
            info!(manager = %state.label, ?event, "Socket is reconnecting");
            state.set_status(Status::Connecting);
        }));
    }

    for kind in [
        TransportEventKind::ReconnectError,
        TransportEventKind::ReconnectFailed,
        TransportEventKind::Disconnect,
    ] {
        let state = Arc::clone(state);
        ids.push(events.on(kind, move |event| {
            info!(manager = %state.label, ?event, "Socket is disconnected");
            state.set_status(Status::Disconnected);
        }));
    }

    // Reported, but never a status transition
    for kind in [TransportEventKind::Error, TransportEventKind::ConnectError] {
        let state = Arc::clone(state);
        ids.push(events.on(kind, move |event| {
            if let TransportEvent::Error(reason) | TransportEvent::ConnectError(reason) = event {
                error!(manager = %state.label, event = %kind, reason = %reason, "Socket error");
            }
        }));
    }

    ids
}

/// Time left for the current attempt under `policy`
fn remaining(policy: TimeoutPolicy, timeout: Duration, started: Instant) -> Duration {
    match policy {
        TimeoutPolicy::Deadline => timeout.saturating_sub(started.elapsed()),
        TimeoutPolicy::PerAttempt => timeout,
    }
}

/// Single-resolution barrier: the first call settles it, later calls are ignored
fn barrier() -> (impl Fn() + Send + Sync + 'static, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    let settle = move || {
        if let Some(tx) = tx.lock().take() {
            let _ = tx.send(());
        }
    };
    (settle, rx)
}
