//! Listener registry keyed by event kind
//!
//! Both transports and the connection manager publish their events through
//! an [`EventEmitter`]. Listeners for one kind run synchronously, in
//! registration order, on the thread that emits.
//!
//! The registry lock is never held while a listener runs: listeners are
//! snapshotted first, so a listener may register or remove listeners (or
//! emit further events) without deadlocking.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An event that can be published through an [`EventEmitter`]
pub trait Event: Send + Sync + 'static {
    /// Key used to group listeners (the "event name")
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Callback invoked for each matching event
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned on registration, used to remove a listener
///
/// Ids are unique across every emitter in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Entry<E> {
    id: ListenerId,
    once: bool,
    listener: Listener<E>,
}

/// Ordered, synchronous listener registry
pub struct EventEmitter<E: Event> {
    listeners: Mutex<HashMap<E::Kind, Vec<Entry<E>>>>,
}

impl<E: Event> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Register a listener for every event of `kind`
    pub fn on<F>(&self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(kind, Arc::new(listener), false)
    }

    /// Register a listener for the next event of `kind` only
    ///
    /// The listener is removed before it runs, so it fires at most once
    /// even when two threads emit concurrently.
    pub fn once<F>(&self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(kind, Arc::new(listener), true)
    }

    fn register(&self, kind: E::Kind, listener: Listener<E>, once: bool) -> ListenerId {
        let id = ListenerId::next();
        self.listeners
            .lock()
            .entry(kind)
            .or_default()
            .push(Entry { id, once, listener });
        id
    }

    /// Remove a listener. Returns `false` if it was already gone
    /// (removed earlier, or a `once` listener that already fired).
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let mut removed = false;

        listeners.retain(|_, entries| {
            if !removed {
                if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
                    entries.remove(pos);
                    removed = true;
                }
            }
            !entries.is_empty()
        });

        removed
    }

    /// Invoke every listener registered for the event's kind
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<Listener<E>> = {
            let mut listeners = self.listeners.lock();
            let Some(entries) = listeners.get_mut(&event.kind()) else {
                return 0;
            };

            let snapshot = entries
                .iter()
                .map(|entry| Arc::clone(&entry.listener))
                .collect();
            entries.retain(|entry| !entry.once);
            if entries.is_empty() {
                listeners.remove(&event.kind());
            }
            snapshot
        };

        for listener in &snapshot {
            listener(event);
        }

        snapshot.len()
    }

    /// Number of listeners currently registered for `kind`
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Ping,
        Pong,
    }

    #[derive(Debug)]
    struct Probe(Kind, u32);

    impl Event for Probe {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            self.0
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Listener<Probe>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        let make = move |name: &'static str| -> Listener<Probe> {
            let log = Arc::clone(&log_clone);
            Arc::new(move |event: &Probe| log.lock().push(format!("{}:{}", name, event.1)))
        };
        (log, make)
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let emitter: EventEmitter<Probe> = EventEmitter::new();
        let (log, make) = recorder();

        for name in ["first", "second", "third"] {
            let listener = make(name);
            emitter.on(Kind::Ping, move |e| listener(e));
        }

        assert_eq!(emitter.emit(&Probe(Kind::Ping, 1)), 3);
        assert_eq!(*log.lock(), vec!["first:1", "second:1", "third:1"]);
    }

    #[test]
    fn test_emit_only_reaches_matching_kind() {
        let emitter: EventEmitter<Probe> = EventEmitter::new();
        let (log, make) = recorder();
        let listener = make("pong");
        emitter.on(Kind::Pong, move |e| listener(e));

        assert_eq!(emitter.emit(&Probe(Kind::Ping, 1)), 0);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let emitter: EventEmitter<Probe> = EventEmitter::new();
        let (log, make) = recorder();
        let listener = make("once");
        let id = emitter.once(Kind::Ping, move |e| listener(e));

        emitter.emit(&Probe(Kind::Ping, 1));
        emitter.emit(&Probe(Kind::Ping, 2));

        assert_eq!(*log.lock(), vec!["once:1"]);
        assert_eq!(emitter.listener_count(Kind::Ping), 0);
        assert!(!emitter.off(id));
    }

    #[test]
    fn test_off_is_deterministic() {
        let emitter: EventEmitter<Probe> = EventEmitter::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        let id_a = emitter.on(Kind::Ping, move |e| a(e));
        emitter.on(Kind::Ping, move |e| b(e));

        assert!(emitter.off(id_a));
        assert!(!emitter.off(id_a));
        emitter.emit(&Probe(Kind::Ping, 7));

        assert_eq!(*log.lock(), vec!["b:7"]);
        assert_eq!(emitter.listener_count(Kind::Ping), 1);
    }

    #[test]
    fn test_listener_may_register_during_emit() {
        let emitter = Arc::new(EventEmitter::<Probe>::new());
        let (log, make) = recorder();

        let inner = Arc::clone(&emitter);
        let late = make("late");
        emitter.once(Kind::Ping, move |_| {
            let late = Arc::clone(&late);
            inner.on(Kind::Ping, move |e| late(e));
        });

        // The listener added mid-emit is not part of the current snapshot
        assert_eq!(emitter.emit(&Probe(Kind::Ping, 1)), 1);
        assert!(log.lock().is_empty());

        emitter.emit(&Probe(Kind::Ping, 2));
        assert_eq!(*log.lock(), vec!["late:2"]);
    }

    #[test]
    fn test_clear_removes_everything() {
        let emitter: EventEmitter<Probe> = EventEmitter::new();
        emitter.on(Kind::Ping, |_| {});
        emitter.on(Kind::Pong, |_| {});
        emitter.clear();

        assert_eq!(emitter.listener_count(Kind::Ping), 0);
        assert_eq!(emitter.listener_count(Kind::Pong), 0);
    }
}
