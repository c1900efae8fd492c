use std::{
    collections::HashMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Mutex, PoisonError},
};

use crate::{EventSource, Handler, ListenerId, Value};

/// An in-process [`EventSource`] keyed by event name.
///
/// Handlers run synchronously on the emitting task, in registration order.
/// `emit` snapshots the listener list before calling anything, so handlers
/// may register or remove listeners (including themselves) while running.
/// A handler that panics is removed and the remaining handlers still run.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use lookout::{Emitter, EventSource, ListenerId, Value};
///
/// let emitter = Emitter::new();
/// emitter.on("ping", ListenerId::new(), Arc::new(|args: &[Value]| {
///     println!("ping with {} args", args.len());
/// }));
///
/// assert_eq!(emitter.emit("ping", &[Value::from(1)]), 1);
/// assert_eq!(emitter.emit("pong", &[]), 0);
/// ```
#[derive(Default)]
pub struct Emitter {
    listeners: Mutex<HashMap<String, Vec<(ListenerId, Handler)>>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one occurrence of `event` to every listener.
    ///
    /// Returns the number of listeners the occurrence was delivered to.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        let snapshot: Vec<(ListenerId, Handler)> = self
            .lock()
            .get(event)
            .map(|listeners| listeners.to_vec())
            .unwrap_or_default();

        tracing::trace!(event = %event, listeners = snapshot.len(), "emit");

        for (id, handler) in &snapshot {
            let result = catch_unwind(AssertUnwindSafe(|| handler(args)));
            if result.is_err() {
                tracing::error!(event = %event, listener = %id, "Listener panicked, removing");
                self.off(event, *id);
            }
        }

        snapshot.len()
    }

    /// Returns the number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Returns true if no listener is registered for any event.
    pub fn is_empty(&self) -> bool {
        self.lock().values().all(Vec::is_empty)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<(ListenerId, Handler)>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSource for Emitter {
    fn on(&self, event: &str, id: ListenerId, handler: Handler) {
        self.lock()
            .entry(event.to_owned())
            .or_default()
            .push((id, handler));
    }

    fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(registered) = listeners.get_mut(event) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|(lid, _)| *lid != id);
        let removed = registered.len() != before;
        if registered.is_empty() {
            listeners.remove(event);
        }
        removed
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.lock();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(event, l)| (event.as_str(), l.len()))
            .collect();
        f.debug_struct("Emitter")
            .field("listeners", &counts)
            .finish()
    }
}
