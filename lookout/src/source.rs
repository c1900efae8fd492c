use std::sync::Arc;

use crate::{ListenerId, Value};

/// Callback invoked with the raw arguments of one event occurrence.
///
/// The number of arguments depends on the event: a "message created" event
/// might carry one message while a "message updated" event carries the old
/// and the new message.
pub type Handler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// A client that emits named events.
///
/// This is the seam between `lookout` and the client under test. Implement
/// it on top of whatever listener registry the client already has, or use
/// the bundled [`Emitter`](crate::Emitter).
///
/// # Contract
///
/// - Every handler registered for an event name is called for every
///   occurrence of that event, in registration order.
/// - [`off`](Self::off) must be callable from inside a running handler. Do
///   not hold a lock on the registry while handlers run.
///
/// # Example
///
/// ```rust,ignore
/// impl EventSource for MyClient {
///     fn on(&self, event: &str, id: ListenerId, handler: Handler) {
///         self.listeners.lock().unwrap().push((event.to_owned(), id, handler));
///     }
///
///     fn off(&self, event: &str, id: ListenerId) -> bool {
///         let mut listeners = self.listeners.lock().unwrap();
///         let before = listeners.len();
///         listeners.retain(|(name, lid, _)| !(name == event && *lid == id));
///         listeners.len() != before
///     }
/// }
/// ```
pub trait EventSource: Send + Sync + 'static {
    /// Register `handler` for `event` under `id`.
    fn on(&self, event: &str, id: ListenerId, handler: Handler);

    /// Remove the handler registered for `event` under `id`.
    ///
    /// Returns true if a handler was removed.
    fn off(&self, event: &str, id: ListenerId) -> bool;
}
