//! Waiting for one event occurrence that matches a spec.
//!
//! Each wait registers its own listener, examines every occurrence through a
//! [`Projection`] and the matcher, and settles exactly once: with the first
//! matching value, or with a [`TimeoutError`] listing every occurrence it
//! examined. The listener is removed before the wait settles either way.

mod checked_occurrence;
mod pending_wait;
mod subscription;
mod timeout_error;
mod wait_request;

pub use checked_occurrence::CheckedOccurrence;
pub use pending_wait::PendingWait;
pub use timeout_error::TimeoutError;
pub use wait_request::WaitRequest;

use std::{borrow::Cow, fmt, panic::Location, sync::Arc};

use crate::{Config, EventSource, Projection, Spec};

/// Creates waits against one [`EventSource`].
///
/// Cloning is cheap and clones share the source and configuration. Waits
/// are independent of each other: any number may be pending on the same
/// event, each with its own listener and deadline.
///
/// # Example
///
/// ```rust,no_run
/// use std::{sync::Arc, time::Duration};
/// use lookout::{Emitter, EventWaiter, Projection, Value};
/// use serde_json::json;
///
/// # async fn run() -> lookout::Result {
/// let emitter = Arc::new(Emitter::new());
/// let waiter = EventWaiter::new(emitter.clone());
///
/// let created = waiter
///     .wait_for_event("guildCreate", Projection::first(), json!({"name": "lounge"}))
///     .within(Duration::from_secs(1))
///     .start();
///
/// emitter.emit("guildCreate", &[Value::from(json!({"id": "1", "name": "lounge"}))]);
/// let guild = created.await?;
/// assert_eq!(guild.get("id"), Some(&Value::from("1")));
/// # Ok(())
/// # }
/// ```
pub struct EventWaiter<S: EventSource> {
    source: Arc<S>,
    config: Arc<Config>,
}

impl<S: EventSource> EventWaiter<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_config(source, Config::default())
    }

    pub fn with_config(source: Arc<S>, config: Config) -> Self {
        Self {
            source,
            config: Arc::new(config),
        }
    }

    /// Wait for the first occurrence of `event` whose projected arguments
    /// match `spec`.
    ///
    /// The listener is registered when the returned request is awaited or
    /// [`started`](WaitRequest::start). The caller's source location is kept
    /// for the timeout message.
    #[track_caller]
    pub fn wait_for_event(
        &self,
        event: impl Into<Cow<'static, str>>,
        projection: Projection,
        spec: impl Into<Spec>,
    ) -> WaitRequest<S> {
        WaitRequest::new(
            self.source.clone(),
            &self.config,
            event.into(),
            Location::caller(),
            projection,
            spec.into(),
        )
    }

    /// Wait for the next occurrence of `event`, whatever its arguments.
    ///
    /// Resolves with the projected value, or [`Value::Null`](crate::Value::Null)
    /// if the projection produced nothing.
    #[track_caller]
    pub fn next_event(
        &self,
        event: impl Into<Cow<'static, str>>,
        projection: Projection,
    ) -> WaitRequest<S> {
        self.wait_for_event(event, projection, Spec::any())
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<S: EventSource> Clone for EventWaiter<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: EventSource> fmt::Debug for EventWaiter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventWaiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
