use std::{
    borrow::Cow,
    fmt,
    future::IntoFuture,
    panic::Location,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use tokio::{sync::oneshot, time::Instant};

use crate::{
    Config, EventSource, Handler, ListenerId, Projection, Result, Spec, Value,
    matcher::{MatchOutcome, matches},
};

use super::{CheckedOccurrence, PendingWait, TimeoutError, subscription::Subscription};

// Limits beyond this never elapse in a test run; the deadline is clamped so
// that adding it to `Instant::now()` cannot overflow.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A configured wait that has not registered its listener yet.
///
/// Created by [`EventWaiter::wait_for_event`](crate::EventWaiter::wait_for_event).
/// Awaiting it registers the listener and starts the deadline in one step.
/// Call [`start`](Self::start) instead when the listener must be in place
/// before the action that triggers the event.
///
/// # Example
///
/// ```ignore
/// let reply = waiter
///     .wait_for_event("messageCreate", Projection::first(), json!({"content": "pong"}))
///     .within(Duration::from_millis(500))
///     .start();
/// client.send("ping");
/// let message = reply.await?;
/// ```
pub struct WaitRequest<S: EventSource> {
    source: Arc<S>,
    event: Cow<'static, str>,
    location: &'static Location<'static>,
    projection: Projection,
    spec: Spec,
    time_limit: Duration,
    strict_length: bool,
}

impl<S: EventSource> WaitRequest<S> {
    pub(crate) fn new(
        source: Arc<S>,
        config: &Config,
        event: Cow<'static, str>,
        location: &'static Location<'static>,
        projection: Projection,
        spec: Spec,
    ) -> Self {
        Self {
            source,
            event,
            location,
            projection,
            spec,
            time_limit: config.default_time_limit(),
            strict_length: config.strict_length(),
        }
    }

    /// Override the configured time limit.
    ///
    /// `Duration::MAX` waits until a match arrives or the wait is dropped.
    pub fn within(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Require sequences to have exactly the spec's length.
    pub fn strict_length(mut self, strict: bool) -> Self {
        self.strict_length = strict;
        self
    }

    /// Register the listener and start the deadline.
    ///
    /// Occurrences emitted after this call are examined even if the returned
    /// [`PendingWait`] has not been polled yet.
    pub fn start(self) -> PendingWait {
        let WaitRequest {
            source,
            event,
            location,
            projection,
            spec,
            time_limit,
            strict_length,
        } = self;

        let deadline = Instant::now() + time_limit.min(FAR_FUTURE);
        let (resolve, mut settled) = oneshot::channel();
        let state = Arc::new(Mutex::new(WaitState {
            resolve: Some(resolve),
            checked: Vec::new(),
        }));
        let spec = Arc::new(spec);

        let subscription = Subscription::new(source, event.clone());
        let listener = subscription.id();
        subscription.activate(occurrence_handler(
            Arc::downgrade(&subscription),
            listener,
            state.clone(),
            projection,
            spec.clone(),
            strict_length,
        ));

        let wait = async move {
            if let Ok(Ok(value)) = tokio::time::timeout_at(deadline, &mut settled).await {
                return Ok(value);
            }
            expire(&subscription, &state, &mut settled, location, &spec, time_limit)
        };

        PendingWait::new(event, listener, Box::pin(wait))
    }
}

impl<S: EventSource> IntoFuture for WaitRequest<S> {
    type Output = Result<Value>;
    type IntoFuture = PendingWait;

    fn into_future(self) -> Self::IntoFuture {
        self.start()
    }
}

impl<S: EventSource> fmt::Debug for WaitRequest<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitRequest")
            .field("event", &self.event)
            .field("location", &self.location)
            .field("projection", &self.projection)
            .field("spec", &self.spec)
            .field("time_limit", &self.time_limit)
            .field("strict_length", &self.strict_length)
            .finish_non_exhaustive()
    }
}

/// Shared between the listener and the awaiting future.
///
/// `resolve` is taken exactly once, by the first match or by expiry.
struct WaitState {
    resolve: Option<oneshot::Sender<Value>>,
    checked: Vec<CheckedOccurrence>,
}

impl WaitState {
    fn is_pending(&self) -> bool {
        self.resolve.is_some()
    }
}

fn lock(state: &Mutex<WaitState>) -> MutexGuard<'_, WaitState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builds the listener for one wait.
///
/// The state lock is never held while the projection, the spec's predicates
/// or `EventSource::off` run, so any of them may emit the same event again
/// on this thread.
fn occurrence_handler<S: EventSource>(
    subscription: Weak<Subscription<S>>,
    listener: ListenerId,
    state: Arc<Mutex<WaitState>>,
    projection: Projection,
    spec: Arc<Spec>,
    strict_length: bool,
) -> Handler {
    Arc::new(move |args: &[Value]| {
        if !lock(&state).is_pending() {
            return;
        }
        let candidate = projection.apply(args);
        match matches(candidate.as_ref(), &spec, strict_length) {
            MatchOutcome::Pass => {
                // Unregister before settling.
                if let Some(subscription) = subscription.upgrade() {
                    subscription.cancel();
                }
                let mut state = lock(&state);
                // A nested occurrence or the deadline may have settled the wait meanwhile.
                let Some(resolve) = state.resolve.take() else {
                    return;
                };
                let _ = resolve.send(candidate.unwrap_or(Value::Null));
                tracing::debug!(%listener, checked = state.checked.len(), "wait matched");
            }
            MatchOutcome::Fail(mismatch) => {
                let mut state = lock(&state);
                if !state.is_pending() {
                    return;
                }
                tracing::trace!(%listener, %mismatch, "occurrence did not match");
                state.checked.push(CheckedOccurrence::new(candidate, mismatch));
            }
        }
    })
}

fn expire<S: EventSource>(
    subscription: &Subscription<S>,
    state: &Mutex<WaitState>,
    settled: &mut oneshot::Receiver<Value>,
    location: &'static Location<'static>,
    spec: &Spec,
    time_limit: Duration,
) -> Result<Value> {
    let checked = {
        let mut state = lock(state);
        if state.resolve.take().is_none() {
            // A match landed between the deadline and this lock.
            if let Ok(value) = settled.try_recv() {
                return Ok(value);
            }
        }
        std::mem::take(&mut state.checked)
    };
    subscription.cancel();

    tracing::warn!(
        event = %subscription.event(),
        listener = %subscription.id(),
        checked = checked.len(),
        ?time_limit,
        %location,
        "wait timed out"
    );
    Err(TimeoutError::new(
        subscription.event().clone(),
        location,
        spec.to_json_pretty(),
        time_limit,
        checked,
    )
    .into())
}
