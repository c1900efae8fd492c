use std::{
    borrow::Cow,
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{ListenerId, Result, Value};

type WaitFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// A wait whose listener is registered and whose deadline is running.
///
/// Created by [`WaitRequest::start`](crate::WaitRequest::start). Resolves with
/// the first matching projected value, or fails with
/// [`Error::Timeout`](crate::Error::Timeout). Dropping it before it settles
/// removes the listener.
pub struct PendingWait {
    event: Cow<'static, str>,
    listener: ListenerId,
    inner: WaitFuture,
}

impl PendingWait {
    pub(crate) fn new(event: Cow<'static, str>, listener: ListenerId, inner: WaitFuture) -> Self {
        Self {
            event,
            listener,
            inner,
        }
    }

    /// Returns the awaited event name.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Returns the ID of the registered listener.
    pub fn listener(&self) -> ListenerId {
        self.listener
    }
}

impl Future for PendingWait {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWait")
            .field("event", &self.event)
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}
