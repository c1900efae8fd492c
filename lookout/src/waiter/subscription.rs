use std::{
    borrow::Cow,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{EventSource, Handler, ListenerId};

/// One listener registration owned by a single wait.
///
/// `cancel` removes the listener at most once. Dropping the subscription
/// cancels it, so a wait abandoned before settling leaves nothing behind.
pub(crate) struct Subscription<S: EventSource> {
    source: Arc<S>,
    event: Cow<'static, str>,
    id: ListenerId,
    active: AtomicBool,
}

impl<S: EventSource> Subscription<S> {
    pub(crate) fn new(source: Arc<S>, event: Cow<'static, str>) -> Arc<Self> {
        Arc::new(Self {
            source,
            event,
            id: ListenerId::new(),
            active: AtomicBool::new(false),
        })
    }

    /// Register `handler` on the source.
    pub(crate) fn activate(&self, handler: Handler) {
        self.active.store(true, Ordering::Release);
        self.source.on(&self.event, self.id, handler);
        tracing::debug!(event = %self.event, listener = %self.id, "listener registered");
    }

    /// Remove the listener. Returns false if it was already removed.
    pub(crate) fn cancel(&self) -> bool {
        if !self.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        let removed = self.source.off(&self.event, self.id);
        tracing::debug!(event = %self.event, listener = %self.id, removed, "listener removed");
        true
    }

    #[inline]
    pub(crate) fn id(&self) -> ListenerId {
        self.id
    }

    #[inline]
    pub(crate) fn event(&self) -> &Cow<'static, str> {
        &self.event
    }
}

impl<S: EventSource> Drop for Subscription<S> {
    fn drop(&mut self) {
        if self.cancel() {
            tracing::debug!(event = %self.event, listener = %self.id, "pending wait dropped");
        }
    }
}
