//! # Lookout
//!
//! Wait for events from asynchronous clients in tests, and match them
//! against partial structural specs.
//!
//! A test usually cares about a few fields of an event payload, not all of
//! them. Lookout lets you state just those fields as a [`Spec`], register a
//! wait on any [`EventSource`], trigger the action, and await the first
//! occurrence that matches. If none arrives in time, the error lists every
//! occurrence that was examined and where each one diverged.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//! use lookout::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result {
//!     let client = Arc::new(Emitter::new());
//!     let waiter = EventWaiter::new(client.clone());
//!
//!     let reply = waiter
//!         .wait_for_event(
//!             "messageCreate",
//!             Projection::first(),
//!             json!({"content": "pong", "author": {"bot": true}}),
//!         )
//!         .within(Duration::from_millis(500))
//!         .start();
//!
//!     client.emit(
//!         "messageCreate",
//!         &[Value::from(json!({"id": "7", "content": "pong", "author": {"id": "1", "bot": true}}))],
//!     );
//!
//!     let message = reply.await?;
//!     println!("got {message}");
//!     Ok(())
//! }
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Value`] | Dynamic event payload: scalars, sequences, keyed maps and records |
//! | [`Spec`] | Partial description of the expected value, with literals and predicates |
//! | [`matcher::matches`] | Compares a value with a spec and reports the first mismatch |
//! | [`EventSource`] | Anything listeners can be registered on and removed from |
//! | [`Emitter`] | In-process event source for tests and fakes |
//! | [`EventWaiter`] | Creates waits against one source |
//! | [`Projection`] | Picks the value to match out of an occurrence's arguments |
//! | [`TimeoutError`] | Diagnostic listing every occurrence a failed wait examined |
//!
//! ## Matching Rules
//!
//! - Omitted parts of a spec accept anything, including an absent value.
//! - Records and maps may carry fields the spec does not mention.
//! - Sequences may be longer than the spec unless strict length is on.
//! - Literals compare loosely, so `1` matches `"1"` and `true` matches `1`.
//! - A predicate fails only when it explicitly returns `false`.
//!
//! ## Registration
//!
//! Awaiting a [`WaitRequest`] registers its listener on the first poll. When
//! the triggering action runs synchronously before that, call
//! [`WaitRequest::start`] first and await the returned [`PendingWait`].

mod config;
mod emitter;
mod error;
mod listener_id;
pub mod matcher;
mod projection;
mod source;
mod spec;
mod value;
mod waiter;

pub use config::Config;
pub use emitter::Emitter;
pub use error::Error;
pub use listener_id::ListenerId;
pub use matcher::{MatchOutcome, Mismatch, MismatchReason, Path, PathSegment};
pub use projection::Projection;
pub use source::{EventSource, Handler};
pub use spec::{Literal, Predicate, Spec, Verdict};
pub use value::{Value, ValueKind};
pub use waiter::{CheckedOccurrence, EventWaiter, PendingWait, TimeoutError, WaitRequest};

/// Convenience alias for `Result<T, lookout::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
