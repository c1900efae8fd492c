use std::{borrow::Cow, fmt, panic::Location, time::Duration};

use super::CheckedOccurrence;

/// A wait that reached its time limit without a match.
///
/// The `Display` output is the main debugging aid for a failing test: the
/// spec as pretty JSON, the time limit, every examined occurrence in
/// arrival order with the path and reason of its first mismatch, and the
/// line that created the wait.
///
/// ```text
/// no matching `messageCreate` event within 500ms for {
///   "content": "pong"
/// }
///
/// checked 2 occurrence(s):
///   #1 .content different: actual: "ping", expected: "pong" in {"content":"ping"}
///   #2 .content different: actual: "pang", expected: "pong" in {"content":"pang"}
///
/// wait created at tests/bot.rs:42:10
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutError {
    event: Cow<'static, str>,
    location: &'static Location<'static>,
    spec: String,
    time_limit: Duration,
    checked: Vec<CheckedOccurrence>,
}

impl TimeoutError {
    pub(crate) fn new(
        event: Cow<'static, str>,
        location: &'static Location<'static>,
        spec: String,
        time_limit: Duration,
        checked: Vec<CheckedOccurrence>,
    ) -> Self {
        Self {
            event,
            location,
            spec,
            time_limit,
            checked,
        }
    }

    /// Returns the event name that was awaited.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Returns the source location of the `wait_for_event` or `next_event`
    /// call that created the wait.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Returns the spec serialized as pretty JSON.
    pub fn spec_json(&self) -> &str {
        &self.spec
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Every occurrence examined before the deadline, in arrival order.
    pub fn checked(&self) -> &[CheckedOccurrence] {
        &self.checked
    }
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no matching `{}` event within {:?} for {}",
            self.event, self.time_limit, self.spec
        )?;
        if self.checked.is_empty() {
            write!(f, "\n\nno occurrences checked")?;
        } else {
            write!(f, "\n\nchecked {} occurrence(s):", self.checked.len())?;
            for (n, occurrence) in self.checked.iter().enumerate() {
                write!(f, "\n  #{} {occurrence}", n + 1)?;
            }
        }
        write!(f, "\n\nwait created at {}", self.location)
    }
}

impl std::error::Error for TimeoutError {}
