use std::fmt;

use uuid::Uuid;

/// Key of one registration on an [`EventSource`](crate::EventSource).
///
/// Several waits may listen to the same event name at once; `off` uses this
/// key to remove exactly the registration a settled wait owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        ListenerId::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = ListenerId::new();
        let b = ListenerId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }
}
