use std::fmt;

use crate::{Value, matcher::Mismatch};

/// An occurrence that was examined by a wait and did not match.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedOccurrence {
    candidate: Option<Value>,
    mismatch: Mismatch,
}

impl CheckedOccurrence {
    pub(crate) fn new(candidate: Option<Value>, mismatch: Mismatch) -> Self {
        Self {
            candidate,
            mismatch,
        }
    }

    /// The projected value, `None` if the projection produced nothing.
    pub fn candidate(&self) -> Option<&Value> {
        self.candidate.as_ref()
    }

    /// Where and why the candidate diverged from the spec.
    pub fn mismatch(&self) -> &Mismatch {
        &self.mismatch
    }
}

impl fmt::Display for CheckedOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.candidate {
            Some(candidate) => write!(f, "{} in {candidate}", self.mismatch),
            None => write!(f, "{} in <absent>", self.mismatch),
        }
    }
}
