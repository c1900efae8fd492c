use std::{borrow::Cow, fmt, sync::Arc};

use crate::Value;

type ProjectFn = Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>;

/// Maps the raw arguments of an event occurrence to the value that is matched.
///
/// Events differ in arity, so the caller decides which argument matters:
///
/// | Event shape | Projection |
/// |-------------|------------|
/// | `created(message)` | [`Projection::first`] |
/// | `updated(old, new)` | [`Projection::arg(1)`](Projection::arg) |
/// | `reaction_added(reaction, user)` | [`Projection::args`] |
///
/// Returning `None` means the occurrence has no value to compare; it fails
/// any spec other than [`Spec::Omitted`](crate::Spec::Omitted).
#[derive(Clone)]
pub struct Projection {
    name: Cow<'static, str>,
    project: ProjectFn,
}

impl Projection {
    /// Custom projection.
    ///
    /// ```rust
    /// use lookout::{Projection, Value};
    ///
    /// // the author of the new message in an update pair
    /// let author = Projection::new(|args: &[Value]| args.get(1)?.get("author").cloned());
    /// ```
    pub fn new<F>(project: F) -> Self
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: Cow::Borrowed("custom"),
            project: Arc::new(project),
        }
    }

    /// The argument at `index`.
    pub fn arg(index: usize) -> Self {
        Self {
            name: Cow::Owned(format!("arg({index})")),
            project: Arc::new(move |args: &[Value]| args.get(index).cloned()),
        }
    }

    /// The first argument.
    pub fn first() -> Self {
        Self::arg(0)
    }

    /// The last argument.
    pub fn last() -> Self {
        Self {
            name: Cow::Borrowed("last"),
            project: Arc::new(|args: &[Value]| args.last().cloned()),
        }
    }

    /// All arguments as one [`Value::Sequence`].
    pub fn args() -> Self {
        Self {
            name: Cow::Borrowed("args"),
            project: Arc::new(|args: &[Value]| Some(Value::Sequence(args.to_vec()))),
        }
    }

    pub(crate) fn apply(&self, args: &[Value]) -> Option<Value> {
        (self.project)(args)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Projection").field(&self.name).finish()
    }
}
