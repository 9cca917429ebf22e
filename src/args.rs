//! Positional arguments handed to constructors and factories.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::{DiError, DiResult};

/// Type-erased shared service instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Ordered argument list: resolved dependencies followed by call-time extras.
///
/// Containers build `Args` internally when invoking a constructor or factory.
/// Callers build one to pass extra arguments to `resolve_with` /
/// `resolve_async`, usually through the [`args!`](crate::args!) macro.
///
/// # Examples
///
/// ```rust
/// use depgraph_di::{Args, args};
///
/// let extra = args!["World", 7u8];
/// assert_eq!(extra.len(), 2);
/// assert_eq!(*extra.get::<&str>(0).unwrap(), "World");
/// assert_eq!(*extra.get::<u8>(1).unwrap(), 7);
/// assert!(extra.get::<u8>(2).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Args {
    values: Vec<AnyArc>,
    injected: usize,
}

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, builder style.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Appends a value.
    pub fn push<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    /// Appends an already shared value without re-wrapping it.
    pub fn push_arc(&mut self, value: AnyArc) {
        self.values.push(value);
    }

    /// Total number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no arguments are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed access to the argument at `index`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let value = self.get_any(index).ok_or(DiError::ArgumentMissing {
            index,
            len: self.values.len(),
        })?;
        value
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(type_name::<T>()))
    }

    /// Untyped access to the argument at `index`.
    pub fn get_any(&self, index: usize) -> Option<&AnyArc> {
        self.values.get(index)
    }

    /// The resolved dependencies, in declaration order.
    pub fn injected(&self) -> &[AnyArc] {
        &self.values[..self.injected]
    }

    /// The call-time arguments that follow the dependencies.
    pub fn extra(&self) -> &[AnyArc] {
        &self.values[self.injected..]
    }

    /// Iterates all arguments in positional order.
    pub fn iter(&self) -> impl Iterator<Item = &AnyArc> {
        self.values.iter()
    }

    /// Concatenates resolved dependencies with caller-supplied extras.
    pub(crate) fn bind(injected: Vec<AnyArc>, extra: &Args) -> Args {
        let count = injected.len();
        let mut values = injected;
        values.extend(extra.values.iter().cloned());
        Args {
            values,
            injected: count,
        }
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("injected", &self.injected)
            .field("extra", &(self.values.len() - self.injected))
            .finish()
    }
}

/// Builds an [`Args`] list from values.
///
/// ```rust
/// use depgraph_di::args;
///
/// let empty = args![];
/// assert!(empty.is_empty());
///
/// let two = args![1u32, "two".to_string()];
/// assert_eq!(two.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::new()$(.with($value))+
    };
}
