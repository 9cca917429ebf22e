//! Service key types for the dependency injection container.

use crate::descriptors::{Injectable, ServiceDescriptor};

/// Identifier accepted wherever a service is named.
///
/// A service can be referenced either by its plain string key or by a
/// [`ServiceDescriptor`] carrying that key. Both forms canonicalize to the
/// same string through [`key_name`], which is what the container uses as
/// its map key.
///
/// # Examples
///
/// ```rust
/// use depgraph_di::{InjectKey, ServiceDescriptor, key_name};
///
/// let by_name: InjectKey = "Database".into();
/// let descriptor = ServiceDescriptor::new("Database", Vec::<InjectKey>::new());
/// let by_descriptor: InjectKey = descriptor.into();
///
/// assert_eq!(key_name(&by_name), "Database");
/// assert_eq!(key_name(&by_descriptor), "Database");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InjectKey {
    /// Plain string key
    Name(String),
    /// Descriptor token; its `key` field is the identity
    Descriptor(ServiceDescriptor),
}

impl InjectKey {
    /// Canonical string key.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            InjectKey::Name(name) => name,
            InjectKey::Descriptor(descriptor) => &descriptor.key,
        }
    }

    /// Key for a type implementing [`Injectable`].
    ///
    /// Only the type's `KEY` is captured. Its dependency list is read when the
    /// type itself is registered, which keeps mutually referencing types from
    /// recursing while their keys are built.
    pub fn of<T: Injectable>() -> Self {
        InjectKey::Name(T::KEY.to_string())
    }

    /// Returns the descriptor if this key was given as one.
    pub fn descriptor(&self) -> Option<&ServiceDescriptor> {
        match self {
            InjectKey::Name(_) => None,
            InjectKey::Descriptor(descriptor) => Some(descriptor),
        }
    }
}

/// Empty dependency list for registrations that need nothing injected.
pub const NO_DEPS: [&str; 0] = [];

/// Canonicalizes a key-or-descriptor into the string used as map key.
#[inline(always)]
pub fn key_name(key: &InjectKey) -> &str {
    key.name()
}

impl std::fmt::Display for InjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for InjectKey {
    fn from(name: &str) -> Self {
        InjectKey::Name(name.to_string())
    }
}

impl From<String> for InjectKey {
    fn from(name: String) -> Self {
        InjectKey::Name(name)
    }
}

impl From<&String> for InjectKey {
    fn from(name: &String) -> Self {
        InjectKey::Name(name.clone())
    }
}

impl From<ServiceDescriptor> for InjectKey {
    fn from(descriptor: ServiceDescriptor) -> Self {
        InjectKey::Descriptor(descriptor)
    }
}

impl From<&ServiceDescriptor> for InjectKey {
    fn from(descriptor: &ServiceDescriptor) -> Self {
        InjectKey::Descriptor(descriptor.clone())
    }
}

impl From<&InjectKey> for InjectKey {
    fn from(key: &InjectKey) -> Self {
        key.clone()
    }
}

/// Canonicalizes a list of keys or descriptors, preserving order.
pub(crate) fn key_names<I, K>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = K>,
    K: Into<InjectKey>,
{
    keys.into_iter()
        .map(|key| key.into().name().to_string())
        .collect()
}
