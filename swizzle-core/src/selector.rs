//! Selectors, scopes and dispatch-table keys.
//!
//! A selector names a callable member independently of whichever
//! [`Implementation`](crate::Implementation) currently backs it. Together with
//! a [`Scope`] it forms the [`MethodKey`] under which a class stores that
//! implementation.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// The name of a callable member.
///
/// Cloning is O(1); the name is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(Arc<str>);

impl Selector {
    /// Create a selector from a name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The selector name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the selector can identify a method at all.
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&Selector> for Selector {
    fn from(selector: &Selector) -> Self {
        selector.clone()
    }
}

impl Borrow<str> for Selector {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a callable member is sent to instances or to the class itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Invoked on an instance of the class.
    Instance,
    /// Invoked on the class itself.
    Type,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Instance => f.write_str("instance"),
            Scope::Type => f.write_str("class"),
        }
    }
}

/// Key of a dispatch-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    /// Scope of the entry.
    pub scope: Scope,
    /// Selector of the entry.
    pub selector: Selector,
}

impl MethodKey {
    /// Create a key.
    pub fn new(scope: Scope, selector: impl Into<Selector>) -> Self {
        Self {
            scope,
            selector: selector.into(),
        }
    }

    /// Instance-scope key.
    pub fn instance(selector: impl Into<Selector>) -> Self {
        Self::new(Scope::Instance, selector)
    }

    /// Type-scope key.
    pub fn class(selector: impl Into<Selector>) -> Self {
        Self::new(Scope::Type, selector)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.scope, self.selector)
    }
}
