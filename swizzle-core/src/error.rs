//! Error types for Swizzle.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`SwizzleError`] - Top-level error type
//! - [`LookupError`] - Catalog misses (recoverable)
//! - [`RegistrationError`] - Rejected dispatch-table insertions
//! - [`SwapError`] - Swaps whose selectors cannot be resolved
//! - [`InvokeError`] - Contract violations detected by the dynamic invoker
//! - [`MarshalError`] - A boxed value does not fit the expected kind

use crate::selector::Scope;
use crate::value::ValueKind;
use thiserror::Error;

/// A boxed error type for implementation-side failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Swizzle operations.
#[derive(Error, Debug)]
pub enum SwizzleError {
    /// A catalog query missed.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// A dispatch entry could not be registered.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Two implementations could not be exchanged.
    #[error("swap error: {0}")]
    Swap(#[from] SwapError),

    /// A dynamic invocation violated its contract.
    #[error("invoke error: {0}")]
    Invoke(#[from] InvokeError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors returned by member discovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No data member with this name exists on the class or its ancestors.
    #[error("no data member `{name}` on class `{class}`")]
    DataMemberNotFound {
        /// Class the lookup started from.
        class: String,
        /// Requested member name.
        name: String,
    },

    /// No callable member with this selector exists in the given scope.
    #[error("no {scope} method `{selector}` on class `{class}`")]
    MethodNotFound {
        /// Class the lookup started from.
        class: String,
        /// Requested selector.
        selector: String,
        /// Requested scope.
        scope: Scope,
    },

    /// No class is registered under this name.
    #[error("no class named `{0}`")]
    ClassNotFound(String),
}

/// Errors that reject a dispatch-table insertion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The class already has a direct entry for this selector and scope.
    #[error("class `{class}` already has a {scope} method `{selector}`")]
    Conflict {
        /// Target class.
        class: String,
        /// Selector that is already bound.
        selector: String,
        /// Scope of the existing entry.
        scope: Scope,
    },

    /// The selector name cannot identify a method.
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    /// The implementation to borrow could not be resolved on the source class.
    #[error("class `{class}` has no {scope} method `{selector}` to borrow")]
    SourceNotFound {
        /// Class the implementation was borrowed from.
        class: String,
        /// Selector that failed to resolve.
        selector: String,
        /// Requested scope.
        scope: Scope,
    },
}

/// Errors raised while exchanging two implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// One side of the swap does not resolve to any implementation.
    #[error("cannot swap: no {scope} method `{selector}` on class `{class}`")]
    SelectorNotFound {
        /// Class the selector was resolved against.
        class: String,
        /// Unresolved selector.
        selector: String,
        /// Scope of the unresolved selector.
        scope: Scope,
    },
}

/// A boxed value could not be converted to the kind a call frame expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct MarshalError {
    /// Kind required by the signature or the caller.
    pub expected: ValueKind,
    /// Description of the value that was supplied.
    pub found: String,
}

/// Contract violations detected by the dynamic invoker.
///
/// Every variant except [`InvokeError::Implementation`] is a programmer error
/// on the caller's side. The invoker aborts the call at the point of detection
/// and never retries or substitutes a default.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The receiver is nil or not of the required shape.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The selector does not resolve on the receiver's class or its ancestors.
    #[error("`{class}` does not respond to {scope} selector `{selector}`")]
    SelectorNotFound {
        /// Receiver class.
        class: String,
        /// Unresolved selector.
        selector: String,
        /// Scope that was searched.
        scope: Scope,
    },

    /// Wrong number of arguments for the resolved signature.
    #[error("`{selector}` expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        /// Invoked selector.
        selector: String,
        /// Arity of the resolved implementation.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
    },

    /// An argument does not fit the parameter kind.
    #[error("`{selector}` argument {index}: {source}")]
    ArgumentTypeMismatch {
        /// Invoked selector.
        selector: String,
        /// Zero-based argument position.
        index: usize,
        /// The marshaling failure.
        #[source]
        source: MarshalError,
    },

    /// A result was requested from a void implementation, or the returned
    /// value does not fit the declared return kind.
    #[error("`{selector}` return value: {reason}")]
    ReturnTypeMismatch {
        /// Invoked selector.
        selector: String,
        /// What went wrong.
        reason: String,
    },

    /// The implementation itself reported a failure.
    #[error("`{selector}` failed")]
    Implementation {
        /// Invoked selector.
        selector: String,
        /// Error returned by the implementation.
        #[source]
        source: BoxError,
    },
}

// Convenience conversions
impl From<BoxError> for SwizzleError {
    fn from(err: BoxError) -> Self {
        SwizzleError::Custom(err)
    }
}
