//! # swizzle-core
//!
//! The host object model for the Swizzle runtime patching toolkit.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! code that defines classes and implementations but does not need the
//! toolkit operations in `swizzle-std`.
//!
//! # Object Model
//!
//! ## Classes ([`Class`])
//!
//! A class owns its declared data members and a [`DispatchTable`]. The
//! declarations are fixed at [`ClassBuilder::build`]; the dispatch table
//! remains mutable and is shared by all instances.
//!
//! - **Identity**: handles compare by identity, never by name
//! - **Ancestry**: lookups walk [`Class::ancestors`], nearest first
//!
//! ## Dispatch Entries ([`MethodKey`] → [`Implementation`])
//!
//! A table maps `(scope, selector)` to an implementation. Within one class
//! and scope a selector names at most one implementation. The implementation
//! is a relocatable value: the same one may back several selectors, and the
//! one backing a selector may be exchanged without touching the selector.
//!
//! ## Boxed Values ([`Value`])
//!
//! Arguments and results cross a late-bound call as [`Value`]s and are
//! marshaled against the implementation's [`Signature`].
//!
//! # Error Types
//!
//! - [`SwizzleError`] - Top-level error type
//! - [`LookupError`] - Catalog misses
//! - [`RegistrationError`] - Rejected registrations
//! - [`SwapError`] - Unresolvable swaps
//! - [`InvokeError`] - Invocation contract violations

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod class;
mod error;
mod method;
mod object;
mod registry;
mod selector;
mod value;

// Re-exports
pub use class::{
    Ancestors, Class, ClassBuilder, DispatchTable, Ivar, Property, PropertyAttributes, WeakClass,
};
pub use error::{
    BoxError, InvokeError, LookupError, MarshalError, RegistrationError, SwapError, SwizzleError,
};
pub use method::{CallFrame, Implementation, Method, Receiver, Signature};
pub use object::Object;
#[cfg(feature = "inventory")]
pub use registry::ClassDeclaration;
pub use registry::ClassRegistry;
pub use selector::{MethodKey, Scope, Selector};
pub use value::{FromValue, Marshaling, Value, ValueKind};
