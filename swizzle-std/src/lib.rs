//! # swizzle-std
//!
//! The Swizzle toolkit operations over the `swizzle-core` object model.
//!
//! This crate provides:
//! - **Member discovery**: [`Catalog`]
//! - **Dispatch registration**: [`Registrar`]
//! - **Implementation swapping**: [`Swapper`]
//! - **Late-bound invocation**: [`Invoker`], [`CallRequest`]
//! - **Interception hooks**: [`hooks::trace_calls`]
//!
//! The registrar and the swapper are the only components that mutate a
//! dispatch table; the invoker reads whatever they left there when it
//! resolves a call.
//!
//! [`Catalog`]: catalog::Catalog
//! [`Registrar`]: registrar::Registrar
//! [`Swapper`]: swapper::Swapper
//! [`Invoker`]: invoker::Invoker
//! [`CallRequest`]: invoker::CallRequest

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use swizzle_core;

// Modules
pub mod catalog;
pub mod hooks;
pub mod invoker;
pub mod registrar;
pub mod swapper;
pub mod testing;
