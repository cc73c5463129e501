//! Interception hooks built on swizzling.

pub mod logging;

pub use logging::{CallTracer, trace_calls};
