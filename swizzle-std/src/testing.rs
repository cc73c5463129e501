//! Testing utilities for Swizzle.
//!
//! This module provides implementations that make dispatch behaviour easy to
//! observe in tests.
//!
//! # Features
//!
//! - [`RecordingMethod`]: Records the arguments of every call it receives
//! - [`identity`]: Returns its single argument
//! - [`constant`]: Always returns the same value

use std::sync::{Arc, Mutex};
use swizzle_core::{BoxError, CallFrame, Implementation, Method, Signature, Value, ValueKind};

// ============================================================================
// Recording Method
// ============================================================================

/// A method body that records the arguments of every call.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingMethod::new(Value::Nil);
/// registrar.add_instance_method(&class, "ping", recorder.implementation(Signature::void([])));
///
/// invoker.invoke_on_instance(&object, "ping", &[], false)?;
/// assert_eq!(recorder.call_count(), 1);
/// ```
pub struct RecordingMethod {
    calls: Arc<Mutex<Vec<Vec<Value>>>>,
    result: Value,
}

impl RecordingMethod {
    /// Create a recorder that returns `result` from every call.
    pub fn new(result: Value) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    /// Wrap a clone of this recorder as an implementation. Calls through the
    /// implementation are visible on `self`.
    pub fn implementation(&self, signature: Signature) -> Implementation {
        Implementation::from_method(signature, self.clone())
    }

    /// Arguments of every recorded call, oldest first.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Clone for RecordingMethod {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
            result: self.result.clone(),
        }
    }
}

impl Method for RecordingMethod {
    fn call(&self, frame: &CallFrame) -> Result<Value, BoxError> {
        self.calls.lock().unwrap().push(frame.args().to_vec());
        Ok(self.result.clone())
    }
}

// ============================================================================
// Implementation Factories
// ============================================================================

/// An implementation of `kind -> kind` that returns its argument.
pub fn identity(kind: ValueKind) -> Implementation {
    Implementation::new(Signature::new([kind], Some(kind)), |frame| {
        Ok(frame.args().first().cloned().unwrap_or_default())
    })
}

/// An implementation that ignores its arguments and returns `value`.
pub fn constant(signature: Signature, value: Value) -> Implementation {
    Implementation::new(signature, move |_| Ok(value.clone()))
}
