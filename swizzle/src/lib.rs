//! # swizzle - Runtime Introspection and Dispatch Patching
//!
//! `swizzle` discovers the members of live classes, adds callable members at
//! runtime, exchanges the implementations behind two selectors, and invokes
//! selectors that are only known at runtime.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use swizzle::prelude::*;
//!
//! let calc = ClassBuilder::new("Calc").build();
//! let double = Implementation::new(
//!     Signature::new([ValueKind::I64], Some(ValueKind::I64)),
//!     |frame| Ok(Value::I64(frame.arg::<i64>(0)? * 2)),
//! );
//! Registrar::new().add_instance_method(&calc, "double:", double);
//!
//! let answer = Invoker::new().invoke(
//!     CallRequest::instance(&calc.instantiate(), "double:").arg(21i64).expecting_result(),
//! )?;
//! assert_eq!(answer, Some(Value::I64(42)));
//! ```

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use swizzle_core::{
    // Object model
    Ancestors,
    // Errors
    BoxError,
    // Methods
    CallFrame,
    Class,
    ClassBuilder,
    ClassRegistry,
    DispatchTable,
    // Values
    FromValue,
    Implementation,
    InvokeError,
    Ivar,
    LookupError,
    MarshalError,
    Marshaling,
    Method,
    // Selectors
    MethodKey,
    Object,
    Property,
    PropertyAttributes,
    Receiver,
    RegistrationError,
    Scope,
    Selector,
    Signature,
    SwapError,
    SwizzleError,
    Value,
    ValueKind,
    WeakClass,
};

#[cfg(feature = "inventory")]
pub use swizzle_core::ClassDeclaration;

// Toolkit
pub use swizzle_std::{
    catalog::{Catalog, DataMember, DataMemberKind, MethodDescriptor},
    invoker::{CallRequest, Invoker, InvokerBuilder},
    registrar::Registrar,
    swapper::{SwapPolicy, Swapper},
};

/// Interception hooks.
pub mod hooks {
    pub use swizzle_std::hooks::{CallTracer, logging::TRACED_PREFIX, trace_calls};
}

/// Testing utilities.
pub mod testing {
    pub use swizzle_std::testing::{RecordingMethod, constant, identity};
}

/// Prelude module - common imports for Swizzle.
///
/// # Usage
///
/// ```rust,ignore
/// use swizzle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Toolkit
        CallFrame,
        CallRequest,
        Catalog,
        // Object model
        Class,
        ClassBuilder,
        Implementation,
        // Errors
        InvokeError,
        Invoker,
        MethodKey,
        Object,
        Registrar,
        Scope,
        Selector,
        Signature,
        Swapper,
        SwizzleError,
        Value,
        ValueKind,
    };
}

#[cfg(feature = "inventory")]
pub use inventory;
