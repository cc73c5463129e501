//! Call tracing by interception.
//!
//! [`trace_calls`] packages the usual swizzle pattern: a wrapper is registered
//! under a second selector, the two selectors are swapped, and the wrapper
//! forwards each call to its own selector, which now runs the original
//! implementation.
//!
//! The forward selector is resolved on the class the wrapper was installed
//! on, not on the receiver's class. A subclass that traces the same selector
//! materializes the ancestor's wrapper under its own `traced:` entry, so a
//! receiver-relative lookup would find that wrapper again.

use crate::invoker::Invoker;
use crate::registrar::Registrar;
use crate::swapper::Swapper;
use swizzle_core::{
    BoxError, CallFrame, Class, Implementation, InvokeError, LookupError, Method, MethodKey, Scope,
    Selector, SwizzleError, Value, WeakClass,
};

/// Prefix of the selector the original implementation is moved to.
pub const TRACED_PREFIX: &str = "traced:";

/// A method body that logs each call and forwards it.
pub struct CallTracer {
    class: WeakClass,
    name: String,
    forward: MethodKey,
    returns: bool,
    invoker: Invoker,
}

impl CallTracer {
    /// A tracer installed on `class` that forwards to `forward` in `scope`.
    pub fn new(class: &Class, forward: Selector, scope: Scope, returns: bool) -> Self {
        Self {
            class: class.downgrade(),
            name: class.name().to_string(),
            forward: MethodKey::new(scope, forward),
            returns,
            invoker: Invoker::new(),
        }
    }

    fn forward_target(&self) -> Result<Implementation, InvokeError> {
        let not_found = || InvokeError::SelectorNotFound {
            class: self.name.clone(),
            selector: self.forward.selector.to_string(),
            scope: self.forward.scope,
        };
        let class = self.class.upgrade().ok_or_else(not_found)?;
        class
            .lookup(&self.forward)
            .map(|(_, implementation)| implementation)
            .ok_or_else(not_found)
    }
}

impl Method for CallTracer {
    fn call(&self, frame: &CallFrame) -> Result<Value, BoxError> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            class = %self.name,
            selector = %frame.selector(),
            args = ?frame.args(),
            "call"
        );

        let original = self.forward_target()?;
        let result = self.invoker.invoke_implementation(
            frame.receiver().clone(),
            self.forward.selector.clone(),
            &original,
            frame.args().to_vec(),
            self.returns,
        )?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            class = %self.name,
            selector = %frame.selector(),
            result = ?result,
            "return"
        );
        Ok(result.unwrap_or_default())
    }
}

/// Log every call `class` receives for `selector` in `scope`.
///
/// Returns the selector the original implementation now lives under.
/// Installing twice on the same class fails with a registration conflict.
pub fn trace_calls(
    class: &Class,
    selector: impl Into<Selector>,
    scope: Scope,
) -> Result<Selector, SwizzleError> {
    let key = MethodKey::new(scope, selector);
    let Some((_, original)) = class.lookup(&key) else {
        return Err(LookupError::MethodNotFound {
            class: class.name().to_string(),
            selector: key.selector.to_string(),
            scope,
        }
        .into());
    };

    let traced = Selector::from(format!("{TRACED_PREFIX}{}", key.selector));
    let signature = original.signature().clone();
    let returns = !signature.is_void();
    let wrapper = Implementation::from_method(
        signature,
        CallTracer::new(class, traced.clone(), scope, returns),
    );

    let traced_key = MethodKey::new(scope, traced.clone());
    Registrar::new().try_add_method(class, traced_key.clone(), wrapper)?;
    Swapper::new().exchange(class, &key, class, &traced_key)?;
    Ok(traced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingMethod;
    use swizzle_core::{ClassBuilder, RegistrationError, Signature, ValueKind};

    #[test]
    fn test_traced_call_reaches_original() {
        let recorder = RecordingMethod::new(Value::I64(7));
        let class = ClassBuilder::new("Calc")
            .instance_method(
                "add:",
                recorder.implementation(Signature::new([ValueKind::I64], Some(ValueKind::I64))),
            )
            .build();

        let traced = trace_calls(&class, "add:", Scope::Instance).unwrap();
        assert_eq!(traced.as_str(), "traced:add:");

        let object = class.instantiate();
        let result = Invoker::new()
            .invoke_on_instance(&object, "add:", &[Value::I64(3)], true)
            .unwrap();
        assert_eq!(result, Some(Value::I64(7)));
        assert_eq!(recorder.calls(), [vec![Value::I64(3)]]);
    }

    #[test]
    fn test_void_method_traced() {
        let recorder = RecordingMethod::new(Value::Nil);
        let class = ClassBuilder::new("Logger")
            .class_method("flush", recorder.implementation(Signature::void([])))
            .build();

        trace_calls(&class, "flush", Scope::Type).unwrap();
        Invoker::new().invoke_on_type(&class, "flush", &[], false).unwrap();
        assert_eq!(recorder.call_count(), 1);
    }

    #[test]
    fn test_double_install_conflicts() {
        let class = ClassBuilder::new("Calc")
            .instance_method(
                "reset",
                RecordingMethod::new(Value::Nil).implementation(Signature::void([])),
            )
            .build();

        trace_calls(&class, "reset", Scope::Instance).unwrap();
        let err = trace_calls(&class, "reset", Scope::Instance).unwrap_err();
        assert!(matches!(
            err,
            SwizzleError::Registration(RegistrationError::Conflict { .. })
        ));
    }

    #[test]
    fn test_subclass_traced_after_base_calls_original_once() {
        let recorder = RecordingMethod::new(Value::from("base"));
        let base = ClassBuilder::new("Base")
            .instance_method(
                "describe",
                recorder.implementation(Signature::new([], Some(ValueKind::Str))),
            )
            .build();
        let derived = ClassBuilder::new("Derived").superclass(&base).build();

        trace_calls(&base, "describe", Scope::Instance).unwrap();
        trace_calls(&derived, "describe", Scope::Instance).unwrap();

        let result = Invoker::new()
            .invoke_on_instance(&derived.instantiate(), "describe", &[], true)
            .unwrap();
        assert_eq!(result, Some(Value::from("base")));
        assert_eq!(recorder.call_count(), 1);
    }

    #[test]
    fn test_forward_fails_once_class_is_dropped() {
        let class = ClassBuilder::new("Gone")
            .instance_method(
                "ping",
                RecordingMethod::new(Value::Nil).implementation(Signature::void([])),
            )
            .build();
        let tracer = CallTracer::new(&class, Selector::from("ping"), Scope::Instance, false);
        let frame = CallFrame::new(
            swizzle_core::Receiver::Type(ClassBuilder::new("Caller").build()),
            Selector::from("ping"),
            Vec::new(),
        );
        assert!(tracer.call(&frame).is_ok());

        drop(class);
        assert!(tracer.call(&frame).is_err());
    }

    #[test]
    fn test_missing_selector() {
        let class = ClassBuilder::new("Empty").build();
        let err = trace_calls(&class, "nothing", Scope::Instance).unwrap_err();
        assert!(matches!(
            err,
            SwizzleError::Lookup(LookupError::MethodNotFound { .. })
        ));
    }
}
