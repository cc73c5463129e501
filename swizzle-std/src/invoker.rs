//! Late-bound invocation.
//!
//! The invoker sends a selector to an instance or class when neither the
//! selector nor its signature is known at compile time:
//!
//! 1. Resolve the selector on the receiver's class, ancestors included.
//! 2. Read the resolved implementation's [`Signature`].
//! 3. Check arity and marshal each [`Value`] argument to its parameter kind.
//! 4. Call the resolved implementation itself. The reference is taken once,
//!    so a swap that lands after resolution does not redirect this call.
//! 5. If a result was requested, marshal the returned value to the declared
//!    return kind.
//!
//! Every failure is a contract violation reported as an [`InvokeError`]; the
//! invoker never retries or substitutes a default.
//!
//! # Example
//!
//! ```rust,ignore
//! let answer = Invoker::new()
//!     .invoke(CallRequest::instance(&calc, "double:").arg(21i64).expecting_result())?;
//! assert_eq!(answer, Some(Value::I64(42)));
//! ```

use swizzle_core::{
    CallFrame, Implementation, InvokeError, Marshaling, MethodKey, Receiver, Scope, Selector,
    Signature, Value,
};

/// One late-bound call: target, selector, arguments, and whether a result
/// is wanted.
#[derive(Debug, Clone)]
pub struct CallRequest {
    target: Value,
    scope: Scope,
    selector: Selector,
    arguments: Vec<Value>,
    expects_result: bool,
}

impl CallRequest {
    /// A call to an instance method of `target`.
    pub fn instance(target: impl Into<Value>, selector: impl Into<Selector>) -> Self {
        Self::new(target, Scope::Instance, selector)
    }

    /// A call to a class method of `target`.
    pub fn class(target: impl Into<Value>, selector: impl Into<Selector>) -> Self {
        Self::new(target, Scope::Type, selector)
    }

    /// A call in an explicit scope.
    pub fn new(target: impl Into<Value>, scope: Scope, selector: impl Into<Selector>) -> Self {
        Self {
            target: target.into(),
            scope,
            selector: selector.into(),
            arguments: Vec::new(),
            expects_result: false,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.arguments.extend(values.into_iter().map(Into::into));
        self
    }

    /// Ask for the returned value.
    pub fn expecting_result(mut self) -> Self {
        self.expects_result = true;
        self
    }

    /// The receiver value.
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// The scope the selector is resolved in.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The selector.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The arguments, in order.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Whether the returned value is wanted.
    pub fn expects_result(&self) -> bool {
        self.expects_result
    }
}

/// Performs late-bound calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invoker {
    marshaling: Marshaling,
}

impl Invoker {
    /// An invoker with [`Marshaling::Lossless`].
    pub const fn new() -> Self {
        Self {
            marshaling: Marshaling::Lossless,
        }
    }

    /// Start configuring an invoker.
    pub fn builder() -> InvokerBuilder {
        InvokerBuilder::default()
    }

    /// The configured marshaling policy.
    pub fn marshaling(&self) -> Marshaling {
        self.marshaling
    }

    /// Call an instance method.
    ///
    /// Returns `Ok(None)` when `expects_result` is false.
    pub fn invoke_on_instance(
        &self,
        target: impl Into<Value>,
        selector: impl Into<Selector>,
        arguments: &[Value],
        expects_result: bool,
    ) -> Result<Option<Value>, InvokeError> {
        let mut request = CallRequest::instance(target, selector).args(arguments.iter().cloned());
        request.expects_result = expects_result;
        self.invoke(request)
    }

    /// Call a class method.
    pub fn invoke_on_type(
        &self,
        target: impl Into<Value>,
        selector: impl Into<Selector>,
        arguments: &[Value],
        expects_result: bool,
    ) -> Result<Option<Value>, InvokeError> {
        let mut request = CallRequest::class(target, selector).args(arguments.iter().cloned());
        request.expects_result = expects_result;
        self.invoke(request)
    }

    /// Perform a call.
    pub fn invoke(&self, request: CallRequest) -> Result<Option<Value>, InvokeError> {
        let result = self.dispatch(request);
        #[cfg(feature = "tracing")]
        {
            if let Err(error) = &result {
                tracing::debug!(%error, "invocation failed");
            }
        }
        result
    }

    fn dispatch(&self, request: CallRequest) -> Result<Option<Value>, InvokeError> {
        let CallRequest {
            target,
            scope,
            selector,
            arguments,
            expects_result,
        } = request;

        let receiver = receiver(target, scope)?;
        let key = MethodKey::new(scope, selector.clone());
        let Some((_, implementation)) = receiver.class().lookup(&key) else {
            return Err(InvokeError::SelectorNotFound {
                class: receiver.class().name().to_string(),
                selector: selector.to_string(),
                scope,
            });
        };

        self.invoke_implementation(receiver, selector, &implementation, arguments, expects_result)
    }

    /// Call an implementation that was resolved elsewhere.
    ///
    /// Arguments and the result go through the same checks as [`invoke`],
    /// but no selector lookup happens: `selector` is only what the
    /// implementation sees in its frame.
    ///
    /// [`invoke`]: Invoker::invoke
    pub fn invoke_implementation(
        &self,
        receiver: Receiver,
        selector: Selector,
        implementation: &Implementation,
        arguments: Vec<Value>,
        expects_result: bool,
    ) -> Result<Option<Value>, InvokeError> {
        let signature = implementation.signature();
        let args = self.marshal_arguments(&selector, signature, arguments)?;
        if expects_result && signature.is_void() {
            return Err(InvokeError::ReturnTypeMismatch {
                selector: selector.to_string(),
                reason: "result requested from a void implementation".to_string(),
            });
        }

        let frame = CallFrame::new(receiver, selector, args);
        let returned = implementation
            .call(&frame)
            .map_err(|source| InvokeError::Implementation {
                selector: frame.selector().to_string(),
                source,
            })?;

        match signature.ret() {
            Some(kind) if expects_result => returned
                .marshal(kind, self.marshaling)
                .map(Some)
                .map_err(|error| InvokeError::ReturnTypeMismatch {
                    selector: frame.selector().to_string(),
                    reason: error.to_string(),
                }),
            _ => Ok(None),
        }
    }

    fn marshal_arguments(
        &self,
        selector: &Selector,
        signature: &Signature,
        arguments: Vec<Value>,
    ) -> Result<Vec<Value>, InvokeError> {
        if arguments.len() != signature.arity() {
            return Err(InvokeError::ArgumentCountMismatch {
                selector: selector.to_string(),
                expected: signature.arity(),
                got: arguments.len(),
            });
        }
        arguments
            .iter()
            .zip(signature.params())
            .enumerate()
            .map(|(index, (value, &kind))| {
                value
                    .marshal(kind, self.marshaling)
                    .map_err(|source| InvokeError::ArgumentTypeMismatch {
                        selector: selector.to_string(),
                        index,
                        source,
                    })
            })
            .collect()
    }
}

fn receiver(target: Value, scope: Scope) -> Result<Receiver, InvokeError> {
    match (scope, target) {
        (Scope::Instance, Value::Object(object)) => Ok(Receiver::Instance(object)),
        (Scope::Type, Value::Class(class)) => Ok(Receiver::Type(class)),
        (_, Value::Nil) => Err(InvokeError::InvalidTarget("nil receiver".to_string())),
        (scope, other) => Err(InvokeError::InvalidTarget(format!(
            "{scope} method sent to {}",
            other.describe()
        ))),
    }
}

/// Builder for [`Invoker`].
#[derive(Debug, Clone, Default)]
pub struct InvokerBuilder {
    marshaling: Marshaling,
}

impl InvokerBuilder {
    /// Set the marshaling policy.
    pub fn marshaling(mut self, marshaling: Marshaling) -> Self {
        self.marshaling = marshaling;
        self
    }

    /// Require exact kinds for arguments and results.
    pub fn strict(self) -> Self {
        self.marshaling(Marshaling::Strict)
    }

    /// Build the invoker.
    pub fn build(self) -> Invoker {
        Invoker {
            marshaling: self.marshaling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swizzle_core::{Class, ClassBuilder, ValueKind};

    fn calc() -> Class {
        ClassBuilder::new("Calc")
            .instance_method(
                "double:",
                Implementation::new(
                    Signature::new([ValueKind::I64], Some(ValueKind::I64)),
                    |frame| Ok(Value::I64(frame.arg::<i64>(0)? * 2)),
                ),
            )
            .instance_method(
                "reset",
                Implementation::new(Signature::void([]), |_| Ok(Value::Nil)),
            )
            .class_method(
                "name",
                Implementation::new(Signature::new([], Some(ValueKind::Str)), |frame| {
                    Ok(Value::from(frame.receiver().class().name()))
                }),
            )
            .build()
    }

    #[test]
    fn test_instance_call_with_result() {
        let calc = calc().instantiate();
        let result = Invoker::new()
            .invoke(CallRequest::instance(&calc, "double:").arg(21i64).expecting_result())
            .unwrap();
        assert_eq!(result, Some(Value::I64(42)));
    }

    #[test]
    fn test_class_call() {
        let class = calc();
        let result = Invoker::new()
            .invoke_on_type(&class, "name", &[], true)
            .unwrap();
        assert_eq!(result, Some(Value::from("Calc")));
    }

    #[test]
    fn test_result_discarded_when_not_expected() {
        let calc = calc().instantiate();
        let result = Invoker::new()
            .invoke_on_instance(&calc, "double:", &[Value::I64(1)], false)
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_lossless_argument_widening() {
        let calc = calc().instantiate();
        let result = Invoker::new()
            .invoke_on_instance(&calc, "double:", &[Value::U8(4)], true)
            .unwrap();
        assert_eq!(result, Some(Value::I64(8)));
    }

    #[test]
    fn test_strict_rejects_other_widths() {
        let calc = calc().instantiate();
        let err = Invoker::builder()
            .strict()
            .build()
            .invoke_on_instance(&calc, "double:", &[Value::I32(4)], true)
            .unwrap_err();
        assert!(matches!(err, InvokeError::ArgumentTypeMismatch { index: 0, .. }));
    }

    #[test]
    fn test_void_with_expected_result_is_rejected_before_call() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let class = ClassBuilder::new("Counter")
            .instance_method(
                "tick",
                Implementation::new(Signature::void([]), move |_| {
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok(Value::Nil)
                }),
            )
            .build();
        let object = class.instantiate();
        let invoker = Invoker::new();

        let err = invoker.invoke_on_instance(&object, "tick", &[], true).unwrap_err();
        assert!(matches!(err, InvokeError::ReturnTypeMismatch { .. }));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        assert_eq!(invoker.invoke_on_instance(&object, "tick", &[], false).unwrap(), None);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_targets() {
        let class = calc();
        let invoker = Invoker::new();

        let nil = invoker.invoke_on_instance(Value::Nil, "reset", &[], false);
        assert!(matches!(nil, Err(InvokeError::InvalidTarget(_))));

        let class_as_instance = invoker.invoke_on_instance(&class, "reset", &[], false);
        assert!(matches!(class_as_instance, Err(InvokeError::InvalidTarget(_))));

        let number = invoker.invoke_on_type(Value::I64(3), "name", &[], true);
        assert!(matches!(number, Err(InvokeError::InvalidTarget(_))));
    }

    #[test]
    fn test_unknown_selector() {
        let calc = calc().instantiate();
        let err = Invoker::new()
            .invoke_on_instance(&calc, "triple:", &[Value::I64(1)], true)
            .unwrap_err();
        assert!(matches!(
            err,
            InvokeError::SelectorNotFound { ref selector, scope: Scope::Instance, .. } if selector == "triple:"
        ));
    }

    #[test]
    fn test_implementation_error_surfaces() {
        let class = ClassBuilder::new("Fails")
            .class_method(
                "boom",
                Implementation::new(Signature::void([]), |_| Err("boom".into())),
            )
            .build();
        let err = Invoker::new().invoke_on_type(&class, "boom", &[], false).unwrap_err();
        assert!(matches!(err, InvokeError::Implementation { .. }));
    }

    #[test]
    fn test_bad_return_value_is_mismatch() {
        let class = ClassBuilder::new("Liar")
            .class_method(
                "count",
                Implementation::new(Signature::new([], Some(ValueKind::U32)), |_| {
                    Ok(Value::from("not a number"))
                }),
            )
            .build();
        let err = Invoker::new().invoke_on_type(&class, "count", &[], true).unwrap_err();
        assert!(matches!(err, InvokeError::ReturnTypeMismatch { .. }));
    }
}
