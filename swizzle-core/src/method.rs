//! Implementations, their signatures, and the call frames they receive.
//!
//! An [`Implementation`] is the relocatable half of a dispatch-table entry:
//! the same implementation can be bound to several selectors at once, and the
//! implementation bound to a selector can be exchanged without touching the
//! selector. Swizzling is built on exactly that aliasing.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `Implementation::new(sig, |frame: &CallFrame| Ok(Value::Nil))`
//! 2. **Struct**: `impl Method for MyMethod` and `Implementation::from_method`

use crate::class::Class;
use crate::error::{BoxError, MarshalError};
use crate::object::Object;
use crate::selector::{Scope, Selector};
use crate::value::{FromValue, Value, ValueKind};
use std::fmt;
use std::sync::Arc;

/// Parameter kinds and return kind of an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    params: Vec<ValueKind>,
    ret: Option<ValueKind>,
}

impl Signature {
    /// A signature with the given parameters and optional return kind.
    pub fn new(params: impl IntoIterator<Item = ValueKind>, ret: Option<ValueKind>) -> Self {
        Self {
            params: params.into_iter().collect(),
            ret,
        }
    }

    /// A void signature with the given parameters.
    pub fn void(params: impl IntoIterator<Item = ValueKind>) -> Self {
        Self::new(params, None)
    }

    /// Replace the return kind.
    pub fn returning(mut self, kind: ValueKind) -> Self {
        self.ret = Some(kind);
        self
    }

    /// Declared parameter kinds, in order.
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Declared return kind; `None` means void.
    pub fn ret(&self) -> Option<ValueKind> {
        self.ret
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the implementation returns nothing.
    pub fn is_void(&self) -> bool {
        self.ret.is_none()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, kind) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        match self.ret {
            Some(kind) => write!(f, ") -> {kind}"),
            None => f.write_str(")"),
        }
    }
}

/// The receiver of a call: an instance or a class.
#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    /// Instance-scope call.
    Instance(Object),
    /// Type-scope call.
    Type(Class),
}

impl Receiver {
    /// The class whose dispatch table serves this receiver.
    pub fn class(&self) -> &Class {
        match self {
            Receiver::Instance(object) => object.class(),
            Receiver::Type(class) => class,
        }
    }

    /// The scope this receiver dispatches in.
    pub fn scope(&self) -> Scope {
        match self {
            Receiver::Instance(_) => Scope::Instance,
            Receiver::Type(_) => Scope::Type,
        }
    }

    /// The instance, for instance-scope calls.
    pub fn object(&self) -> Option<&Object> {
        match self {
            Receiver::Instance(object) => Some(object),
            Receiver::Type(_) => None,
        }
    }
}

impl From<Receiver> for Value {
    fn from(receiver: Receiver) -> Self {
        match receiver {
            Receiver::Instance(object) => Value::Object(object),
            Receiver::Type(class) => Value::Class(class),
        }
    }
}

/// Everything an implementation sees of one call.
///
/// Arguments have already been marshaled to the kinds the implementation's
/// signature declares, so typed access through [`CallFrame::arg`] only fails
/// for an index out of range or a `T` that disagrees with the signature.
#[derive(Debug, Clone)]
pub struct CallFrame {
    receiver: Receiver,
    selector: Selector,
    args: Vec<Value>,
}

impl CallFrame {
    /// Assemble a frame.
    pub fn new(receiver: Receiver, selector: Selector, args: Vec<Value>) -> Self {
        Self {
            receiver,
            selector,
            args,
        }
    }

    /// The receiver.
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// The selector the call was sent to. After a swap this is the name the
    /// caller used, not the name the implementation was registered under.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// All arguments, in order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Typed access to argument `index`.
    ///
    /// An index past the last argument is an error even for `Option<T>`;
    /// a missing argument is not the same as a nil one.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, MarshalError> {
        let value = self.args.get(index).ok_or_else(|| MarshalError {
            expected: ValueKind::Any,
            found: format!("no argument at index {index}"),
        })?;
        T::from_value(value)
    }
}

/// The callable body of an implementation.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a method body",
    label = "missing `Method` implementation",
    note = "Implement `Method` or pass a closure `Fn(&CallFrame) -> Result<Value, BoxError>`."
)]
pub trait Method: Send + Sync + 'static {
    /// Run the method for one call.
    fn call(&self, frame: &CallFrame) -> Result<Value, BoxError>;
}

// Blanket impl for closures
impl<F> Method for F
where
    F: Fn(&CallFrame) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    fn call(&self, frame: &CallFrame) -> Result<Value, BoxError> {
        (self)(frame)
    }
}

/// A callable, relocatable function reference with its signature.
///
/// Cloning produces an alias of the same implementation; [`ptr_eq`] tells
/// aliases apart from distinct implementations.
///
/// [`ptr_eq`]: Implementation::ptr_eq
#[derive(Clone)]
pub struct Implementation {
    body: Arc<dyn Method>,
    signature: Arc<Signature>,
}

impl Implementation {
    /// Wrap a closure.
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&CallFrame) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::from_method(signature, body)
    }

    /// Wrap any [`Method`].
    pub fn from_method<M: Method>(signature: Signature, method: M) -> Self {
        Self {
            body: Arc::new(method),
            signature: Arc::new(signature),
        }
    }

    /// The declared signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether `self` and `other` are the same implementation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }

    /// Call the body directly. Arguments are not checked against the signature.
    pub fn call(&self, frame: &CallFrame) -> Result<Value, BoxError> {
        self.body.call(frame)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("signature", &self.signature)
            .field("body", &Arc::as_ptr(&self.body).cast::<()>())
            .finish()
    }
}
