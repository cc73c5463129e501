//! Boxed values and signature-driven marshaling.
//!
//! Arguments of a late-bound call are heterogeneous and their required types
//! are only known once the target implementation's [`Signature`] has been
//! inspected. Callers therefore hand the invoker [`Value`]s, and the invoker
//! marshals each one to the [`ValueKind`] its parameter declares.
//!
//! [`Signature`]: crate::Signature

use crate::class::Class;
use crate::error::MarshalError;
use crate::object::Object;
use std::fmt;
use std::sync::Arc;

/// The kind of value a parameter or return slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// Text string. Accepts nil.
    Str,
    /// Object reference. Accepts nil.
    Object,
    /// Class reference. Accepts nil.
    Class,
    /// Any value, passed through untouched.
    Any,
}

impl ValueKind {
    /// Whether nil is a valid value of this kind.
    pub const fn is_nullable(self) -> bool {
        matches!(
            self,
            ValueKind::Str | ValueKind::Object | ValueKind::Class | ValueKind::Any
        )
    }

    /// Whether this is one of the integer kinds.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ValueKind::I8
                | ValueKind::I16
                | ValueKind::I32
                | ValueKind::I64
                | ValueKind::U8
                | ValueKind::U16
                | ValueKind::U32
                | ValueKind::U64
        )
    }

    /// The lowercase name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Str => "string",
            ValueKind::Object => "object",
            ValueKind::Class => "class",
            ValueKind::Any => "any",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How strictly argument and return values are matched against a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Marshaling {
    /// The value's kind must equal the declared kind. Nil still satisfies
    /// nullable kinds.
    Strict,
    /// Like `Strict`, but numeric values are converted when no information
    /// is lost: integer width changes that fit, integers to floats that
    /// represent them exactly, and `f32` to `f64`.
    #[default]
    Lossless,
}

/// A runtime value tagged with its kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absent value, also used as the null reference.
    #[default]
    Nil,
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// Text string.
    Str(Arc<str>),
    /// Object reference.
    Object(Object),
    /// Class reference.
    Class(Class),
}

impl Value {
    /// The kind of this value, or `None` for nil.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Value::Nil => return None,
            Value::Bool(_) => ValueKind::Bool,
            Value::I8(_) => ValueKind::I8,
            Value::I16(_) => ValueKind::I16,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U8(_) => ValueKind::U8,
            Value::U16(_) => ValueKind::U16,
            Value::U32(_) => ValueKind::U32,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Str(_) => ValueKind::Str,
            Value::Object(_) => ValueKind::Object,
            Value::Class(_) => ValueKind::Class,
        })
    }

    /// Whether this is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Short description for diagnostics: the kind name, or `nil`.
    pub fn describe(&self) -> String {
        match self.kind() {
            Some(kind) => kind.name().to_string(),
            None => "nil".to_string(),
        }
    }

    /// The object reference, if this is one.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The class reference, if this is one.
    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert this value to `expected`, following `policy`.
    pub fn marshal(&self, expected: ValueKind, policy: Marshaling) -> Result<Value, MarshalError> {
        if expected == ValueKind::Any || self.kind() == Some(expected) {
            return Ok(self.clone());
        }
        if self.is_nil() && expected.is_nullable() {
            return Ok(Value::Nil);
        }
        if policy == Marshaling::Lossless {
            if let Some(converted) = self.convert_lossless(expected) {
                return Ok(converted);
            }
        }
        Err(MarshalError::new(expected, self))
    }

    fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v.into()),
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => Some(v.into()),
            _ => None,
        }
    }

    fn convert_lossless(&self, expected: ValueKind) -> Option<Value> {
        if let Some(n) = self.as_i128() {
            return match expected {
                ValueKind::I8 => i8::try_from(n).ok().map(Value::I8),
                ValueKind::I16 => i16::try_from(n).ok().map(Value::I16),
                ValueKind::I32 => i32::try_from(n).ok().map(Value::I32),
                ValueKind::I64 => i64::try_from(n).ok().map(Value::I64),
                ValueKind::U8 => u8::try_from(n).ok().map(Value::U8),
                ValueKind::U16 => u16::try_from(n).ok().map(Value::U16),
                ValueKind::U32 => u32::try_from(n).ok().map(Value::U32),
                ValueKind::U64 => u64::try_from(n).ok().map(Value::U64),
                ValueKind::F32 => {
                    let f = n as f32;
                    (f as i128 == n).then_some(Value::F32(f))
                }
                ValueKind::F64 => {
                    let f = n as f64;
                    (f as i128 == n).then_some(Value::F64(f))
                }
                _ => None,
            };
        }
        match (self, expected) {
            (Value::F32(v), ValueKind::F64) => Some(Value::F64(f64::from(*v))),
            (Value::F64(v), ValueKind::F32) => {
                let narrowed = *v as f32;
                (f64::from(narrowed) == *v).then_some(Value::F32(narrowed))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::Object(o) => write!(f, "<{} instance>", o.class().name()),
            Value::Class(c) => write!(f, "<class {}>", c.name()),
        }
    }
}

impl MarshalError {
    /// Describe `found` failing to fit `expected`.
    pub fn new(expected: ValueKind, found: &Value) -> Self {
        Self {
            expected,
            found: found.describe(),
        }
    }
}

/// Typed extraction from a [`Value`].
///
/// Extraction goes through [`Marshaling::Lossless`], so an `i64` can be read
/// from any integer value that fits.
pub trait FromValue: Sized {
    /// Extract `Self`, or report why the value does not fit.
    fn from_value(value: &Value) -> Result<Self, MarshalError>;
}

macro_rules! primitive_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, MarshalError> {
                    match value.marshal(ValueKind::$variant, Marshaling::Lossless)? {
                        Value::$variant(v) => Ok(v),
                        other => Err(MarshalError::new(ValueKind::$variant, &other)),
                    }
                }
            }
        )*
    };
}

primitive_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Value::Str(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl From<&Object> for Value {
    fn from(v: &Object) -> Self {
        Value::Object(v.clone())
    }
}

impl From<Class> for Value {
    fn from(v: Class) -> Self {
        Value::Class(v)
    }
}

impl From<&Class> for Value {
    fn from(v: &Class) -> Self {
        Value::Class(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, MarshalError> {
        Ok(value.clone())
    }
}

impl FromValue for Arc<str> {
    fn from_value(value: &Value) -> Result<Self, MarshalError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(MarshalError::new(ValueKind::Str, other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, MarshalError> {
        Arc::<str>::from_value(value).map(|s| s.to_string())
    }
}

impl FromValue for Object {
    fn from_value(value: &Value) -> Result<Self, MarshalError> {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| MarshalError::new(ValueKind::Object, value))
    }
}

impl FromValue for Class {
    fn from_value(value: &Value) -> Result<Self, MarshalError> {
        value
            .as_class()
            .cloned()
            .ok_or_else(|| MarshalError::new(ValueKind::Class, value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, MarshalError> {
        if value.is_nil() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
