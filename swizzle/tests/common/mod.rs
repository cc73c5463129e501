#![allow(dead_code)]

use swizzle::{Class, ClassBuilder, Implementation, PropertyAttributes, Signature, Value, ValueKind};

// ============================================================================
// Implementations
// ============================================================================

pub fn unary_i64(f: fn(i64) -> i64) -> Implementation {
    Implementation::new(
        Signature::new([ValueKind::I64], Some(ValueKind::I64)),
        move |frame| Ok(Value::I64(f(frame.arg::<i64>(0)?))),
    )
}

pub fn double() -> Implementation {
    unary_i64(|x| x * 2)
}

pub fn negate() -> Implementation {
    unary_i64(|x| -x)
}

pub fn add() -> Implementation {
    Implementation::new(
        Signature::new([ValueKind::I64, ValueKind::I64], Some(ValueKind::I64)),
        |frame| Ok(Value::I64(frame.arg::<i64>(0)? + frame.arg::<i64>(1)?)),
    )
}

// ============================================================================
// Classes
// ============================================================================

/// `Calc` with a pre-existing `negate:` and `add:to:`.
pub fn calc() -> Class {
    ClassBuilder::new("Calc")
        .instance_method("negate:", negate())
        .instance_method("add:to:", add())
        .build()
}

/// `Counter` keeps its count in an ivar.
pub fn counter() -> Class {
    ClassBuilder::new("Counter")
        .ivar("count", "i64")
        .instance_method(
            "increment",
            Implementation::new(Signature::void([]), |frame| {
                let object = frame.receiver().object().ok_or("instance required")?;
                let current: i64 = object.ivar("count")?.as_i64_or_zero();
                object.set_ivar("count", current + 1)?;
                Ok(Value::Nil)
            }),
        )
        .instance_method(
            "count",
            Implementation::new(Signature::new([], Some(ValueKind::I64)), |frame| {
                let object = frame.receiver().object().ok_or("instance required")?;
                Ok(Value::I64(object.ivar("count")?.as_i64_or_zero()))
            }),
        )
        .build()
}

/// `Shape` → `Circle`, `Square`; `Shape` declares `describe` and `+kind`.
pub fn shapes() -> (Class, Class, Class) {
    let shape = ClassBuilder::new("Shape")
        .ivar("id", "u64")
        .property("name", "String", PropertyAttributes::COPY)
        .instance_method("describe", label("shape"))
        .class_method("kind", label("polygon"))
        .build();
    let circle = ClassBuilder::new("Circle")
        .superclass(&shape)
        .ivar("radius", "f64")
        .instance_method("loud_describe", label("CIRCLE"))
        .build();
    let square = ClassBuilder::new("Square")
        .superclass(&shape)
        .property("side", "f64", PropertyAttributes::NONATOMIC | PropertyAttributes::READONLY)
        .build();
    (shape, circle, square)
}

pub fn label(text: &'static str) -> Implementation {
    Implementation::new(Signature::new([], Some(ValueKind::Str)), move |_| {
        Ok(Value::from(text))
    })
}

pub trait ValueExt {
    fn as_i64_or_zero(&self) -> i64;
}

impl ValueExt for Value {
    fn as_i64_or_zero(&self) -> i64 {
        match self {
            Value::I64(v) => *v,
            _ => 0,
        }
    }
}
