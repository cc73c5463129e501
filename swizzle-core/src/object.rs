//! Instances.

use crate::class::Class;
use crate::error::LookupError;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

struct ObjectInner {
    class: Class,
    slots: RwLock<Vec<Value>>,
}

/// A shared handle to an instance of a [`Class`].
///
/// Storage for every ivar in the class chain is allocated once, at
/// instantiation. Equality uses identity.
#[derive(Clone)]
pub struct Object(Arc<ObjectInner>);

impl Object {
    pub(crate) fn new(class: Class) -> Self {
        let slots = vec![Value::Nil; class.instance_size()];
        Self(Arc::new(ObjectInner {
            class,
            slots: RwLock::new(slots),
        }))
    }

    /// The class this object was instantiated from.
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    /// Read an ivar declared by the object's class or any ancestor.
    pub fn ivar(&self, name: &str) -> Result<Value, LookupError> {
        let index = self.slot_index(name)?;
        let slots = self.0.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots[index].clone())
    }

    /// Write an ivar, returning the previous value.
    pub fn set_ivar(&self, name: &str, value: impl Into<Value>) -> Result<Value, LookupError> {
        let index = self.slot_index(name)?;
        let mut slots = self.0.slots.write().unwrap_or_else(PoisonError::into_inner);
        Ok(std::mem::replace(&mut slots[index], value.into()))
    }

    /// Whether both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // Slots are laid out class by class, nearest class first, so a subclass
    // ivar shadows an ancestor ivar of the same name.
    fn slot_index(&self, name: &str) -> Result<usize, LookupError> {
        let mut offset = 0;
        for class in self.class().ancestors() {
            if let Some(i) = class.ivars().iter().position(|ivar| ivar.name == name) {
                return Ok(offset + i);
            }
            offset += class.ivars().len();
        }
        Err(LookupError::DataMemberNotFound {
            class: self.class().name().to_string(),
            name: name.to_string(),
        })
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.0.class.name())
            .field("addr", &Arc::as_ptr(&self.0))
            .finish()
    }
}
