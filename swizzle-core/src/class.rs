//! Classes and their dispatch tables.
//!
//! A [`Class`] owns two things the toolkit cares about: its declared data
//! members (ivars and properties), fixed when the class is built, and a
//! [`DispatchTable`] mapping `(scope, selector)` to an [`Implementation`],
//! which stays mutable for the life of the process and is shared by every
//! instance of the class.

use crate::method::Implementation;
use crate::object::Object;
use crate::selector::{MethodKey, Scope, Selector};
use bitflags::bitflags;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

bitflags! {
    /// Declared attributes of a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyAttributes: u8 {
        /// No setter is generated.
        const READONLY = 1 << 0;
        /// Assigned values are copied.
        const COPY = 1 << 1;
        /// The reference does not keep its target alive.
        const WEAK = 1 << 2;
        /// Access is not synchronized.
        const NONATOMIC = 1 << 3;
        /// The reference keeps its target alive.
        const STRONG = 1 << 4;
    }
}

/// A storage slot declared by a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ivar {
    /// Slot name, unique within the declaring class.
    pub name: String,
    /// Declared type, as written at declaration.
    pub type_name: String,
}

/// A declared property and the ivar that backs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name, unique within the declaring class.
    pub name: String,
    /// Declared type, as written at declaration.
    pub type_name: String,
    /// Declared attributes.
    pub attributes: PropertyAttributes,
    /// Name of the backing ivar.
    pub ivar: String,
}

/// The per-class mapping from `(scope, selector)` to implementation.
///
/// Keys are kept ordered so listings are deterministic.
#[derive(Debug, Default)]
pub struct DispatchTable {
    entries: BTreeMap<MethodKey, Implementation>,
}

impl DispatchTable {
    /// The implementation bound to `key` in this table, ignoring ancestors.
    pub fn get(&self, key: &MethodKey) -> Option<&Implementation> {
        self.entries.get(key)
    }

    /// Whether `key` has a direct entry.
    pub fn contains(&self, key: &MethodKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Add a new entry. An existing entry is never overwritten; the rejected
    /// implementation is handed back instead.
    pub fn insert_new(
        &mut self,
        key: MethodKey,
        implementation: Implementation,
    ) -> Result<(), Implementation> {
        if self.entries.contains_key(&key) {
            return Err(implementation);
        }
        self.entries.insert(key, implementation);
        Ok(())
    }

    /// Rebind an existing entry, returning the previous implementation.
    /// Absent keys stay absent and `None` is returned.
    pub fn replace(
        &mut self,
        key: &MethodKey,
        implementation: Implementation,
    ) -> Option<Implementation> {
        self.entries
            .get_mut(key)
            .map(|slot| std::mem::replace(slot, implementation))
    }

    /// All keys, ordered by scope then selector.
    pub fn keys(&self) -> impl Iterator<Item = &MethodKey> {
        self.entries.keys()
    }

    /// All entries, ordered by scope then selector.
    pub fn iter(&self) -> impl Iterator<Item = (&MethodKey, &Implementation)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct ClassInner {
    name: String,
    superclass: Option<Class>,
    ivars: Vec<Ivar>,
    properties: Vec<Property>,
    table: RwLock<DispatchTable>,
}

/// A shared handle to a class.
///
/// Equality and hashing use identity: two handles are equal only when they
/// refer to the same class.
#[derive(Clone)]
pub struct Class(Arc<ClassInner>);

impl Class {
    /// The class name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The direct superclass.
    pub fn superclass(&self) -> Option<&Class> {
        self.0.superclass.as_ref()
    }

    /// This class followed by each ancestor, nearest first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Whether `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.ancestors().any(|class| class == other)
    }

    /// Ivars declared directly by this class, in declaration order.
    pub fn ivars(&self) -> &[Ivar] {
        &self.0.ivars
    }

    /// Properties declared directly by this class, in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.0.properties
    }

    /// Read access to this class's own dispatch table.
    pub fn table(&self) -> RwLockReadGuard<'_, DispatchTable> {
        self.0.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to this class's own dispatch table.
    pub fn table_mut(&self) -> RwLockWriteGuard<'_, DispatchTable> {
        self.0.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve `key` through this class and its ancestors.
    ///
    /// Returns the class that holds the entry together with the
    /// implementation it is bound to at this instant.
    pub fn lookup(&self, key: &MethodKey) -> Option<(Class, Implementation)> {
        self.ancestors().find_map(|class| {
            class
                .table()
                .get(key)
                .map(|imp| (class.clone(), imp.clone()))
        })
    }

    /// Whether `selector` resolves in `scope`.
    pub fn responds_to(&self, scope: Scope, selector: impl Into<Selector>) -> bool {
        self.lookup(&MethodKey::new(scope, selector)).is_some()
    }

    /// Create an instance with every ivar set to nil.
    pub fn instantiate(&self) -> Object {
        Object::new(self.clone())
    }

    /// Number of ivar slots an instance needs, ancestors included.
    pub fn instance_size(&self) -> usize {
        self.ancestors().map(|class| class.ivars().len()).sum()
    }

    /// Stable identity of this class for the life of the process.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// A handle that does not keep the class alive.
    ///
    /// Implementations stored in a class's own table hold one of these to
    /// refer back to the class without forming a cycle.
    pub fn downgrade(&self) -> WeakClass {
        WeakClass(Arc::downgrade(&self.0))
    }
}

/// A non-owning [`Class`] handle.
#[derive(Clone)]
pub struct WeakClass(Weak<ClassInner>);

impl WeakClass {
    /// The class, if it is still alive.
    pub fn upgrade(&self) -> Option<Class> {
        self.0.upgrade().map(Class)
    }
}

impl fmt::Debug for WeakClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(class) => f.debug_tuple("WeakClass").field(&class.name()).finish(),
            None => f.write_str("WeakClass(<dropped>)"),
        }
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Class").field(&self.0.name).finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Iterator over a class and its ancestors.
pub struct Ancestors<'a> {
    next: Option<&'a Class>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.superclass();
        Some(current)
    }
}

/// Builder for constructing a [`Class`].
///
/// Declarations are fixed once [`build`](ClassBuilder::build) returns; only
/// the dispatch table can change afterwards.
pub struct ClassBuilder {
    name: String,
    superclass: Option<Class>,
    ivars: Vec<Ivar>,
    properties: Vec<Property>,
    methods: Vec<(MethodKey, Implementation)>,
}

impl ClassBuilder {
    /// Start a class named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            ivars: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Inherit from `superclass`.
    pub fn superclass(mut self, superclass: &Class) -> Self {
        self.superclass = Some(superclass.clone());
        self
    }

    /// Declare a storage slot.
    pub fn ivar(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.ivars.push(Ivar {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    /// Declare a property backed by an ivar named `_<name>`.
    pub fn property(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        attributes: PropertyAttributes,
    ) -> Self {
        let name = name.into();
        let type_name = type_name.into();
        let ivar = format!("_{name}");
        self.ivars.push(Ivar {
            name: ivar.clone(),
            type_name: type_name.clone(),
        });
        self.properties.push(Property {
            name,
            type_name,
            attributes,
            ivar,
        });
        self
    }

    /// Bind an instance-scope implementation.
    pub fn instance_method(
        mut self,
        selector: impl Into<Selector>,
        implementation: Implementation,
    ) -> Self {
        self.methods
            .push((MethodKey::instance(selector), implementation));
        self
    }

    /// Bind a type-scope implementation.
    pub fn class_method(
        mut self,
        selector: impl Into<Selector>,
        implementation: Implementation,
    ) -> Self {
        self.methods.push((MethodKey::class(selector), implementation));
        self
    }

    /// Finish the class.
    ///
    /// Repeated ivar, property, or method declarations keep the first one.
    pub fn build(self) -> Class {
        let ivars = dedup_by_name(self.ivars, |ivar| &ivar.name, &self.name);
        let properties = dedup_by_name(self.properties, |prop| &prop.name, &self.name);

        let mut table = DispatchTable::default();
        for (key, implementation) in self.methods {
            if table.insert_new(key.clone(), implementation).is_err() {
                #[cfg(feature = "tracing")]
                tracing::warn!(class = %self.name, %key, "duplicate method declaration ignored");
                #[cfg(not(feature = "tracing"))]
                let _ = key;
            }
        }

        Class(Arc::new(ClassInner {
            name: self.name,
            superclass: self.superclass,
            ivars,
            properties,
            table: RwLock::new(table),
        }))
    }
}

fn dedup_by_name<T>(items: Vec<T>, name: impl Fn(&T) -> &String, class: &str) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if kept.iter().any(|existing| name(existing) == name(&item)) {
            #[cfg(feature = "tracing")]
            tracing::warn!(class, member = %name(&item), "duplicate member declaration ignored");
            continue;
        }
        kept.push(item);
    }
    #[cfg(not(feature = "tracing"))]
    let _ = class;
    kept
}
