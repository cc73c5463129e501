//! Name-addressed class registry.
//!
//! Classes are usually passed around by handle, but callers that only know a
//! class by name (configuration, scripting front-ends) resolve it here.
//!
//! With the `inventory` feature, classes can also be declared at link time:
//!
//! ```rust,ignore
//! fn build_calc() -> Class {
//!     ClassBuilder::new("Calc").build()
//! }
//!
//! inventory::submit! { ClassDeclaration { build: build_calc } }
//!
//! let registry = ClassRegistry::new();
//! registry.collect_declared();
//! assert!(registry.get("Calc").is_ok());
//! ```

use crate::class::Class;
use crate::error::LookupError;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

/// A thread-safe map from class name to class.
#[derive(Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, Class>>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static ClassRegistry {
        static GLOBAL: OnceLock<ClassRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ClassRegistry::new)
    }

    /// Register `class` under its name.
    ///
    /// Returns `false`, leaving the registry unchanged, if the name is taken.
    pub fn register(&self, class: &Class) -> bool {
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        if classes.contains_key(class.name()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(class = %class.name(), "class name already registered");
            return false;
        }
        classes.insert(class.name().to_string(), class.clone());
        true
    }

    /// Look up a class by name.
    pub fn get(&self, name: &str) -> Result<Class, LookupError> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::ClassNotFound(name.to_string()))
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A class declared at link time through `inventory::submit!`.
#[cfg(feature = "inventory")]
pub struct ClassDeclaration {
    /// Builds the class. Called once per [`ClassRegistry::collect_declared`].
    pub build: fn() -> Class,
}

#[cfg(feature = "inventory")]
inventory::collect!(ClassDeclaration);

#[cfg(feature = "inventory")]
impl ClassRegistry {
    /// Build and register every submitted [`ClassDeclaration`].
    ///
    /// Returns how many were newly registered.
    pub fn collect_declared(&self) -> usize {
        inventory::iter::<ClassDeclaration>()
            .filter(|declaration| self.register(&(declaration.build)()))
            .count()
    }
}
