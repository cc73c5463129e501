//! Runtime registration of new dispatch entries.
//!
//! Registration is the only way a dispatch table grows at runtime, and it
//! never alters an existing entry: a key that is already bound on the target
//! class is rejected. Rebinding an existing key goes through the
//! [`Swapper`](crate::swapper::Swapper).
//!
//! Entries inherited from an ancestor do not count as bound on the target
//! class, so registering one shadows the ancestor's implementation.

use crate::catalog::MethodDescriptor;
use swizzle_core::{Class, Implementation, MethodKey, RegistrationError, Scope, Selector};

/// Adds callable members to classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registrar;

impl Registrar {
    /// Create a registrar.
    pub const fn new() -> Self {
        Self
    }

    /// Install `implementation` under `key` on `class`.
    ///
    /// On success the table has gained exactly one entry.
    pub fn try_add_method(
        &self,
        class: &Class,
        key: MethodKey,
        implementation: Implementation,
    ) -> Result<(), RegistrationError> {
        if !key.selector.is_valid() {
            return Err(RegistrationError::InvalidSelector(key.selector.to_string()));
        }

        match class.table_mut().insert_new(key.clone(), implementation) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(class = %class.name(), %key, "method added");
                Ok(())
            }
            Err(_) => Err(RegistrationError::Conflict {
                class: class.name().to_string(),
                selector: key.selector.to_string(),
                scope: key.scope,
            }),
        }
    }

    /// Install the descriptor's implementation on the descriptor's class.
    ///
    /// Returns `false` without mutating anything if the key is already
    /// bound on that class or the selector is invalid.
    pub fn add_method(&self, descriptor: &MethodDescriptor) -> bool {
        let result = self.try_add_method(
            &descriptor.class,
            descriptor.key.clone(),
            descriptor.implementation.clone(),
        );
        log_rejection(&descriptor.class, &result);
        result.is_ok()
    }

    /// Install an instance-scope implementation.
    pub fn add_instance_method(
        &self,
        class: &Class,
        selector: impl Into<Selector>,
        implementation: Implementation,
    ) -> bool {
        self.add_method(&MethodDescriptor::new(
            class,
            MethodKey::instance(selector),
            implementation,
        ))
    }

    /// Install a type-scope implementation.
    pub fn add_class_method(
        &self,
        class: &Class,
        selector: impl Into<Selector>,
        implementation: Implementation,
    ) -> bool {
        self.add_method(&MethodDescriptor::new(
            class,
            MethodKey::class(selector),
            implementation,
        ))
    }

    /// Copy the implementation `source` resolves for `key` onto `target`.
    ///
    /// `source`'s ancestors are searched. Afterwards both classes run the
    /// same implementation for the selector.
    pub fn try_borrow_method(
        &self,
        target: &Class,
        key: MethodKey,
        source: &Class,
    ) -> Result<(), RegistrationError> {
        let Some((_, implementation)) = source.lookup(&key) else {
            return Err(RegistrationError::SourceNotFound {
                class: source.name().to_string(),
                selector: key.selector.to_string(),
                scope: key.scope,
            });
        };
        self.try_add_method(target, key, implementation)
    }

    /// Borrow an instance-scope implementation from `source`.
    ///
    /// Returns `false` if `source` cannot resolve the selector or `target`
    /// already binds it.
    pub fn borrow_instance_method(
        &self,
        target: &Class,
        selector: impl Into<Selector>,
        source: &Class,
    ) -> bool {
        self.borrow(target, MethodKey::new(Scope::Instance, selector), source)
    }

    /// Borrow a type-scope implementation from `source`.
    pub fn borrow_class_method(
        &self,
        target: &Class,
        selector: impl Into<Selector>,
        source: &Class,
    ) -> bool {
        self.borrow(target, MethodKey::new(Scope::Type, selector), source)
    }

    fn borrow(&self, target: &Class, key: MethodKey, source: &Class) -> bool {
        let result = self.try_borrow_method(target, key, source);
        log_rejection(target, &result);
        result.is_ok()
    }
}

fn log_rejection(class: &Class, result: &Result<(), RegistrationError>) {
    #[cfg(feature = "tracing")]
    {
        if let Err(error) = result {
            tracing::debug!(class = %class.name(), %error, "method registration rejected");
        }
    }
    #[cfg(not(feature = "tracing"))]
    let _ = (class, result);
}
