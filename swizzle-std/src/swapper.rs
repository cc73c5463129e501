//! Exchanging the implementations behind two selectors.
//!
//! After a swap, sending selector A runs what B used to run and vice versa.
//! Selectors, scopes, and the classes that hold them never change; only the
//! implementation each entry points to does.
//!
//! # Inherited selectors
//!
//! A selector may resolve only through an ancestor. Under the default
//! [`SwapPolicy::MaterializeInherited`], such a selector first gets a direct
//! entry on the class it was resolved against, pointing at the inherited
//! implementation, and the swap then happens there. Ancestors and sibling
//! classes keep their bindings. [`SwapPolicy::InPlace`] exchanges the entries
//! wherever they are declared instead.

use crate::catalog::MethodDescriptor;
use swizzle_core::{Class, DispatchTable, Implementation, MethodKey, Selector, SwapError};

/// Where a swap writes when a selector is inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapPolicy {
    /// Give the resolving class its own entry first, then swap there.
    #[default]
    MaterializeInherited,
    /// Swap the entries in the classes that declare them.
    InPlace,
}

/// Exchanges implementations between dispatch entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Swapper {
    policy: SwapPolicy,
}

impl Swapper {
    /// A swapper with the default policy.
    pub const fn new() -> Self {
        Self {
            policy: SwapPolicy::MaterializeInherited,
        }
    }

    /// A swapper with the given policy.
    pub const fn with_policy(policy: SwapPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> SwapPolicy {
        self.policy
    }

    /// Exchange two instance-scope implementations of `class`.
    pub fn swap_instance_methods(
        &self,
        class: &Class,
        a: impl Into<Selector>,
        b: impl Into<Selector>,
    ) -> Result<(), SwapError> {
        self.exchange(class, &MethodKey::instance(a), class, &MethodKey::instance(b))
    }

    /// Exchange two type-scope implementations of `class`.
    pub fn swap_class_methods(
        &self,
        class: &Class,
        a: impl Into<Selector>,
        b: impl Into<Selector>,
    ) -> Result<(), SwapError> {
        self.exchange(class, &MethodKey::class(a), class, &MethodKey::class(b))
    }

    /// Exchange the entries two descriptors name.
    ///
    /// The descriptors may belong to different classes and scopes. Their
    /// implementation snapshots are ignored: the swap exchanges whatever the
    /// entries are bound to when it runs.
    pub fn swap_methods(&self, a: &MethodDescriptor, b: &MethodDescriptor) -> Result<(), SwapError> {
        self.exchange(&a.class, &a.key, &b.class, &b.key)
    }

    /// Exchange the implementations `key_a` resolves to on `class_a` and
    /// `key_b` resolves to on `class_b`.
    pub fn exchange(
        &self,
        class_a: &Class,
        key_a: &MethodKey,
        class_b: &Class,
        key_b: &MethodKey,
    ) -> Result<(), SwapError> {
        // Resolve before taking any write lock: resolution reads ancestor
        // tables, which may include the other side of the swap.
        let (owner_a, inherited_a) = resolve(class_a, key_a)?;
        let (owner_b, inherited_b) = resolve(class_b, key_b)?;

        let (slot_a, slot_b) = match self.policy {
            SwapPolicy::MaterializeInherited => (class_a, class_b),
            SwapPolicy::InPlace => (&owner_a, &owner_b),
        };

        if slot_a == slot_b {
            if key_a == key_b {
                return Ok(());
            }
            let mut table = slot_a.table_mut();
            let imp_a = bound(&mut table, slot_a, key_a, &inherited_a);
            let imp_b = bound(&mut table, slot_a, key_b, &inherited_b);
            table.replace(key_a, imp_b);
            table.replace(key_b, imp_a);
        } else {
            // Fixed lock order keeps opposite-direction swaps from deadlocking.
            let (mut table_a, mut table_b) = if slot_a.id() < slot_b.id() {
                let table_a = slot_a.table_mut();
                (table_a, slot_b.table_mut())
            } else {
                let table_b = slot_b.table_mut();
                (slot_a.table_mut(), table_b)
            };
            let imp_a = bound(&mut table_a, slot_a, key_a, &inherited_a);
            let imp_b = bound(&mut table_b, slot_b, key_b, &inherited_b);
            table_a.replace(key_a, imp_b);
            table_b.replace(key_b, imp_a);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            class_a = %slot_a.name(),
            %key_a,
            class_b = %slot_b.name(),
            %key_b,
            "implementations swapped"
        );
        Ok(())
    }
}

fn resolve(class: &Class, key: &MethodKey) -> Result<(Class, Implementation), SwapError> {
    class.lookup(key).ok_or_else(|| SwapError::SelectorNotFound {
        class: class.name().to_string(),
        selector: key.selector.to_string(),
        scope: key.scope,
    })
}

// The implementation `key` is bound to in `table`, materializing an entry
// for `inherited` first if the table has none.
fn bound(
    table: &mut DispatchTable,
    class: &Class,
    key: &MethodKey,
    inherited: &Implementation,
) -> Implementation {
    if let Some(existing) = table.get(key) {
        return existing.clone();
    }
    let _ = table.insert_new(key.clone(), inherited.clone());
    #[cfg(feature = "tracing")]
    tracing::debug!(class = %class.name(), %key, "inherited method materialized for swap");
    #[cfg(not(feature = "tracing"))]
    let _ = class;
    inherited.clone()
}
