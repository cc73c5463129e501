//! Member discovery.
//!
//! The catalog answers questions about what a class declares and what its
//! dispatch table holds. It only reads: no query allocates storage or
//! touches a dispatch table's contents.

use swizzle_core::{
    Class, Implementation, LookupError, MethodKey, PropertyAttributes, Scope, Selector,
};

/// Whether a data member is a bare storage slot or a declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMemberKind {
    /// A storage slot.
    Ivar,
    /// A property, with its declared attributes.
    Property(PropertyAttributes),
}

/// A read-only view of one declared data member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMember {
    /// Member name.
    pub name: String,
    /// Declared type, as written at declaration.
    pub type_name: String,
    /// The class that declares the member.
    pub owner: Class,
    /// Slot or property.
    pub kind: DataMemberKind,
}

/// A snapshot of one dispatch-table entry.
///
/// `class` is the class the selector was resolved against; `owner` is the
/// class whose table actually holds the entry. They differ when the method
/// is inherited.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Class the selector was resolved against.
    pub class: Class,
    /// Class whose table holds the entry.
    pub owner: Class,
    /// Scope and selector.
    pub key: MethodKey,
    /// Implementation bound at the time of the snapshot.
    pub implementation: Implementation,
}

impl MethodDescriptor {
    /// Describe an entry to be installed directly on `class`.
    pub fn new(class: &Class, key: MethodKey, implementation: Implementation) -> Self {
        Self {
            class: class.clone(),
            owner: class.clone(),
            key,
            implementation,
        }
    }

    /// The selector.
    pub fn selector(&self) -> &Selector {
        &self.key.selector
    }

    /// The scope.
    pub fn scope(&self) -> Scope {
        self.key.scope
    }

    /// Whether the entry was inherited rather than held by `class` itself.
    pub fn is_inherited(&self) -> bool {
        self.class != self.owner
    }
}

/// Read-only queries over classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    /// Create a catalog.
    pub const fn new() -> Self {
        Self
    }

    /// Every storage slot `class` declares directly, property backing
    /// slots included.
    pub fn data_members(&self, class: &Class) -> Vec<DataMember> {
        class
            .ivars()
            .iter()
            .map(|ivar| DataMember {
                name: ivar.name.clone(),
                type_name: ivar.type_name.clone(),
                owner: class.clone(),
                kind: DataMemberKind::Ivar,
            })
            .collect()
    }

    /// Names of every storage slot `class` declares directly.
    pub fn ivar_names(&self, class: &Class) -> Vec<String> {
        class.ivars().iter().map(|ivar| ivar.name.clone()).collect()
    }

    /// Names of the properties `class` declares directly.
    pub fn property_names(&self, class: &Class) -> Vec<String> {
        class
            .properties()
            .iter()
            .map(|property| property.name.clone())
            .collect()
    }

    /// Every key in `class`'s own dispatch table, both scopes.
    pub fn method_names(&self, class: &Class) -> Vec<(Scope, Selector)> {
        class
            .table()
            .keys()
            .map(|key| (key.scope, key.selector.clone()))
            .collect()
    }

    /// Resolve a data member by exact name, walking ancestors nearest first.
    ///
    /// At each class a slot name is tried before a property name.
    pub fn resolve_data_member(&self, class: &Class, name: &str) -> Result<DataMember, LookupError> {
        for owner in class.ancestors() {
            if let Some(ivar) = owner.ivars().iter().find(|ivar| ivar.name == name) {
                return Ok(DataMember {
                    name: ivar.name.clone(),
                    type_name: ivar.type_name.clone(),
                    owner: owner.clone(),
                    kind: DataMemberKind::Ivar,
                });
            }
            if let Some(property) = owner.properties().iter().find(|p| p.name == name) {
                return Ok(DataMember {
                    name: property.name.clone(),
                    type_name: property.type_name.clone(),
                    owner: owner.clone(),
                    kind: DataMemberKind::Property(property.attributes),
                });
            }
        }
        Err(LookupError::DataMemberNotFound {
            class: class.name().to_string(),
            name: name.to_string(),
        })
    }

    /// The declared type of a data member.
    pub fn declared_type_name(&self, class: &Class, name: &str) -> Result<String, LookupError> {
        self.resolve_data_member(class, name)
            .map(|member| member.type_name)
    }

    /// The class in `class`'s ancestry that declares a data member.
    pub fn owning_class(&self, class: &Class, name: &str) -> Result<Class, LookupError> {
        self.resolve_data_member(class, name).map(|member| member.owner)
    }

    /// Resolve a method, walking ancestors nearest first.
    pub fn method(
        &self,
        class: &Class,
        selector: impl Into<Selector>,
        scope: Scope,
    ) -> Result<MethodDescriptor, LookupError> {
        let key = MethodKey::new(scope, selector);
        match class.lookup(&key) {
            Some((owner, implementation)) => Ok(MethodDescriptor {
                class: class.clone(),
                owner,
                key,
                implementation,
            }),
            None => Err(LookupError::MethodNotFound {
                class: class.name().to_string(),
                selector: key.selector.to_string(),
                scope,
            }),
        }
    }

    /// [`method`](Catalog::method) in instance scope.
    pub fn instance_method(
        &self,
        class: &Class,
        selector: impl Into<Selector>,
    ) -> Result<MethodDescriptor, LookupError> {
        self.method(class, selector, Scope::Instance)
    }

    /// [`method`](Catalog::method) in type scope.
    pub fn class_method(
        &self,
        class: &Class,
        selector: impl Into<Selector>,
    ) -> Result<MethodDescriptor, LookupError> {
        self.method(class, selector, Scope::Type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swizzle_core::{ClassBuilder, Signature, Value};

    fn nop() -> Implementation {
        Implementation::new(Signature::void([]), |_| Ok(Value::Nil))
    }

    fn hierarchy() -> (Class, Class) {
        let base = ClassBuilder::new("Shape")
            .ivar("id", "u64")
            .property("name", "String", PropertyAttributes::COPY)
            .instance_method("area", nop())
            .class_method("unit", nop())
            .build();
        let circle = ClassBuilder::new("Circle")
            .superclass(&base)
            .ivar("radius", "f64")
            .instance_method("scale:", nop())
            .build();
        (base, circle)
    }

    #[test]
    fn test_data_members_are_direct_only() {
        let (base, circle) = hierarchy();
        let catalog = Catalog::new();

        let names: Vec<_> = catalog
            .data_members(&circle)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["radius"]);
        assert_eq!(catalog.ivar_names(&base), ["id", "_name"]);
        assert_eq!(catalog.property_names(&base), ["name"]);
        assert!(catalog.property_names(&circle).is_empty());
    }

    #[test]
    fn test_method_names_are_scope_tagged() {
        let (base, _) = hierarchy();
        let names = Catalog::new().method_names(&base);
        assert_eq!(
            names,
            [
                (Scope::Instance, Selector::from("area")),
                (Scope::Type, Selector::from("unit")),
            ]
        );
    }

    #[test]
    fn test_resolve_walks_ancestors() {
        let (base, circle) = hierarchy();
        let catalog = Catalog::new();

        let member = catalog.resolve_data_member(&circle, "id").unwrap();
        assert_eq!(member.owner, base);
        assert_eq!(member.type_name, "u64");
        assert_eq!(catalog.owning_class(&circle, "radius"), Ok(circle.clone()));
        assert_eq!(
            catalog.declared_type_name(&circle, "name"),
            Ok("String".to_string())
        );
    }

    #[test]
    fn test_resolve_property_kind() {
        let (base, _) = hierarchy();
        let member = Catalog::new().resolve_data_member(&base, "name").unwrap();
        assert_eq!(member.kind, DataMemberKind::Property(PropertyAttributes::COPY));

        let backing = Catalog::new().resolve_data_member(&base, "_name").unwrap();
        assert_eq!(backing.kind, DataMemberKind::Ivar);
    }

    #[test]
    fn test_missing_member_is_not_found() {
        let (_, circle) = hierarchy();
        let err = Catalog::new()
            .resolve_data_member(&circle, "diameter")
            .unwrap_err();
        assert_eq!(
            err,
            LookupError::DataMemberNotFound {
                class: "Circle".to_string(),
                name: "diameter".to_string(),
            }
        );
    }

    #[test]
    fn test_method_descriptor_records_owner() {
        let (base, circle) = hierarchy();
        let catalog = Catalog::new();

        let area = catalog.instance_method(&circle, "area").unwrap();
        assert_eq!(area.class, circle);
        assert_eq!(area.owner, base);
        assert!(area.is_inherited());

        let scale = catalog.instance_method(&circle, "scale:").unwrap();
        assert!(!scale.is_inherited());

        assert!(matches!(
            catalog.class_method(&circle, "area"),
            Err(LookupError::MethodNotFound { scope: Scope::Type, .. })
        ));
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let (base, circle) = hierarchy();
        let catalog = Catalog::new();
        let before = base.table().len();
        let _ = catalog.instance_method(&circle, "area");
        let _ = catalog.method_names(&circle);
        assert_eq!(base.table().len(), before);
        assert_eq!(circle.table().len(), 1);
    }
}
