//! Closed Java type model shared across remark crates.
//!
//! The model is populated once by whatever resolved the source (or compiled)
//! declarations and is read-only afterwards: `ClassDef`/`MethodDef` describe
//! one class or interface each, the [`TypeStore`] interns them behind compact
//! ids, and the algorithms at the crate root ([`is_subtype`],
//! [`instantiate_as_supertype`]) walk the resulting graph. Nothing in this
//! crate performs I/O or reflection.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

mod hierarchy;
mod subtyping;

pub use hierarchy::instantiate_as_supertype;
pub use subtyping::{canonicalize_named, is_subtype, substitute};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(u32);

impl TypeVarId {
    fn from_raw(raw: u32) -> Self {
        TypeVarId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeVarId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Annotation,
}

/// Source-level access of a member (JLS 6.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

/// A Java type as the algorithms see it.
///
/// `Class` with empty `args` on a generic class is a *raw* use; rawness is
/// significant (see [`instantiate_as_supertype`]). `Named` keeps the spelled
/// qualified name of a reference the resolver could not intern yet;
/// [`canonicalize_named`] upgrades it on demand. `Unknown`/`Error` stand in
/// for unresolved or erroneous input and never match anything.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveType),
    Void,
    Class(ClassType),
    Named(String),
    TypeVar(TypeVarId),
    Array(Box<Type>),
    Unknown,
    Error,
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Type {
        Type::Class(ClassType { def, args })
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveType::Boolean)
    }

    #[must_use]
    pub fn is_errorish(&self) -> bool {
        matches!(self, Type::Unknown | Type::Error)
    }
}

/// One declared type parameter and its upper bounds.
///
/// Builders are expected to supply the implicit `java.lang.Object` bound
/// explicitly, so `upper_bounds` is never empty for well-formed input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
}

/// One declared method signature.
///
/// `params` hold the effective parameter types: a varargs method stores its
/// trailing parameter as the array type (the compiled form), with
/// `is_varargs` recording the source-level spelling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

/// One class, interface, or annotation type.
///
/// `super_class` is `None` for interfaces and for `java.lang.Object`.
/// `interfaces` preserve declaration order; consumers rely on it as a search
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub methods: Vec<MethodDef>,
}

/// Ids of types the algorithms need without a name lookup.
#[derive(Clone, Copy, Debug)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    /// `java.lang.Override`, the marker annotation maintained by
    /// `remark-override`.
    pub override_marker: ClassId,
}

/// Read-only view of the type graph consumed by the algorithms.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

/// Owning store behind [`TypeEnv`].
///
/// Classes can be interned before they are defined; `intern_class_id` hands
/// out a stable id backed by a placeholder definition that a later
/// `define_class` overwrites. The well-known ids are interned up front so
/// they are stable regardless of definition order.
pub struct TypeStore {
    classes: Vec<ClassDef>,
    type_params: Vec<TypeParamDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        let mut store = TypeStore {
            classes: Vec::new(),
            type_params: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes {
                object: ClassId::from_raw(0),
                string: ClassId::from_raw(0),
                cloneable: ClassId::from_raw(0),
                serializable: ClassId::from_raw(0),
                override_marker: ClassId::from_raw(0),
            },
        };
        store.well_known = WellKnownTypes {
            object: store.intern_class_id("java.lang.Object"),
            string: store.intern_class_id("java.lang.String"),
            cloneable: store.intern_class_id("java.lang.Cloneable"),
            serializable: store.intern_class_id("java.io.Serializable"),
            override_marker: store.intern_class_id("java.lang.Override"),
        };
        store
    }
}

impl TypeStore {
    /// A store pre-populated with the handful of JDK types the algorithms
    /// and tests lean on.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore::default();
        let wk = store.well_known;
        let object = Type::class(wk.object, vec![]);
        let string = Type::class(wk.string, vec![]);

        store.define_class(
            wk.object,
            ClassDef {
                name: "java.lang.Object".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                methods: vec![
                    MethodDef {
                        name: "toString".to_string(),
                        params: vec![],
                        return_type: string.clone(),
                        visibility: Visibility::Public,
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "equals".to_string(),
                        params: vec![object.clone()],
                        return_type: Type::boolean(),
                        visibility: Visibility::Public,
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "hashCode".to_string(),
                        params: vec![],
                        return_type: Type::int(),
                        visibility: Visibility::Public,
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "clone".to_string(),
                        params: vec![],
                        return_type: object.clone(),
                        visibility: Visibility::Protected,
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                    MethodDef {
                        name: "finalize".to_string(),
                        params: vec![],
                        return_type: Type::Void,
                        visibility: Visibility::Protected,
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
            },
        );

        store.define_class(
            wk.string,
            ClassDef {
                name: "java.lang.String".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object.clone()),
                interfaces: vec![Type::class(wk.serializable, vec![])],
                methods: vec![],
            },
        );

        store.define_class(
            wk.cloneable,
            ClassDef {
                name: "java.lang.Cloneable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                methods: vec![],
            },
        );

        store.define_class(
            wk.serializable,
            ClassDef {
                name: "java.io.Serializable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                methods: vec![],
            },
        );

        store.define_class(
            wk.override_marker,
            ClassDef {
                name: "java.lang.Override".to_string(),
                kind: ClassKind::Annotation,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                methods: vec![],
            },
        );

        let collection_e = store.add_type_param("E", vec![object.clone()]);
        let collection = store.add_class(ClassDef {
            name: "java.util.Collection".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![collection_e],
            super_class: None,
            interfaces: vec![],
            methods: vec![
                MethodDef {
                    name: "size".to_string(),
                    params: vec![],
                    return_type: Type::int(),
                    visibility: Visibility::Public,
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                },
                MethodDef {
                    name: "add".to_string(),
                    params: vec![Type::TypeVar(collection_e)],
                    return_type: Type::boolean(),
                    visibility: Visibility::Public,
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                },
            ],
        });

        let list_e = store.add_type_param("E", vec![object.clone()]);
        let list = store.add_class(ClassDef {
            name: "java.util.List".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![list_e],
            super_class: None,
            interfaces: vec![Type::class(collection, vec![Type::TypeVar(list_e)])],
            methods: vec![
                MethodDef {
                    name: "size".to_string(),
                    params: vec![],
                    return_type: Type::int(),
                    visibility: Visibility::Public,
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                },
                MethodDef {
                    name: "add".to_string(),
                    params: vec![Type::TypeVar(list_e)],
                    return_type: Type::boolean(),
                    visibility: Visibility::Public,
                    is_static: false,
                    is_varargs: false,
                    is_abstract: true,
                },
            ],
        });

        let array_list_e = store.add_type_param("E", vec![object.clone()]);
        store.add_class(ClassDef {
            name: "java.util.ArrayList".to_string(),
            kind: ClassKind::Class,
            type_params: vec![array_list_e],
            super_class: Some(object),
            interfaces: vec![Type::class(list, vec![Type::TypeVar(array_list_e)])],
            methods: vec![],
        });

        store
    }

    /// Id for `name`, creating a placeholder definition on first use.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId::from_raw(self.classes.len() as u32);
        self.classes.push(ClassDef {
            name: name.to_string(),
            kind: ClassKind::Class,
            type_params: vec![],
            super_class: None,
            interfaces: vec![],
            methods: vec![],
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Overwrite the definition behind `id`, keeping the id stable.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        self.by_name.insert(def.name.clone(), id);
        self.classes[id.idx()] = def;
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn add_type_param(&mut self, name: &str, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.to_string(),
            upper_bounds,
        });
        id
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.idx())
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
