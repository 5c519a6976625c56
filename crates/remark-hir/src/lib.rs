//! Declaration-level view of one Java compilation unit.
//!
//! This is the mutable surface the annotation passes operate on: type
//! declarations with their methods, modifiers and annotation lists, after an
//! external resolver has linked them to the `remark_types` store. Method
//! bodies are not modeled.

use remark_types::{ClassId, Type, Visibility};
use thiserror::Error;

/// JVM access-flag bits (JVMS 4.6) understood by
/// [`Modifiers::from_access_flags`].
pub mod access_flags {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const ABSTRACT: u16 = 0x0400;
}

#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub types: Vec<TypeDecl>,
}

impl CompilationUnit {
    pub fn new(package: Option<String>) -> Self {
        Self {
            package,
            types: Vec::new(),
        }
    }
}

/// One class or interface declaration.
///
/// `binding` is the symbol resolver's link into the type store; `None` means
/// resolution failed and the methods inside cannot be analyzed.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub binding: Option<ClassId>,
    pub methods: Vec<MethodDecl>,
    pub nested_types: Vec<TypeDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: None,
            methods: Vec::new(),
            nested_types: Vec::new(),
        }
    }

    pub fn bound(name: impl Into<String>, binding: ClassId) -> Self {
        Self {
            binding: Some(binding),
            ..TypeDecl::new(name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub params: Vec<Param>,
    pub return_type: Type,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            params: Vec::new(),
            return_type: Type::Void,
        }
    }

    pub fn has_annotation(&self, query: &str) -> bool {
        self.annotations.iter().any(|a| a.matches(query))
    }
}

/// One formal parameter.
///
/// `ty` is the declared (source-level) type; for a varargs parameter it is
/// the element type and [`Param::effective_ty`] yields the array form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub is_varargs: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_varargs: false,
        }
    }

    pub fn varargs(name: impl Into<String>, element: Type) -> Self {
        Self {
            name: name.into(),
            ty: element,
            is_varargs: true,
        }
    }

    #[must_use]
    pub fn effective_ty(&self) -> Type {
        if self.is_varargs {
            Type::array(self.ty.clone())
        } else {
            self.ty.clone()
        }
    }
}

/// An annotation use: the textual name as written (simple or qualified, the
/// leading `@` stripped) plus the resolved annotation type when resolution
/// succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub resolved: Option<ClassId>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if let Some(stripped) = name.strip_prefix('@') {
            name = stripped.to_string();
        }
        Self {
            name,
            resolved: None,
        }
    }

    pub fn resolved(name: impl Into<String>, class: ClassId) -> Self {
        Self {
            resolved: Some(class),
            ..Annotation::new(name)
        }
    }

    /// Textual match against `query`, comparing simple names so that
    /// `Override` and `java.lang.Override` are interchangeable spellings.
    pub fn matches(&self, query: &str) -> bool {
        let name_simple = self.name.rsplit('.').next().unwrap_or(&self.name);
        let query_simple = query.rsplit('.').next().unwrap_or(query);
        name_simple == query_simple
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            visibility: Visibility::Package,
            is_static: false,
            is_final: false,
            is_abstract: false,
        }
    }
}

impl Modifiers {
    pub fn public() -> Self {
        Self {
            visibility: Visibility::Public,
            ..Modifiers::default()
        }
    }

    pub fn protected() -> Self {
        Self {
            visibility: Visibility::Protected,
            ..Modifiers::default()
        }
    }

    pub fn package() -> Self {
        Modifiers::default()
    }

    pub fn private() -> Self {
        Self {
            visibility: Visibility::Private,
            ..Modifiers::default()
        }
    }

    /// Translate JVM access-flag bits into source-level modifiers.
    ///
    /// At most one of the visibility bits may be set (JVMS 4.6); none set
    /// means package access.
    pub fn from_access_flags(flags: u16) -> Result<Modifiers, AccessFlagsError> {
        use access_flags::*;

        let vis_bits = flags & (PUBLIC | PRIVATE | PROTECTED);
        if vis_bits.count_ones() > 1 {
            return Err(AccessFlagsError::ConflictingVisibility { flags });
        }
        let visibility = match vis_bits {
            PUBLIC => Visibility::Public,
            PRIVATE => Visibility::Private,
            PROTECTED => Visibility::Protected,
            _ => Visibility::Package,
        };
        Ok(Modifiers {
            visibility,
            is_static: flags & STATIC != 0,
            is_final: flags & FINAL != 0,
            is_abstract: flags & ABSTRACT != 0,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessFlagsError {
    #[error("conflicting visibility flags {flags:#06x}")]
    ConflictingVisibility { flags: u16 },
}
