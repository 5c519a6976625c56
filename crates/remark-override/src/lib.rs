//! Automatic `@Override` marker maintenance.
//!
//! [`OverrideResolver`] decides, for a method declared in a class, whether it
//! overrides (or implements) an accessible method inherited from the
//! superclass or from an implemented interface, and appends the `@Override`
//! marker annotation to the declaration when the answer is yes and no marker
//! is present. The decision is a pure read over an already-built
//! [`TypeEnv`]; the one mutation is the annotation append.
//!
//! Two behaviors are deliberate and easy to mistake for bugs:
//!
//! - A class without a resolvable superclass is never analyzed at all, even
//!   when one of its interfaces declares an exactly matching method. The
//!   superclass is the head of the search and its absence short-circuits the
//!   whole walk.
//! - When a generic ancestor is extended *raw*, a type-variable parameter
//!   matches only if every declared bound of the variable is assignable into
//!   the argument's type (the bound qualifies as a subtype of the argument),
//!   not the other way around.

use remark_hir::{Annotation, CompilationUnit, MethodDecl, TypeDecl};
use remark_types::{
    canonicalize_named, instantiate_as_supertype, is_subtype, ClassDef, ClassId, ClassType,
    MethodDef, Type, TypeEnv, Visibility,
};

/// Qualified name of the marker annotation this resolver maintains.
pub const OVERRIDE_ANNOTATION: &str = "java.lang.Override";

/// Optional lower-level signal that a method's compiled form already carries
/// the marker. Consulted as an additional early exit only, never as the sole
/// source of truth.
pub trait CompiledOverrideIndex {
    fn has_override(&self, class: ClassId, name: &str, params: &[Type]) -> bool;
}

pub struct OverrideResolver<'env> {
    env: &'env dyn TypeEnv,
    compiled: Option<&'env dyn CompiledOverrideIndex>,
}

impl<'env> OverrideResolver<'env> {
    pub fn new(env: &'env dyn TypeEnv) -> Self {
        Self {
            env,
            compiled: None,
        }
    }

    pub fn with_compiled_index(
        env: &'env dyn TypeEnv,
        compiled: &'env dyn CompiledOverrideIndex,
    ) -> Self {
        Self {
            env,
            compiled: Some(compiled),
        }
    }

    /// Evaluate every method declaration in `unit` in tree order, nested
    /// types included, appending the marker where it is missing. Running the
    /// pass a second time is a no-op.
    pub fn annotate_unit(&self, unit: &mut CompilationUnit) {
        for decl in &mut unit.types {
            self.annotate_type(decl);
        }
    }

    fn annotate_type(&self, decl: &mut TypeDecl) {
        let binding = decl.binding;
        for method in &mut decl.methods {
            self.resolve(binding, method);
        }
        for nested in &mut decl.nested_types {
            self.annotate_type(nested);
        }
    }

    /// Evaluate one method declaration, appending the marker annotation on a
    /// positive decision. `declaring` is the resolved class that owns the
    /// declaration; `None` means the owner could not be resolved and the
    /// method is skipped.
    pub fn resolve(&self, declaring: Option<ClassId>, method: &mut MethodDecl) {
        if method.modifiers.is_static || method.modifiers.visibility == Visibility::Private {
            return;
        }
        if self.has_override_annotation(method) {
            return;
        }
        let Some(declaring) = declaring else {
            tracing::debug!(
                target: "remark.override",
                method = %method.name,
                "declaring class unresolved, skipping"
            );
            return;
        };

        let args: Vec<Type> = method
            .params
            .iter()
            .map(|p| canonicalize_named(self.env, &p.effective_ty()))
            .collect();

        if let Some(compiled) = self.compiled {
            if compiled.has_override(declaring, &method.name, &args) {
                return;
            }
        }

        if self.overrides_inherited_method(declaring, method, &args) {
            tracing::debug!(
                target: "remark.override",
                method = %method.name,
                class = ?declaring,
                "attaching override marker"
            );
            method.annotations.push(Annotation::resolved(
                "Override",
                self.env.well_known().override_marker,
            ));
        }
    }

    /// Both evidence forms count: a marker annotation whose resolved type is
    /// `java.lang.Override`, or, when resolution failed, one whose literal
    /// name matches textually.
    fn has_override_annotation(&self, method: &MethodDecl) -> bool {
        let marker = self.env.well_known().override_marker;
        method.annotations.iter().any(|ann| match ann.resolved {
            Some(class) => class == marker,
            None => ann.matches(OVERRIDE_ANNOTATION),
        })
    }

    fn overrides_inherited_method(
        &self,
        declaring: ClassId,
        method: &MethodDecl,
        args: &[Type],
    ) -> bool {
        if args.iter().any(Type::is_errorish) {
            tracing::trace!(
                target: "remark.override",
                method = %method.name,
                "unresolved parameter type, skipping"
            );
            return false;
        }
        let Some(declaring_def) = self.env.class(declaring) else {
            return false;
        };
        // Superclass absence short-circuits the whole search, interfaces
        // included (see the crate docs).
        if declaring_def.super_class.is_none() {
            return false;
        }

        let declaring_ty = Type::class(
            declaring,
            declaring_def
                .type_params
                .iter()
                .copied()
                .map(Type::TypeVar)
                .collect(),
        );

        let mut scopes: Vec<Type> = Vec::with_capacity(1 + declaring_def.interfaces.len());
        scopes.extend(declaring_def.super_class.clone());
        scopes.extend(declaring_def.interfaces.iter().cloned());

        for scope in &scopes {
            let Type::Class(ClassType { def: scope_id, .. }) = canonicalize_named(self.env, scope)
            else {
                continue;
            };
            let Some(scope_def) = self.env.class(scope_id) else {
                continue;
            };

            let Some(candidate) = find_candidate(scope_def, &method.name, args.len()) else {
                continue;
            };
            // A candidate the declaring class cannot see is the same as no
            // candidate: the walk moves on to the next scope.
            if !matches!(
                candidate.visibility,
                Visibility::Public | Visibility::Protected
            ) {
                continue;
            }

            let view = instantiate_as_supertype(self.env, &declaring_ty, scope_id);
            if self.signature_matches(args, candidate, scope_def, view.as_ref()) {
                return true;
            }
            // A shape-incompatible candidate here does not preclude a later
            // scope from supplying the real match.
        }
        false
    }

    fn signature_matches(
        &self,
        args: &[Type],
        candidate: &MethodDef,
        scope_def: &ClassDef,
        view: Option<&Type>,
    ) -> bool {
        debug_assert_eq!(args.len(), candidate.params.len());
        // Bound checks apply only when the declaring class instantiates a
        // generic scope raw; with explicit type arguments (or no view at
        // all) erasure does not govern and variables match permissively.
        let raw_scope = match view {
            Some(Type::Class(ClassType { args, .. })) => {
                args.is_empty() && !scope_def.type_params.is_empty()
            }
            _ => false,
        };
        args.iter()
            .zip(&candidate.params)
            .all(|(arg, param)| self.position_compatible(arg, param, scope_def, raw_scope))
    }

    fn position_compatible(
        &self,
        arg: &Type,
        param: &Type,
        scope_def: &ClassDef,
        raw_scope: bool,
    ) -> bool {
        let param = canonicalize_named(self.env, param);
        match &param {
            // Exact nominal equality. Raw signatures compare by class, so
            // type arguments do not participate; a subtype or supertype at
            // the same position is not a match.
            Type::Class(p) => matches!(arg, Type::Class(a) if a.def == p.def),
            Type::Named(p_name) => matches!(arg, Type::Named(a_name) if a_name == p_name),
            Type::Primitive(_) | Type::Void => *arg == param,
            Type::Array(p_element) => match arg {
                Type::Array(a_element) => {
                    self.position_compatible(a_element, p_element, scope_def, raw_scope)
                }
                _ => false,
            },
            Type::TypeVar(v) => {
                if !raw_scope || !scope_def.type_params.contains(v) {
                    return true;
                }
                let Some(tp) = self.env.type_param(*v) else {
                    return true;
                };
                tp.upper_bounds
                    .iter()
                    .all(|bound| is_subtype(self.env, bound, arg))
            }
            Type::Unknown | Type::Error => false,
        }
    }
}

/// First declared method with a matching name and arity, in declaration
/// order.
fn find_candidate<'a>(scope: &'a ClassDef, name: &str, arity: usize) -> Option<&'a MethodDef> {
    scope
        .methods
        .iter()
        .find(|m| m.name == name && m.params.len() == arity)
}
