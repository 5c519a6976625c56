//! Supertype-graph walks.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{canonicalize_named, substitute, ClassId, ClassKind, ClassType, Type, TypeEnv, TypeVarId};

/// Return `ty` viewed as `target` by walking the supertype graph and applying
/// type argument substitution along the way.
///
/// This never panics: missing class metadata simply returns `None`.
///
/// Example: `ArrayList<String>` viewed as `Collection` returns
/// `Collection<String>`. A raw use of a generic class cannot recover type
/// arguments for its supertypes, so rawness is preserved while walking; the
/// returned view of a generic `target` then has no type arguments, which
/// callers read as "instantiated raw".
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    let ty = canonicalize_named(env, ty);

    if let Type::Array(_) = ty {
        let wk = env.well_known();
        if target == wk.object || target == wk.cloneable || target == wk.serializable {
            return Some(Type::class(target, vec![]));
        }
        return None;
    }

    let Type::Class(ClassType { def, args }) = ty else {
        return None;
    };

    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
    queue.push_back(Type::class(def, args));

    while let Some(current) = queue.pop_front() {
        let Type::Class(ClassType { def, args }) = current.clone() else {
            continue;
        };
        if !seen.insert((def, args.clone())) {
            continue;
        }

        if def == target {
            return Some(current);
        }

        let Some(class_def) = env.class(def) else {
            continue;
        };

        let raw = args.is_empty() && !class_def.type_params.is_empty();

        if raw {
            if let Some(sc) = &class_def.super_class {
                if let Some(sc) = raw_class_type(env, sc) {
                    queue.push_back(sc);
                }
            }
            for iface in &class_def.interfaces {
                if let Some(iface) = raw_class_type(env, iface) {
                    queue.push_back(iface);
                }
            }
            if class_def.kind == ClassKind::Interface {
                queue.push_back(Type::class(env.well_known().object, vec![]));
            }
            continue;
        }

        // Apply the current instantiation's substitution to its supertypes.
        let mut subst: HashMap<TypeVarId, Type> =
            HashMap::with_capacity(class_def.type_params.len());
        for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
            subst.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
        }

        if let Some(sc) = &class_def.super_class {
            queue.push_back(canonicalize_named(env, &substitute(sc, &subst)));
        }
        for iface in &class_def.interfaces {
            queue.push_back(canonicalize_named(env, &substitute(iface, &subst)));
        }

        // In Java, every interface implicitly has `Object` as a supertype
        // (JLS 4.10.2).
        if class_def.kind == ClassKind::Interface {
            queue.push_back(Type::class(env.well_known().object, vec![]));
        }
    }

    None
}

fn raw_class_type(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match canonicalize_named(env, ty) {
        Type::Class(ClassType { def, .. }) => Some(Type::class(def, vec![])),
        _ => None,
    }
}
