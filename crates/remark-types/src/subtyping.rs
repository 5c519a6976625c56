//! Nominal subtyping and substitution over the closed type model.

use std::collections::{HashMap, HashSet};

use crate::{ClassType, Type, TypeEnv, TypeVarId};

/// Upgrade `Named` references to interned `Class` types where the store
/// knows the name, recursively through arrays and type arguments. Unknown
/// names are kept as spelled.
pub fn canonicalize_named(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Named(name) => match env.lookup_class(name) {
            Some(id) => Type::class(id, vec![]),
            None => ty.clone(),
        },
        Type::Array(element) => Type::array(canonicalize_named(env, element)),
        Type::Class(ClassType { def, args }) => Type::class(
            *def,
            args.iter().map(|arg| canonicalize_named(env, arg)).collect(),
        ),
        _ => ty.clone(),
    }
}

/// Replace type variables in `ty` according to `subst`. Variables without a
/// mapping are kept.
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Array(element) => Type::array(substitute(element, subst)),
        Type::Class(ClassType { def, args }) => Type::class(
            *def,
            args.iter().map(|arg| substitute(arg, subst)).collect(),
        ),
        _ => ty.clone(),
    }
}

/// Nominal subtype test: is `a` assignable to `b`?
///
/// Class-to-class questions walk the supertype graph with type-argument
/// substitution applied along the way; a raw use on either side matches any
/// instantiation of the same class, otherwise type arguments are invariant.
/// Arrays are covariant and are subtypes of `Object`, `Cloneable` and
/// `Serializable`. A type variable is a subtype of `b` if any of its upper
/// bounds is. `Unknown`/`Error` are subtypes of nothing.
pub fn is_subtype(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    let mut seen_type_vars = HashSet::new();
    inner(env, a, b, &mut seen_type_vars)
}

fn inner(env: &dyn TypeEnv, a: &Type, b: &Type, seen_type_vars: &mut HashSet<TypeVarId>) -> bool {
    let a = canonicalize_named(env, a);
    let b = canonicalize_named(env, b);
    if a == b {
        return true;
    }
    if a.is_errorish() || b.is_errorish() {
        return false;
    }

    match (&a, &b) {
        (Type::TypeVar(id), _) => {
            // Malformed stores can declare cyclic variable bounds; guard
            // against re-entering the same variable.
            if !seen_type_vars.insert(*id) {
                return false;
            }
            let holds = env.type_param(*id).is_some_and(|tp| {
                tp.upper_bounds
                    .iter()
                    .any(|bound| inner(env, bound, &b, seen_type_vars))
            });
            seen_type_vars.remove(id);
            holds
        }
        (Type::Array(a_element), Type::Array(b_element)) => {
            inner(env, a_element, b_element, seen_type_vars)
        }
        (Type::Array(_), Type::Class(ClassType { def, .. })) => {
            let wk = env.well_known();
            *def == wk.object || *def == wk.cloneable || *def == wk.serializable
        }
        (Type::Class(_), Type::Class(target)) => match crate::instantiate_as_supertype(env, &a, target.def) {
            Some(Type::Class(view)) => {
                view.args.is_empty() || target.args.is_empty() || view.args == target.args
            }
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStore;

    #[test]
    fn canonicalize_interns_known_names() {
        let store = TypeStore::with_minimal_jdk();
        let string = store.well_known().string;

        let named = Type::Named("java.lang.String".to_string());
        assert_eq!(canonicalize_named(&store, &named), Type::class(string, vec![]));

        let unknown = Type::Named("com.example.Missing".to_string());
        assert_eq!(canonicalize_named(&store, &unknown), unknown);
    }

    #[test]
    fn substitute_reaches_through_arrays_and_arguments() {
        let mut store = TypeStore::with_minimal_jdk();
        let object = Type::class(store.well_known().object, vec![]);
        let string = Type::class(store.well_known().string, vec![]);
        let t = store.add_type_param("T", vec![object]);
        let list = store.class_id("java.util.List").expect("List in minimal JDK");

        let mut subst = HashMap::new();
        subst.insert(t, string.clone());

        let ty = Type::class(list, vec![Type::array(Type::TypeVar(t))]);
        assert_eq!(
            substitute(&ty, &subst),
            Type::class(list, vec![Type::array(string)])
        );
    }

    #[test]
    fn type_arguments_are_invariant() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let object = Type::class(store.well_known().object, vec![]);

        let list_string = Type::class(list, vec![string]);
        let list_object = Type::class(list, vec![object]);
        assert!(!is_subtype(&store, &list_string, &list_object));
        assert!(!is_subtype(&store, &list_object, &list_string));
    }

    #[test]
    fn raw_uses_match_any_instantiation() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let collection = store.class_id("java.util.Collection").unwrap();
        let string = Type::class(store.well_known().string, vec![]);

        let list_raw = Type::class(list, vec![]);
        let collection_string = Type::class(collection, vec![string]);
        assert!(is_subtype(&store, &list_raw, &collection_string));
    }
}
