//! Type comparators decide whether an argument type fits a signature slot.
use std::fmt::Debug;

use crate::types::Type;

/// Policy used by every typed constructor to accept or reject an argument.
pub trait TypeComparator: Debug + Send + Sync {
    /// Returns `true` if a value of type `argument` may fill a slot typed `signature`.
    fn verify_arg_type(&self, signature: &Type, argument: &Type) -> bool;
}

/// Accepts structurally identical types only.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictTypeComparator;

impl TypeComparator for StrictTypeComparator {
    fn verify_arg_type(&self, signature: &Type, argument: &Type) -> bool {
        signature == argument
    }
}

/// Subtype-tolerant comparator.
///
/// - a primitive is accepted where one of its ancestors is expected;
/// - function domains may be related in either direction, ranges covariantly;
/// - array elements are covariant.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlexibleTypeComparator;

impl FlexibleTypeComparator {
    fn accepts(signature: &Type, argument: &Type) -> bool {
        match (signature, argument) {
            (Type::Primitive(expected), Type::Primitive(found)) => found.is_subtype_of(expected),
            (Type::Function(sig_domain, sig_range), Type::Function(arg_domain, arg_range)) => {
                (Self::accepts(sig_domain, arg_domain) || Self::accepts(arg_domain, sig_domain))
                    && Self::accepts(sig_range, arg_range)
            }
            (Type::Array(expected), Type::Array(found)) => Self::accepts(expected, found),
            _ => false,
        }
    }
}

impl TypeComparator for FlexibleTypeComparator {
    fn verify_arg_type(&self, signature: &Type, argument: &Type) -> bool {
        Self::accepts(signature, argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRepository;

    fn repo() -> TypeRepository {
        let mut repo = TypeRepository::new("e", "t");
        repo.declare_primitive("i", Some("e")).unwrap();
        repo
    }

    #[test]
    fn strict_requires_equality() {
        let repo = repo();
        let e = repo.resolve("e").unwrap();
        let i = repo.resolve("i").unwrap();
        assert!(StrictTypeComparator.verify_arg_type(&e, &e));
        assert!(!StrictTypeComparator.verify_arg_type(&e, &i));
    }

    #[test]
    fn flexible_accepts_subtypes_only_upwards() {
        let repo = repo();
        let e = repo.resolve("e").unwrap();
        let i = repo.resolve("i").unwrap();
        assert!(FlexibleTypeComparator.verify_arg_type(&e, &i));
        assert!(!FlexibleTypeComparator.verify_arg_type(&i, &e));
    }

    #[test]
    fn flexible_relates_function_domains_both_ways() {
        let repo = repo();
        let et = repo.resolve("<e,t>").unwrap();
        let it = repo.resolve("<i,t>").unwrap();
        let ie = repo.resolve("<i,e>").unwrap();
        assert!(FlexibleTypeComparator.verify_arg_type(&et, &it));
        assert!(FlexibleTypeComparator.verify_arg_type(&it, &et));
        assert!(!FlexibleTypeComparator.verify_arg_type(&it, &ie));
    }
}
