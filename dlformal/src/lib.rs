//! Dlformal: typed lambda-calculus terms for dependency-based logical forms.
//!
//! The crate provides the logical language in which sentence meanings are written:
//!
//! - a small type system (primitives with subtyping, functions `<a,b>`, arrays `t*`),
//!   loaded into a [`TypeRepository`](types::TypeRepository) from a TOML file;
//! - immutable expressions ([`Expr`](expr::Expr)) whose constructors type-check every
//!   argument through a pluggable [`TypeComparator`](types::comparator::TypeComparator);
//! - beta-reducing application, alpha-equivalence as `==`;
//! - a colored RcDoc printer and a chumsky reader that round-trip the same syntax.
//!
//! Nothing here is global: a [`LogicServices`](services::LogicServices) value carries the
//! repository and comparator and is passed explicitly to every constructor.
//!
//! Example
//! ```
//! use dlformal::prelude::*;
//!
//! let mut types = TypeRepository::new("e", "t");
//! types.declare_complex("u", "<e,t>").unwrap();
//! types.declare_complex("c", "<t*,t>").unwrap();
//! let services = LogicServices::flexible(types);
//!
//! let f = services.read("(lambda $x:e (and:c (p_dog:u $x) (p_big:u $x)))").unwrap();
//! let g = services.read("(lambda $y:e (and:c (p_dog:u $y) (p_big:u $y)))").unwrap();
//! assert_eq!(f, g);
//!
//! let rex = Constant::new("rex", "e", services.types()).unwrap();
//! let applied = f.apply(&services, rex.into()).unwrap();
//! assert_eq!(applied.to_string(), "(and:c (p_dog:u rex:e) (p_big:u rex:e))");
//! ```

/// Error type shared by every fallible operation of the crate.
pub mod error;
/// Expressions: constructors, application, equality and printing.
pub mod expr;
/// Reader for the printed expression syntax.
pub mod parser;
/// Explicit context bundling types and the type comparator.
pub mod services;
/// Types, type repositories and comparators.
pub mod types;
/// Typed variables with unique identities.
pub mod variable;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::error::{LogicError, LogicResult};
    pub use crate::expr::{Constant, Expr, Lambda, Literal, Quantifier, pretty::PrettyExpr};
    pub use crate::services::LogicServices;
    pub use crate::types::{
        PrimitiveType, Type, TypeRepository,
        comparator::{FlexibleTypeComparator, StrictTypeComparator, TypeComparator},
    };
    pub use crate::variable::Variable;
}
