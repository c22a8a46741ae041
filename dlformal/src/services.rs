//! The explicit logic context shared by every typed constructor.
use crate::{
    error::LogicResult,
    expr::Expr,
    types::{
        Type, TypeRepository,
        comparator::{FlexibleTypeComparator, TypeComparator},
    },
};

/// Immutable bundle of a [`TypeRepository`] and the [`TypeComparator`] used to check
/// argument types. It is built once, then passed by reference to every call that
/// constructs or reads expressions.
#[derive(Debug)]
pub struct LogicServices {
    types: TypeRepository,
    comparator: Box<dyn TypeComparator>,
}

impl LogicServices {
    pub fn new(types: TypeRepository, comparator: impl TypeComparator + 'static) -> Self {
        Self {
            types,
            comparator: Box::new(comparator),
        }
    }

    /// Services using the [`FlexibleTypeComparator`].
    pub fn flexible(types: TypeRepository) -> Self {
        Self::new(types, FlexibleTypeComparator)
    }

    pub fn types(&self) -> &TypeRepository {
        &self.types
    }

    pub fn comparator(&self) -> &dyn TypeComparator {
        self.comparator.as_ref()
    }

    #[inline]
    pub fn verify_arg_type(&self, signature: &Type, argument: &Type) -> bool {
        self.comparator.verify_arg_type(signature, argument)
    }

    /// Read an expression written in the printer's syntax.
    pub fn read(&self, source: &str) -> LogicResult<Expr> {
        crate::parser::read(self, source)
    }
}
