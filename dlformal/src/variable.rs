//! Typed variables with process-unique identities.
//!
//! Variables never store a name. The printer numbers them (`$0`, `$1`, ...) in the
//! order they are bound, and equality of expressions is decided up to renaming of
//! bound variables, so identities only need to be distinct.
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::Type;

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(0);

/// A typed variable, either bound by a lambda/quantifier or free.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    id: u64,
    ty: Type,
}

impl Variable {
    /// Mint a variable distinct from every variable created before.
    pub fn fresh(ty: Type) -> Self {
        Self {
            id: NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed),
            ty,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}
