//! Alpha-equivalence.
//!
//! Two expressions are equal when they differ at most in the identity of their bound
//! variables: binders are matched by position, free variables by identity, constants
//! by name and type, and variable types structurally.
use crate::expr::Expr;

fn alpha_equivalent(lhs: &Expr, rhs: &Expr, bindings: &mut Vec<(u64, u64)>) -> bool {
    match (lhs, rhs) {
        (Expr::Variable(x), Expr::Variable(y)) => {
            // Innermost binder wins; a variable bound on one side only never matches.
            for &(left, right) in bindings.iter().rev() {
                if left == x.id() || right == y.id() {
                    return left == x.id() && right == y.id() && x.ty() == y.ty();
                }
            }
            x == y
        }
        (Expr::Constant(x), Expr::Constant(y)) => x == y,
        (Expr::Literal(x), Expr::Literal(y)) => {
            x.arguments().len() == y.arguments().len()
                && alpha_equivalent(x.predicate(), y.predicate(), bindings)
                && x
                    .arguments()
                    .iter()
                    .zip(y.arguments())
                    .all(|(a, b)| alpha_equivalent(a, b, bindings))
        }
        (Expr::Lambda(x), Expr::Lambda(y)) => {
            if x.variable().ty() != y.variable().ty() {
                return false;
            }
            bindings.push((x.variable().id(), y.variable().id()));
            let equal = alpha_equivalent(x.body(), y.body(), bindings);
            bindings.pop();
            equal
        }
        (Expr::Quantifier(x), Expr::Quantifier(y)) => {
            if x.quantifier() != y.quantifier() || x.variable().ty() != y.variable().ty() {
                return false;
            }
            bindings.push((x.variable().id(), y.variable().id()));
            let equal = alpha_equivalent(x.body(), y.body(), bindings);
            bindings.pop();
            equal
        }
        _ => false,
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        alpha_equivalent(self, other, &mut Vec::new())
    }
}

impl Eq for Expr {}
