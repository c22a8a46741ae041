//! Typed lambda-calculus expressions.
//!
//! Role
//! - [`Expr`] is an immutable term: variables, typed constants, literals (a predicate
//!   applied to arguments), lambda abstractions and quantifiers.
//! - Every constructor that combines sub-terms type-checks them through
//!   [`LogicServices`], so an ill-typed expression cannot be built.
//! - [`Expr::apply`] beta-reduces when the function is a lambda; substitution keeps
//!   terms in normal form by reducing literals whose predicate becomes a lambda.
//!
//! Equality is alpha-equivalence (see [`equality`]), printing follows the
//! `(lambda $0:<a,e> ...)` syntax (see [`pretty`]).
//!
//! Example
//! ```
//! use dlformal::prelude::*;
//!
//! let mut types = TypeRepository::new("e", "t");
//! types.declare_complex("u", "<e,t>").unwrap();
//! let services = LogicServices::flexible(types);
//!
//! let x = Variable::fresh(services.types().entity_type().clone());
//! let pred = Constant::new("p_dog", "u", services.types()).unwrap();
//! let body = Expr::literal(&services, pred.into(), vec![x.clone().into()]).unwrap();
//! let lam = Expr::lambda(x, body);
//! assert_eq!(lam.to_string(), "(lambda $0:e (p_dog:u $0))");
//! ```
pub mod equality;
pub mod pretty;

use std::sync::Arc;

use strum::EnumIs;

use crate::{
    error::{LogicError, LogicResult},
    services::LogicServices,
    types::{Type, TypeRepository},
    variable::Variable,
};

/// A typed constant such as `p_EVENT_w-1-see:u` or `and:c`.
#[derive(Debug, Clone, Eq, Hash)]
pub struct Constant {
    name: Arc<str>,
    type_name: Arc<str>,
    ty: Type,
}

impl Constant {
    /// Build `name:type_name`, resolving `type_name` in `types`.
    pub fn new(name: &str, type_name: &str, types: &TypeRepository) -> LogicResult<Self> {
        let ty = types.resolve(type_name)?;
        Ok(Self {
            name: name.into(),
            type_name: type_name.into(),
            ty,
        })
    }

    /// A bare numeral, typed with the repository's numeral type.
    pub fn numeral(value: u64, types: &TypeRepository) -> LogicResult<Self> {
        let ty = types
            .numeral_type()
            .cloned()
            .ok_or_else(|| LogicError::UntypedConstant(value.to_string()))?;
        let type_name = types.name_of(&ty).unwrap_or_default();
        Ok(Self {
            name: value.to_string().into(),
            type_name: type_name.into(),
            ty,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type name as written when the constant was built.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

/// A predicate applied to one or more arguments: `(pred a b)`.
#[derive(Debug, Clone)]
pub struct Literal {
    predicate: Box<Expr>,
    arguments: Vec<Expr>,
    ty: Type,
}

impl Literal {
    pub fn predicate(&self) -> &Expr {
        &self.predicate
    }

    pub fn arguments(&self) -> &[Expr] {
        &self.arguments
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

/// `(lambda $x:T body)`.
#[derive(Debug, Clone)]
pub struct Lambda {
    variable: Variable,
    body: Box<Expr>,
}

impl Lambda {
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }
}

/// A quantifier constant binding a variable over a body: `(exists:ex $x:T body)`.
#[derive(Debug, Clone)]
pub struct Quantifier {
    quantifier: Constant,
    variable: Variable,
    body: Box<Expr>,
}

impl Quantifier {
    pub fn quantifier(&self) -> &Constant {
        &self.quantifier
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }
}

/// A typed lambda-calculus term.
#[derive(Debug, Clone, EnumIs)]
pub enum Expr {
    Variable(Variable),
    Constant(Constant),
    Literal(Literal),
    Lambda(Lambda),
    Quantifier(Quantifier),
}

impl From<Variable> for Expr {
    fn from(value: Variable) -> Self {
        Expr::Variable(value)
    }
}

impl From<Constant> for Expr {
    fn from(value: Constant) -> Self {
        Expr::Constant(value)
    }
}

impl Expr {
    /// The type of this expression.
    pub fn ty(&self) -> Type {
        match self {
            Expr::Variable(variable) => variable.ty().clone(),
            Expr::Constant(constant) => constant.ty().clone(),
            Expr::Literal(literal) => literal.ty().clone(),
            Expr::Lambda(lambda) => Type::function(lambda.variable.ty().clone(), lambda.body.ty()),
            Expr::Quantifier(quantifier) => quantifier
                .quantifier
                .ty()
                .range()
                .cloned()
                .unwrap_or_else(|| quantifier.body.ty()),
        }
    }

    /// Lambda abstraction of `body` over `variable`.
    #[inline]
    pub fn lambda(variable: Variable, body: Expr) -> Expr {
        Expr::Lambda(Lambda {
            variable,
            body: Box::new(body),
        })
    }

    /// Apply `predicate` to `arguments`, checking every argument type.
    ///
    /// A lambda predicate is beta-reduced; a literal predicate is extended with the
    /// new arguments. An array domain (such as `<t*,t>`) consumes all remaining
    /// arguments.
    pub fn literal(
        services: &LogicServices,
        predicate: Expr,
        arguments: Vec<Expr>,
    ) -> LogicResult<Expr> {
        if arguments.is_empty() {
            return Err(LogicError::EmptyLiteral(predicate.to_string()));
        }

        match predicate {
            Expr::Lambda(_) => Self::reduce_application(services, predicate, arguments),
            Expr::Literal(inner) => {
                let Literal {
                    predicate,
                    arguments: mut leading,
                    ..
                } = inner;
                leading.extend(arguments);
                Self::literal(services, *predicate, leading)
            }
            predicate => {
                let ty = Self::literal_type(services, &predicate, &arguments)?;
                Ok(Expr::Literal(Literal {
                    predicate: Box::new(predicate),
                    arguments,
                    ty,
                }))
            }
        }
    }

    fn literal_type(
        services: &LogicServices,
        predicate: &Expr,
        arguments: &[Expr],
    ) -> LogicResult<Type> {
        let check = |expected: &Type, argument: &Expr| -> LogicResult<()> {
            let found = argument.ty();
            if services.verify_arg_type(expected, &found) {
                Ok(())
            } else {
                Err(LogicError::TypeMismatch {
                    function: predicate.to_string(),
                    argument: argument.to_string(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                })
            }
        };

        let mut current = predicate.ty();
        let mut remaining = arguments.iter();
        while let Some(argument) = remaining.next() {
            let Type::Function(domain, range) = current else {
                return Err(LogicError::NotAFunction {
                    function: predicate.to_string(),
                    ty: predicate.ty().to_string(),
                    argument: argument.to_string(),
                });
            };

            if let Type::Array(element) = domain.as_ref() {
                for argument in std::iter::once(argument).chain(remaining.by_ref()) {
                    check(element, argument)?;
                }
            } else {
                check(&domain, argument)?;
            }
            current = range.as_ref().clone();
        }
        Ok(current)
    }

    /// Bind `variable` in `body` with `quantifier`, e.g. `exists:ex`.
    ///
    /// The quantifier's type must accept `<variable type, body type>`.
    pub fn quantified(
        services: &LogicServices,
        quantifier: Constant,
        variable: Variable,
        body: Expr,
    ) -> LogicResult<Expr> {
        let abstraction = Type::function(variable.ty().clone(), body.ty());
        let accepted = quantifier
            .ty()
            .domain()
            .is_some_and(|domain| services.verify_arg_type(domain, &abstraction));
        if !accepted {
            return Err(LogicError::InvalidQuantifier {
                quantifier: format!("{}:{}", quantifier.name(), quantifier.type_name()),
                ty: quantifier.ty().to_string(),
                body: abstraction.to_string(),
            });
        }

        Ok(Expr::Quantifier(Quantifier {
            quantifier,
            variable,
            body: Box::new(body),
        }))
    }

    /// Apply this expression to `argument`, beta-reducing lambdas.
    pub fn apply(&self, services: &LogicServices, argument: Expr) -> LogicResult<Expr> {
        match self {
            Expr::Lambda(lambda) => {
                let found = argument.ty();
                if !services.verify_arg_type(lambda.variable.ty(), &found) {
                    return Err(LogicError::TypeMismatch {
                        function: self.to_string(),
                        argument: argument.to_string(),
                        expected: lambda.variable.ty().to_string(),
                        found: found.to_string(),
                    });
                }
                lambda.body.substitute(services, &lambda.variable, &argument)
            }
            _ => Self::literal(services, self.clone(), vec![argument]),
        }
    }

    fn reduce_application(
        services: &LogicServices,
        predicate: Expr,
        arguments: Vec<Expr>,
    ) -> LogicResult<Expr> {
        let mut arguments = arguments.into_iter();
        let mut head = predicate;
        while head.is_lambda() {
            match arguments.next() {
                Some(argument) => head = head.apply(services, argument)?,
                None => return Ok(head),
            }
        }

        let rest: Vec<Expr> = arguments.collect();
        if rest.is_empty() {
            Ok(head)
        } else {
            Self::literal(services, head, rest)
        }
    }

    /// Replace every free occurrence of `variable` with `replacement`.
    ///
    /// Literals whose predicate turns into a lambda are reduced on the way out.
    pub fn substitute(
        &self,
        services: &LogicServices,
        variable: &Variable,
        replacement: &Expr,
    ) -> LogicResult<Expr> {
        Ok(match self {
            Expr::Variable(v) if v == variable => replacement.clone(),
            Expr::Variable(_) | Expr::Constant(_) => self.clone(),
            Expr::Lambda(lambda) if lambda.variable == *variable => self.clone(),
            Expr::Lambda(lambda) => Expr::lambda(
                lambda.variable.clone(),
                lambda.body.substitute(services, variable, replacement)?,
            ),
            Expr::Quantifier(quantifier) if quantifier.variable == *variable => self.clone(),
            Expr::Quantifier(quantifier) => Expr::Quantifier(Quantifier {
                quantifier: quantifier.quantifier.clone(),
                variable: quantifier.variable.clone(),
                body: Box::new(quantifier.body.substitute(services, variable, replacement)?),
            }),
            Expr::Literal(literal) => {
                let predicate = literal.predicate.substitute(services, variable, replacement)?;
                let arguments = literal
                    .arguments
                    .iter()
                    .map(|argument| argument.substitute(services, variable, replacement))
                    .collect::<LogicResult<Vec<_>>>()?;
                Self::literal(services, predicate, arguments)?
            }
        })
    }

    /// The variable bound at the top of this expression, if it is a lambda or quantifier.
    pub fn bound_variable(&self) -> Option<&Variable> {
        match self {
            Expr::Lambda(lambda) => Some(&lambda.variable),
            Expr::Quantifier(quantifier) => Some(&quantifier.variable),
            _ => None,
        }
    }
}
