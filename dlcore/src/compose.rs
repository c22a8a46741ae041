//! Semantic composer: builds typed logical forms bottom-up over a binary plan.
//!
//! Leaves are built from the lambda templates stamped on their node by the lambda
//! assignment rules (attribute `lambda`, one value per reading):
//!
//! | template | conjunct over the node variable `x`  |
//! |----------|--------------------------------------|
//! | `TYPE`   | `(p_TYPE_{word}:u x)`                |
//! | `EVENT`  | `(p_EVENT_{word}:u x)`               |
//! | `ARG1`   | `(p_EVENT.ENTITY_arg1:b x x)`        |
//! | `EMPTY`  | `(p_EMPTY:u x)`                      |
//!
//! A node without templates contributes `(p_EMPTY:u x)`.
//!
//! A merge combines its head (left) and dependent (right) according to the dependent
//! node's `composition` attribute:
//!
//! - `conjoin` (default): `λx. (and:c (L x) (R x))`;
//! - `existential`: `λx. (exists:ex z (and:c (L x) (R z) (p_EVENT.ENTITY_{link}:b x z)))`,
//!   where `{link}` is the node's `link` attribute or the relation key. This strategy only
//!   applies when the type comparator accepts the dependent's expression as a predicate
//!   over the variable type.
//!
//! When events are expanded, the link predicate becomes
//! `(exists:ex e (and:c (p_EVENT_{link}:u e) (p_EVENT.ENTITY_arg1:b e x) (p_EVENT.ENTITY_arg2:b e z)))`.
//!
//! Every pair of head and dependent readings yields a candidate. Each merge keeps at most
//! [`MAX_READINGS`] distinct candidates (see [`Composer::with_max_readings`]).
use dlformal::prelude::*;
use log::{debug, warn};

use crate::{
    binarize::{Plan, binarize},
    magic::{
        BINARY_TYPE_NAME, COMPOSITION_CONJOIN, COMPOSITION_EXISTENTIAL, COMPOSITION_KEY,
        CONJUNCTION, EXISTENTIAL, LAMBDA_KEY, LINK_KEY, MAX_PLAN_DEPTH, MAX_READINGS,
        PREDICATE_ARG1, PREDICATE_ARG2, PREDICATE_EMPTY, PREDICATE_EVENT_PREFIX,
        PREDICATE_LINK_PREFIX, PREDICATE_TYPE_PREFIX, TEMPLATE_ARG1, TEMPLATE_EMPTY,
        TEMPLATE_EVENT, TEMPLATE_TYPE, UNARY_TYPE_NAME, VARIABLE_TYPE_NAME,
    },
    priority::RelationPriorityTable,
    sentence::relation_key,
    tree::{NodeId, Tree},
    utils::error::{DlError, DlResult},
};

/// Candidate logical forms of a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// Name of the type of the outermost bound variable (`v`), or its structural form
    /// when the repository has no name for it.
    pub variable_type: String,
    /// One expression per distinct reading.
    pub expressions: Vec<Expr>,
}

/// How a dependent combines with its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Conjoin,
    Existential,
}

/// Types and logical constants resolved once against the type repository.
#[derive(Debug, Clone)]
struct Vocabulary {
    variable: Type,
    predicate: Type,
    conjunction: Constant,
    existential: Constant,
}

impl Vocabulary {
    fn resolve(logic: &LogicServices) -> DlResult<Self> {
        let types = logic.types();
        let variable = types
            .get_type(VARIABLE_TYPE_NAME)
            .cloned()
            .ok_or_else(|| LogicError::UnknownType(VARIABLE_TYPE_NAME.to_string()))?;
        for name in [UNARY_TYPE_NAME, BINARY_TYPE_NAME] {
            types
                .get_type(name)
                .ok_or_else(|| LogicError::UnknownType(name.to_string()))?;
        }
        Ok(Self {
            predicate: Type::function(variable.clone(), types.truth_type().clone()),
            variable,
            conjunction: Constant::new(CONJUNCTION.0, CONJUNCTION.1, types)?,
            existential: Constant::new(EXISTENTIAL.0, EXISTENTIAL.1, types)?,
        })
    }
}

/// Builds expressions for binary plans. Holds no per-sentence state.
#[derive(Debug, Clone)]
pub struct Composer<'l> {
    logic: &'l LogicServices,
    expand_events: bool,
    max_readings: usize,
    vocabulary: Vocabulary,
}

impl<'l> Composer<'l> {
    /// Resolve the composition vocabulary (`v`, `u`, `b`, `and:c`, `exists:ex`) in `logic`.
    pub fn new(logic: &'l LogicServices, expand_events: bool) -> DlResult<Self> {
        Ok(Self {
            logic,
            expand_events,
            max_readings: MAX_READINGS,
            vocabulary: Vocabulary::resolve(logic)?,
        })
    }

    /// Keep at most `max_readings` candidates after each merge (at least one).
    pub fn with_max_readings(mut self, max_readings: usize) -> Self {
        self.max_readings = max_readings.max(1);
        self
    }

    pub fn expand_events(&self) -> bool {
        self.expand_events
    }

    /// Compose `plan`, recording leaf expressions on their nodes.
    ///
    /// Plans deeper than [`MAX_PLAN_DEPTH`] are refused before anything is built.
    pub fn compose(&self, tree: &mut Tree, plan: &Plan) -> DlResult<Composition> {
        let depth = plan.depth();
        if depth > MAX_PLAN_DEPTH {
            return Err(DlError::PlanTooDeep {
                depth,
                limit: MAX_PLAN_DEPTH,
            });
        }
        let expressions = self.compose_plan(tree, plan)?;
        let variable = &self.vocabulary.variable;
        let variable_type = self
            .logic
            .types()
            .name_of(variable)
            .map_or_else(|| variable.to_string(), str::to_string);
        Ok(Composition {
            variable_type,
            expressions,
        })
    }

    fn compose_plan(&self, tree: &mut Tree, plan: &Plan) -> DlResult<Vec<Expr>> {
        match plan {
            Plan::Leaf(id) => {
                let readings = self.leaf(tree, *id)?;
                tree.set_semantics(*id, readings.clone());
                Ok(readings)
            }
            Plan::Merge {
                relation,
                head,
                dependent,
            } => {
                let lefts = self.compose_plan(tree, head)?;
                let rights = self.compose_plan(tree, dependent)?;

                let node = dependent.head_node();
                let strategy = self.strategy(tree, node)?;
                let link = match tree.attribute(node, LINK_KEY).first() {
                    Some(link) => link.clone(),
                    None => relation_key(relation),
                };

                let mut candidates: Vec<Expr> =
                    Vec::with_capacity((lefts.len() * rights.len()).min(self.max_readings));
                'product: for left in &lefts {
                    for right in &rights {
                        let combined = match strategy {
                            Strategy::Conjoin => self.conjoin(left, right),
                            Strategy::Existential => self.existential(left, right, &link),
                        }?;
                        if !candidates.contains(&combined) {
                            if candidates.len() == self.max_readings {
                                warn!(
                                    "Readings of {} capped at {}",
                                    tree.word_key(node),
                                    self.max_readings
                                );
                                break 'product;
                            }
                            candidates.push(combined);
                        }
                    }
                }
                debug!(
                    "Composed {} over {} with {:?}: {} candidate(s)",
                    relation_key(relation),
                    tree.word_key(node),
                    strategy,
                    candidates.len()
                );
                Ok(candidates)
            }
        }
    }

    fn strategy(&self, tree: &Tree, id: NodeId) -> DlResult<Strategy> {
        match tree.attribute(id, COMPOSITION_KEY).first().map(String::as_str) {
            None | Some(COMPOSITION_CONJOIN) => Ok(Strategy::Conjoin),
            Some(COMPOSITION_EXISTENTIAL) => Ok(Strategy::Existential),
            Some(other) => Err(DlError::UnknownTemplate {
                node: tree.word_key(id),
                template: format!("{COMPOSITION_KEY}={other}"),
            }),
        }
    }

    fn constant(&self, name: &str, type_name: &str) -> DlResult<Expr> {
        Ok(Constant::new(name, type_name, self.logic.types())?.into())
    }

    fn fresh(&self) -> Variable {
        Variable::fresh(self.vocabulary.variable.clone())
    }

    fn unary(&self, name: &str, x: &Variable) -> DlResult<Expr> {
        let predicate = self.constant(name, UNARY_TYPE_NAME)?;
        Ok(Expr::literal(self.logic, predicate, vec![x.clone().into()])?)
    }

    fn binary(&self, name: &str, x: &Variable, y: &Variable) -> DlResult<Expr> {
        let predicate = self.constant(name, BINARY_TYPE_NAME)?;
        Ok(Expr::literal(
            self.logic,
            predicate,
            vec![x.clone().into(), y.clone().into()],
        )?)
    }

    fn and(&self, conjuncts: Vec<Expr>) -> DlResult<Expr> {
        Ok(Expr::literal(
            self.logic,
            self.vocabulary.conjunction.clone().into(),
            conjuncts,
        )?)
    }

    fn exists(&self, variable: Variable, body: Expr) -> DlResult<Expr> {
        Ok(Expr::quantified(
            self.logic,
            self.vocabulary.existential.clone(),
            variable,
            body,
        )?)
    }

    /// One expression per reading of the node's `lambda` attribute.
    fn leaf(&self, tree: &Tree, id: NodeId) -> DlResult<Vec<Expr>> {
        let readings = tree.attribute(id, LAMBDA_KEY);
        let word = tree.word_key(id);
        let empty = [String::new()];
        let readings = if readings.is_empty() {
            &empty[..]
        } else {
            readings
        };

        let mut expressions: Vec<Expr> = Vec::with_capacity(readings.len());
        for reading in readings {
            let x = self.fresh();
            let mut conjuncts = reading
                .split_whitespace()
                .map(|template| match template {
                    TEMPLATE_TYPE => self.unary(&format!("{PREDICATE_TYPE_PREFIX}{word}"), &x),
                    TEMPLATE_EVENT => self.unary(&format!("{PREDICATE_EVENT_PREFIX}{word}"), &x),
                    TEMPLATE_ARG1 => self.binary(PREDICATE_ARG1, &x, &x),
                    TEMPLATE_EMPTY => self.unary(PREDICATE_EMPTY, &x),
                    other => Err(DlError::UnknownTemplate {
                        node: word.clone(),
                        template: other.to_string(),
                    }),
                })
                .collect::<DlResult<Vec<_>>>()
                .map_err(|error| Self::leaf_error(error, &word))?;

            let body = match conjuncts.len() {
                0 => self.unary(PREDICATE_EMPTY, &x),
                1 => Ok(conjuncts.swap_remove(0)),
                _ => self.and(conjuncts),
            }
            .map_err(|error| Self::leaf_error(error, &word))?;
            let expression = Expr::lambda(x, body);
            if !expressions.contains(&expression) {
                expressions.push(expression);
            }
        }
        Ok(expressions)
    }

    fn leaf_error(error: DlError, node: &str) -> DlError {
        match error {
            DlError::Logic(source) => DlError::LeafType {
                node: node.to_string(),
                source,
            },
            other => other,
        }
    }

    fn composition_error(error: DlError, left: &Expr, right: &Expr) -> DlError {
        match error {
            DlError::Logic(source) => DlError::CompositionType {
                left: left.to_string(),
                right: right.to_string(),
                source,
            },
            other => other,
        }
    }

    /// `λx. (and:c (L x) (R x))`.
    pub fn conjoin(&self, left: &Expr, right: &Expr) -> DlResult<Expr> {
        let build = || -> DlResult<Expr> {
            let x = self.fresh();
            let lx = left.apply(self.logic, x.clone().into())?;
            let rx = right.apply(self.logic, x.clone().into())?;
            Ok(Expr::lambda(x, self.and(vec![lx, rx])?))
        };
        build().map_err(|error| Self::composition_error(error, left, right))
    }

    /// `λx. (exists:ex z (and:c (L x) (R z) link(x, z)))`.
    pub fn existential(&self, left: &Expr, right: &Expr, link: &str) -> DlResult<Expr> {
        let found = right.ty();
        if !self.logic.verify_arg_type(&self.vocabulary.predicate, &found) {
            return Err(DlError::CompositionType {
                left: left.to_string(),
                right: right.to_string(),
                source: LogicError::TypeMismatch {
                    function: format!("{}:{}", EXISTENTIAL.0, EXISTENTIAL.1),
                    argument: right.to_string(),
                    expected: self.vocabulary.predicate.to_string(),
                    found: found.to_string(),
                },
            });
        }

        let build = || -> DlResult<Expr> {
            let x = self.fresh();
            let z = self.fresh();
            let lx = left.apply(self.logic, x.clone().into())?;
            let rz = right.apply(self.logic, z.clone().into())?;
            let link = self.link(link, &x, &z)?;
            let body = self.exists(z, self.and(vec![lx, rz, link])?)?;
            Ok(Expr::lambda(x, body))
        };
        build().map_err(|error| Self::composition_error(error, left, right))
    }

    fn link(&self, link: &str, x: &Variable, z: &Variable) -> DlResult<Expr> {
        if !self.expand_events {
            return self.binary(&format!("{PREDICATE_LINK_PREFIX}{link}"), x, z);
        }
        let e = self.fresh();
        let body = self.and(vec![
            self.unary(&format!("{PREDICATE_EVENT_PREFIX}{link}"), &e)?,
            self.binary(PREDICATE_ARG1, &e, x)?,
            self.binary(PREDICATE_ARG2, &e, z)?,
        ])?;
        self.exists(e, body)
    }
}

/// Binarize `tree` and compose its logical forms.
pub fn compose_semantics(
    tree: &mut Tree,
    priorities: &RelationPriorityTable,
    logic: &LogicServices,
    expand_events: bool,
) -> DlResult<Composition> {
    let plan = binarize(tree, priorities);
    Composer::new(logic, expand_events)?.compose(tree, &plan)
}
