//! Rule-driven transformation of dependency trees into typed logical forms.
//!
//! A sentence goes through four stages:
//!
//! 1. [`tree`]: the flat token list becomes a rooted, ordered tree;
//! 2. [`rewrite`]: structural rule groups reshape the tree, then lambda-assignment rule
//!    groups stamp each node with templates and composition hints;
//! 3. [`binarize`]: each node's children are folded into a binary plan by relation
//!    priority ([`priority`]);
//! 4. [`compose`]: the plan is composed bottom-up into one or more `dlformal` expressions.
//!
//! Rules, priorities and types are loaded once into [`config::SemanticResources`] and
//! shared read-only; [`pipeline::Pipeline`] runs the stages for one sentence at a time.
//!
//! Example
//! ```
//! use dlcore::{config::SemanticResources, pipeline::Pipeline, sentence::Sentence};
//!
//! let resources = SemanticResources::bundled().unwrap();
//! let pipeline = Pipeline::new(&resources, false).unwrap();
//! let sentence = Sentence::from_json(
//!     r#"{"sentence":"Yahoo!","words":[
//!         {"word":"Yahoo","lemma":"yahoo","pos":"PROPN","dep":"root","head":0,"index":1},
//!         {"word":"!","lemma":"!","pos":"PUNCT","index":2,"head":1,"dep":"punct"}]}"#,
//! )
//! .unwrap();
//!
//! let semantics = pipeline.process(&sentence).unwrap();
//! assert_eq!(semantics.plan, "(l-punct w-1-yahoo w-2-!)");
//! assert_eq!(semantics.composition.variable_type, "v");
//! ```

pub mod binarize;
pub mod compose;
pub mod config;
pub mod magic;
pub mod pipeline;
pub mod priority;
pub mod rewrite;
pub mod rules;
pub mod sentence;
pub mod tree;
pub mod utils;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::binarize::{Plan, binarize};
    pub use crate::compose::{Composer, Composition, compose_semantics};
    pub use crate::config::{ComparatorChoice, SemanticResources, default_data_dir};
    pub use crate::pipeline::{Pipeline, SentenceSemantics};
    pub use crate::priority::RelationPriorityTable;
    pub use crate::rewrite::apply_rule_group_sequence;
    pub use crate::rules::{Rule, RuleGroup, RuleGroupSequence};
    pub use crate::sentence::{Sentence, Token};
    pub use crate::tree::{NodeId, Tree};
    pub use crate::utils::error::{DlError, DlResult, MalformedInput};
}
