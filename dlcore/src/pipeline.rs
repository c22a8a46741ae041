//! Per-sentence processing: build, rewrite, binarize, compose.
use log::{debug, warn};

use crate::{
    binarize::binarize,
    compose::{Composer, Composition},
    config::SemanticResources,
    rewrite::apply_rule_group_sequence,
    sentence::Sentence,
    utils::error::DlResult,
};

/// Everything produced for one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSemantics {
    pub text: String,
    /// The tree after structural rewriting.
    pub tree: String,
    /// The binary composition plan.
    pub plan: String,
    pub composition: Composition,
}

/// Runs sentences through the loaded resources. Only reads the resources, so one
/// pipeline (or many) may serve any number of threads.
#[derive(Debug, Clone)]
pub struct Pipeline<'r> {
    resources: &'r SemanticResources,
    composer: Composer<'r>,
}

impl<'r> Pipeline<'r> {
    pub fn new(resources: &'r SemanticResources, expand_events: bool) -> DlResult<Self> {
        Ok(Self {
            resources,
            composer: Composer::new(&resources.logic, expand_events)?,
        })
    }

    pub fn resources(&self) -> &SemanticResources {
        self.resources
    }

    /// Process one sentence. The sentence's tree is owned by this call.
    pub fn process(&self, sentence: &Sentence) -> DlResult<SentenceSemantics> {
        let mut tree = sentence.tree()?;

        apply_rule_group_sequence(&self.resources.structural, &mut tree)?;
        let tree_string = tree.to_string();

        apply_rule_group_sequence(&self.resources.lambda, &mut tree)?;

        let plan = binarize(&tree, &self.resources.priorities);
        let composition = self.composer.compose(&mut tree, &plan)?;
        let plan_string = plan.display(&tree).to_string();

        debug!(
            "'{}': {} candidate expression(s)",
            sentence.text,
            composition.expressions.len()
        );
        Ok(SentenceSemantics {
            text: sentence.text.clone(),
            tree: tree_string,
            plan: plan_string,
            composition,
        })
    }

    /// Process sentences in order. A failing sentence is logged and reported in its slot;
    /// the following sentences are processed normally.
    pub fn process_batch<'s, I>(&self, sentences: I) -> Vec<DlResult<SentenceSemantics>>
    where
        I: IntoIterator<Item = &'s Sentence>,
    {
        sentences
            .into_iter()
            .enumerate()
            .map(|(position, sentence)| {
                let result = self.process(sentence);
                if let Err(error) = &result {
                    warn!("Skipping sentence {} ('{}'): {}", position + 1, sentence.text, error);
                }
                result
            })
            .collect()
    }
}
