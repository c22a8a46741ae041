//! Sentence records as produced by a dependency parser.
//!
//! One record per sentence, in JSON:
//!
//! ```json
//! {"sentence": "Yahoo!",
//!  "words": [{"word": "Yahoo", "lemma": "yahoo", "pos": "PROPN", "ner": "ORGANIZATION",
//!             "dep": "root", "head": 0, "index": 1},
//!            {"word": "!", "lemma": "!", "pos": "PUNCT", "ner": "O",
//!             "index": 2, "head": 1, "dep": "punct", "sentEnd": true}]}
//! ```
use serde::{Deserialize, Serialize};

use crate::{tree::Tree, utils::error::DlResult};

fn default_ner() -> String {
    "O".to_string()
}

/// One word of a sentence with its annotations. Never mutated once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 1-based position in the sentence.
    pub index: usize,
    pub word: String,
    pub lemma: String,
    pub pos: String,
    #[serde(default = "default_ner")]
    pub ner: String,
    /// Index of the governing token, `0` for the sentence root.
    pub head: usize,
    pub dep: String,
    #[serde(rename = "sentEnd", default)]
    pub sent_end: bool,
}

impl Token {
    /// `w-{index}-{lemma}`, with the lemma lowercased.
    pub fn word_key(&self) -> String {
        format!("w-{}-{}", self.index, self.lemma.to_lowercase())
    }
}

/// `l-{relation}`.
pub fn relation_key(relation: &str) -> String {
    format!("l-{relation}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(rename = "sentence", default)]
    pub text: String,
    pub words: Vec<Token>,
}

impl Sentence {
    /// Parse one JSON sentence record.
    pub fn from_json(record: &str) -> DlResult<Self> {
        Ok(serde_json::from_str(record)?)
    }

    /// Build the dependency tree of this sentence.
    pub fn tree(&self) -> DlResult<Tree> {
        Ok(Tree::from_tokens(&self.words)?)
    }
}
