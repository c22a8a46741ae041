//! Attribute value templates such as `"{rel}.{child:case}"`.
use std::fmt;

use serde::Deserialize;

use crate::{
    sentence::relation_key,
    tree::{NodeId, Tree},
    utils::error::{DlError, DlResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    /// Word key of the node, `w-3-india`.
    Word,
    Lemma,
    Pos,
    /// Relation key of the node, `l-nmod`.
    Relation,
    /// Word key of the first child with the given relation.
    Child(String),
}

/// A string with `{...}` placeholders resolved against the node a rule matched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ValueTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl ValueTemplate {
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let close = rest[open..]
                .find('}')
                .map(|offset| open + offset)
                .ok_or_else(|| format!("unterminated placeholder in `{source}`"))?;
            let segment = match &rest[open + 1..close] {
                "word" => Segment::Word,
                "lemma" => Segment::Lemma,
                "pos" => Segment::Pos,
                "rel" => Segment::Relation,
                other => match other.strip_prefix("child:") {
                    Some(relation) if !relation.is_empty() => Segment::Child(relation.to_string()),
                    _ => return Err(format!("unknown placeholder `{{{other}}}` in `{source}`")),
                },
            };
            segments.push(segment);
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Expand the template on `id`; `rule` only labels errors.
    pub fn render(&self, tree: &Tree, id: NodeId, rule: &str) -> DlResult<String> {
        let node = tree.node(id);
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Word => out.push_str(&node.token().word_key()),
                Segment::Lemma => out.push_str(&node.token().lemma),
                Segment::Pos => out.push_str(&node.token().pos),
                Segment::Relation => out.push_str(&relation_key(node.relation())),
                Segment::Child(relation) => {
                    let child = node
                        .children()
                        .iter()
                        .find(|&&child| tree.relation(child) == relation.as_str())
                        .ok_or_else(|| DlError::UnresolvedPlaceholder {
                            rule: rule.to_string(),
                            placeholder: format!("child:{relation}"),
                        })?;
                    out.push_str(&tree.word_key(*child));
                }
            }
        }
        Ok(out)
    }
}

impl TryFrom<String> for ValueTemplate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for ValueTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
