//! Rule model: node patterns, conditions, actions, rules and rule groups.
//!
//! Rules are data. A [`Rule`] matches a node when every [`Condition`] holds on the node
//! and its immediate surroundings; its [`Action`]s are then applied in order by the
//! rewrite engine (see [`crate::rewrite`]). Rule files are TOML:
//!
//! ```toml
//! [[group]]
//! name = "lambda-assignment"
//!
//! [[group.rule]]
//! name = "nominal"
//! when = [{ kind = "node", pattern = { pos = "NOUN|PROPN" } }]
//! then = [{ kind = "set-attribute", target = "node", key = "lambda", value = "TYPE EVENT ARG1" }]
//! ```
use serde::Deserialize;

use crate::tree::{NodeId, Tree};

pub mod loader;
pub mod template;

pub use template::ValueTemplate;

/// Accepted values of one pattern field, written `a|b|c`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct Alternatives(Vec<String>);

impl Alternatives {
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|alternative| alternative == value)
    }
}

impl From<String> for Alternatives {
    fn from(value: String) -> Self {
        Alternatives(value.split('|').map(|s| s.trim().to_string()).collect())
    }
}

/// Constraints on a single node; absent fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodePattern {
    #[serde(default)]
    pub relation: Option<Alternatives>,
    #[serde(default)]
    pub pos: Option<Alternatives>,
    #[serde(default)]
    pub lemma: Option<Alternatives>,
    #[serde(default)]
    pub word: Option<Alternatives>,
}

impl NodePattern {
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        let node = tree.node(id);
        let field = |alternatives: &Option<Alternatives>, value: &str| {
            alternatives.as_ref().is_none_or(|a| a.contains(value))
        };
        field(&self.relation, node.relation())
            && field(&self.pos, &node.token().pos)
            && field(&self.lemma, &node.token().lemma)
            && field(&self.word, &node.token().word)
    }

    /// First child of `id` matching this pattern.
    pub fn find_child(&self, tree: &Tree, id: NodeId) -> Option<NodeId> {
        tree.children(id)
            .iter()
            .copied()
            .find(|&child| self.matches(tree, child))
    }
}

/// A predicate over a candidate node and its surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Condition {
    /// The node itself matches.
    Node { pattern: NodePattern },
    /// Some child matches.
    Child { pattern: NodePattern },
    /// No child matches.
    NoChild { pattern: NodePattern },
    /// Some child matching `via` has a child matching `pattern`.
    Grandchild {
        via: NodePattern,
        pattern: NodePattern,
    },
    /// The node has a parent and the parent matches.
    Parent { pattern: NodePattern },
    IsRoot,
    IsLeaf,
    HasAttribute { key: String },
    MissingAttribute { key: String },
    AttributeEquals { key: String, value: String },
}

impl Condition {
    pub fn holds(&self, tree: &Tree, id: NodeId) -> bool {
        match self {
            Condition::Node { pattern } => pattern.matches(tree, id),
            Condition::Child { pattern } => pattern.find_child(tree, id).is_some(),
            Condition::NoChild { pattern } => pattern.find_child(tree, id).is_none(),
            Condition::Grandchild { via, pattern } => tree
                .children(id)
                .iter()
                .any(|&child| via.matches(tree, child) && pattern.find_child(tree, child).is_some()),
            Condition::Parent { pattern } => tree
                .parent(id)
                .is_some_and(|parent| pattern.matches(tree, parent)),
            Condition::IsRoot => tree.root() == id,
            Condition::IsLeaf => tree.children(id).is_empty(),
            Condition::HasAttribute { key } => !tree.attribute(id, key).is_empty(),
            Condition::MissingAttribute { key } => tree.attribute(id, key).is_empty(),
            Condition::AttributeEquals { key, value } => {
                tree.attribute(id, key).iter().any(|v| v == value)
            }
        }
    }
}

/// The node an action edits: the matched node or its first child matching a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TargetRepr")]
pub enum Target {
    #[default]
    Node,
    Child(NodePattern),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetRepr {
    Keyword(String),
    Child { child: NodePattern },
}

impl TryFrom<TargetRepr> for Target {
    type Error = String;

    fn try_from(value: TargetRepr) -> Result<Self, Self::Error> {
        match value {
            TargetRepr::Keyword(keyword) if keyword == "node" => Ok(Target::Node),
            TargetRepr::Keyword(keyword) => Err(format!(
                "invalid target `{keyword}`, expected \"node\" or {{ child = {{ ... }} }}"
            )),
            TargetRepr::Child { child } => Ok(Target::Child(child)),
        }
    }
}

impl Target {
    pub fn resolve(&self, tree: &Tree, id: NodeId) -> Option<NodeId> {
        match self {
            Target::Node => Some(id),
            Target::Child(pattern) => pattern.find_child(tree, id),
        }
    }
}

/// A tree edit performed when a rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Action {
    Relabel {
        #[serde(default)]
        target: Target,
        relation: String,
    },
    /// Replace every value of `key` with `value`.
    SetAttribute {
        #[serde(default)]
        target: Target,
        key: String,
        value: ValueTemplate,
    },
    /// Append `value` to `key` unless present.
    AddAttribute {
        #[serde(default)]
        target: Target,
        key: String,
        value: ValueTemplate,
    },
    /// Move a grandchild (under the first child matching `child`) up under the node.
    Promote {
        child: NodePattern,
        grandchild: NodePattern,
    },
    /// Move the first child matching `child` under its first sibling matching `under`.
    /// Siblings with a child matching `unless` are skipped.
    Reattach {
        child: NodePattern,
        under: NodePattern,
        #[serde(default)]
        unless: Option<NodePattern>,
    },
    /// Remove the first child matching `child`; the node adopts its children.
    Delete { child: NodePattern },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub when: Vec<Condition>,
    pub then: Vec<Action>,
}

impl Rule {
    /// Returns `true` if every condition holds on `id`.
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        self.when.iter().all(|condition| condition.holds(tree, id))
    }
}

/// Rules applied together until none matches anywhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroup {
    pub name: String,
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
}

/// Rule groups run strictly one after the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroupSequence {
    #[serde(default, rename = "group")]
    pub groups: Vec<RuleGroup>,
}

impl RuleGroupSequence {
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|group| group.rules.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::Sentence;

    fn tree() -> Tree {
        Sentence::from_json(
            r#"{"sentence":"city in India .","words":[
            {"word":"city","lemma":"city","pos":"NOUN","dep":"root","head":0,"index":1},
            {"word":"in","lemma":"in","pos":"ADP","index":2,"head":3,"dep":"case"},
            {"word":"India","lemma":"india","pos":"PROPN","index":3,"head":1,"dep":"nmod"},
            {"word":".","lemma":".","pos":"PUNCT","index":4,"head":1,"dep":"punct"}]}"#,
        )
        .unwrap()
        .tree()
        .unwrap()
    }

    fn pattern(relation: &str) -> NodePattern {
        NodePattern {
            relation: Some(relation.to_string().into()),
            ..Default::default()
        }
    }

    #[test]
    fn patterns_accept_alternatives() {
        let tree = tree();
        let india = tree.children(tree.root())[0];
        let nominal = NodePattern {
            pos: Some("NOUN|PROPN".to_string().into()),
            ..Default::default()
        };
        assert!(nominal.matches(&tree, india));
        assert!(nominal.matches(&tree, tree.root()));
        assert!(!pattern("obl|obj").matches(&tree, india));
    }

    #[test]
    fn conditions_look_at_surroundings() {
        let tree = tree();
        let city = tree.root();
        let india = tree.children(city)[0];

        assert!(Condition::IsRoot.holds(&tree, city));
        assert!(!Condition::IsLeaf.holds(&tree, india));
        assert!(Condition::Child { pattern: pattern("case") }.holds(&tree, india));
        assert!(Condition::NoChild { pattern: pattern("case") }.holds(&tree, city));
        assert!(
            Condition::Grandchild {
                via: pattern("nmod"),
                pattern: pattern("case"),
            }
            .holds(&tree, city)
        );
        assert!(Condition::Parent { pattern: pattern("root") }.holds(&tree, india));
        assert!(!Condition::Parent { pattern: pattern("root") }.holds(&tree, city));
        assert!(Condition::MissingAttribute { key: "lambda".into() }.holds(&tree, city));
    }

    #[test]
    fn targets_resolve_to_children() {
        let tree = tree();
        let city = tree.root();
        assert_eq!(Target::Node.resolve(&tree, city), Some(city));
        assert_eq!(
            Target::Child(pattern("punct")).resolve(&tree, city),
            Some(tree.children(city)[1])
        );
        assert_eq!(Target::Child(pattern("case")).resolve(&tree, city), None);
    }
}
