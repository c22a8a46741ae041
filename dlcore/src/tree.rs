//! Arena-backed dependency trees.
//!
//! Every token of the sentence becomes one [`Node`] addressed by a stable [`NodeId`]
//! (its 0-based position). Rewrites only move links between nodes: a detached node
//! stays in the arena but is no longer reachable from the root.
use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use dlformal::expr::Expr;
use log::trace;
use smallvec::SmallVec;

use crate::{
    magic::MAX_TREE_DEPTH,
    sentence::{Token, relation_key},
    utils::error::MalformedInput,
};

/// Stable handle to a node of a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    token: Token,
    relation: String,
    parent: Option<NodeId>,
    children: SmallVec<NodeId, 4>,
    attributes: BTreeMap<String, Vec<String>>,
    semantics: Vec<Expr>,
}

impl Node {
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Relation to the parent; `root` for the root node unless relabelled.
    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in ascending token index order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attributes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.attributes
    }

    /// Values stored under `key`, in insertion order.
    pub fn attribute(&self, key: &str) -> &[String] {
        self.attributes.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Leaf expressions recorded by the composer.
    pub fn semantics(&self) -> &[Expr] {
        &self.semantics
    }
}

/// A rooted, ordered dependency tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Build a tree by linking every token under its head.
    ///
    /// Tokens must be listed in order with indices `1..=n`, exactly one token must have
    /// head `0`, every other head must name a token, and following heads from any token
    /// must reach the root within [`MAX_TREE_DEPTH`] nodes.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self, MalformedInput> {
        if tokens.is_empty() {
            return Err(MalformedInput::Empty);
        }

        for (position, token) in tokens.iter().enumerate() {
            if token.index != position + 1 {
                return Err(MalformedInput::IndexMismatch {
                    position: position + 1,
                    index: token.index,
                });
            }
        }

        let roots: Vec<usize> = tokens
            .iter()
            .filter(|token| token.head == 0)
            .map(|token| token.index)
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(MalformedInput::MissingRoot),
            [root] => NodeId(root - 1),
            _ => return Err(MalformedInput::MultipleRoots(roots)),
        };

        if let Some(token) = tokens.iter().find(|token| token.head > tokens.len()) {
            return Err(MalformedInput::DanglingHead {
                index: token.index,
                head: token.head,
            });
        }

        // Distance to the root (the root is at depth 1) of nodes known to reach it.
        let mut depths: Vec<Option<usize>> = vec![None; tokens.len()];
        depths[root.0] = Some(1);
        for start in 0..tokens.len() {
            let mut visited = HashSet::new();
            let mut path = Vec::new();
            let mut current = start;
            let mut depth = loop {
                if let Some(depth) = depths[current] {
                    break depth;
                }
                if !visited.insert(current) {
                    return Err(MalformedInput::Cycle {
                        index: tokens[start].index,
                    });
                }
                path.push(current);
                current = tokens[current].head - 1;
            };
            for position in path.into_iter().rev() {
                depth += 1;
                if depth > MAX_TREE_DEPTH {
                    return Err(MalformedInput::TooDeep {
                        index: tokens[position].index,
                        limit: MAX_TREE_DEPTH,
                    });
                }
                depths[position] = Some(depth);
            }
        }

        let mut nodes: Vec<Node> = tokens
            .iter()
            .map(|token| Node {
                token: token.clone(),
                relation: token.dep.clone(),
                parent: None,
                children: SmallVec::new(),
                attributes: BTreeMap::new(),
                semantics: Vec::new(),
            })
            .collect();
        for (position, token) in tokens.iter().enumerate() {
            if token.head != 0 {
                let parent = NodeId(token.head - 1);
                nodes[position].parent = Some(parent);
                nodes[parent.0].children.push(NodeId(position));
            }
        }

        trace!("Built tree of {} nodes rooted at token {}", nodes.len(), root.0 + 1);
        Ok(Self { nodes, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn relation(&self, id: NodeId) -> &str {
        &self.nodes[id.0].relation
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn word_key(&self, id: NodeId) -> String {
        self.nodes[id.0].token.word_key()
    }

    /// Reachable nodes in pre-order (node, then children left to right).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Number of nodes reachable from the root.
    pub fn size(&self) -> usize {
        self.preorder().len()
    }

    /// Returns `true` if `ancestor` lies on the path from `id` to the root (or is `id`).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Replace the relation of `id`. Returns `true` if it changed.
    pub fn relabel(&mut self, id: NodeId, relation: &str) -> bool {
        let node = &mut self.nodes[id.0];
        if node.relation == relation {
            return false;
        }
        node.relation = relation.to_string();
        true
    }

    /// Unlink `id` from its parent. The root cannot be detached.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            let siblings = &mut self.nodes[parent.0].children;
            if let Some(position) = siblings.iter().position(|&child| child == id) {
                siblings.remove(position);
            }
        }
    }

    /// Link a detached `child` under `parent`, keeping children in token index order.
    ///
    /// Returns `false` without editing anything if the link would create a cycle.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> bool {
        if self.is_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|&sibling| sibling.0 > child.0)
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    /// Move `child` under `parent`. Returns `true` if the tree changed.
    pub fn reattach(&mut self, child: NodeId, parent: NodeId) -> bool {
        if child == self.root || self.parent(child) == Some(parent) {
            return false;
        }
        self.attach(child, parent)
    }

    /// Store `value` as the only value of `key`. Returns `true` if the map changed.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: String) -> bool {
        let values = self.nodes[id.0].attributes.entry(key.to_string()).or_default();
        if values.len() == 1 && values[0] == value {
            return false;
        }
        *values = vec![value];
        true
    }

    /// Append `value` to `key` unless already present. Returns `true` if the map changed.
    pub fn add_attribute(&mut self, id: NodeId, key: &str, value: String) -> bool {
        let values = self.nodes[id.0].attributes.entry(key.to_string()).or_default();
        if values.contains(&value) {
            return false;
        }
        values.push(value);
        true
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> &[String] {
        self.nodes[id.0].attribute(key)
    }

    pub fn set_semantics(&mut self, id: NodeId, semantics: Vec<Expr>) {
        self.nodes[id.0].semantics = semantics;
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node(id);
        write!(
            f,
            "({} {} t-{}",
            relation_key(&node.relation),
            node.token.word_key(),
            node.token.pos
        )?;
        for &child in node.children() {
            write!(f, " ")?;
            self.fmt_node(child, f)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(index: usize, lemma: &str, pos: &str, head: usize, dep: &str) -> Token {
        Token {
            index,
            word: lemma.to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            ner: "O".to_string(),
            head,
            dep: dep.to_string(),
            sent_end: false,
        }
    }

    fn city_in_india() -> Vec<Token> {
        vec![
            token(1, "city", "NOUN", 0, "root"),
            token(2, "in", "ADP", 3, "case"),
            token(3, "India", "PROPN", 1, "nmod"),
            token(4, ".", "PUNCT", 1, "punct"),
        ]
    }

    #[test]
    fn builds_ordered_children() {
        let tree = Tree::from_tokens(&city_in_india()).unwrap();
        assert_eq!(
            tree.to_string(),
            "(l-root w-1-city t-NOUN (l-nmod w-3-india t-PROPN (l-case w-2-in t-ADP)) (l-punct w-4-. t-PUNCT))"
        );
        assert_eq!(tree.size(), 4);
        let order: Vec<usize> = tree.preorder().iter().map(|id| id.index() + 1).collect();
        assert_eq!(order, [1, 3, 2, 4]);
    }

    #[test]
    fn detects_cycles() {
        let tokens = vec![
            token(1, "a", "X", 0, "root"),
            token(2, "b", "X", 3, "dep"),
            token(3, "c", "X", 2, "dep"),
        ];
        assert!(Tree::from_tokens(&tokens).unwrap_err().is_cycle());

        let self_loop = vec![token(1, "a", "X", 0, "root"), token(2, "b", "X", 2, "dep")];
        assert!(Tree::from_tokens(&self_loop).unwrap_err().is_cycle());
    }

    #[test]
    fn rejects_bad_indices_and_heads() {
        assert!(Tree::from_tokens(&[]).unwrap_err().is_empty());

        let mut tokens = city_in_india();
        tokens[1].index = 7;
        assert!(Tree::from_tokens(&tokens).unwrap_err().is_index_mismatch());

        let mut tokens = city_in_india();
        tokens[3].head = 9;
        assert_eq!(
            Tree::from_tokens(&tokens).unwrap_err(),
            MalformedInput::DanglingHead { index: 4, head: 9 }
        );

        let mut tokens = city_in_india();
        tokens[0].head = 2;
        assert!(Tree::from_tokens(&tokens).unwrap_err().is_missing_root());
    }

    #[test]
    fn attach_keeps_token_order_and_refuses_cycles() {
        let mut tree = Tree::from_tokens(&city_in_india()).unwrap();
        let city = NodeId(0);
        let case = NodeId(1);
        let india = NodeId(2);

        assert!(tree.reattach(case, city));
        assert_eq!(tree.children(city), [case, india, NodeId(3)]);
        assert!(!tree.reattach(case, city));

        assert!(!tree.attach(city, india));
        assert_eq!(tree.root(), city);
    }

    #[test]
    fn attributes_report_changes() {
        let mut tree = Tree::from_tokens(&city_in_india()).unwrap();
        let city = tree.root();
        assert!(tree.set_attribute(city, "lambda", "TYPE".into()));
        assert!(!tree.set_attribute(city, "lambda", "TYPE".into()));
        assert!(tree.add_attribute(city, "lambda", "EVENT".into()));
        assert!(!tree.add_attribute(city, "lambda", "EVENT".into()));
        assert_eq!(tree.attribute(city, "lambda"), ["TYPE", "EVENT"]);
    }
}
