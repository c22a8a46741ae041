//! Binarization of n-ary trees into binary composition plans.
//!
//! A node's children merge with it one at a time, lowest rank first (ties broken left to
//! right). Merges fold left-deep: the first merged dependent sits deepest, the last one
//! at the top of the node's sub-plan.
use std::fmt;

use crate::{
    priority::RelationPriorityTable,
    sentence::relation_key,
    tree::{NodeId, Tree},
};

/// A strictly binary composition plan over the nodes of a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Leaf(NodeId),
    Merge {
        /// Relation of the dependent this pair joins.
        relation: String,
        head: Box<Plan>,
        dependent: Box<Plan>,
    },
}

impl Plan {
    /// The tree node whose sub-plan this is: the leftmost leaf.
    pub fn head_node(&self) -> NodeId {
        let mut current = self;
        loop {
            match current {
                Plan::Leaf(id) => return *id,
                Plan::Merge { head, .. } => current = head,
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Plan::Leaf(_) => 1,
            Plan::Merge { head, dependent, .. } => head.leaf_count() + dependent.leaf_count(),
        }
    }

    pub fn merge_count(&self) -> usize {
        match self {
            Plan::Leaf(_) => 0,
            Plan::Merge { head, dependent, .. } => 1 + head.merge_count() + dependent.merge_count(),
        }
    }

    /// Number of merges on the longest path from the top of the plan to a leaf.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((plan, depth)) = stack.pop() {
            match plan {
                Plan::Leaf(_) => deepest = deepest.max(depth),
                Plan::Merge { head, dependent, .. } => {
                    stack.push((head, depth + 1));
                    stack.push((dependent, depth + 1));
                }
            }
        }
        deepest
    }

    /// Display adapter printing word and relation keys from `tree`.
    pub fn display<'a>(&'a self, tree: &'a Tree) -> PlanDisplay<'a> {
        PlanDisplay { plan: self, tree }
    }
}

pub struct PlanDisplay<'a> {
    plan: &'a Plan,
    tree: &'a Tree,
}

impl fmt::Display for PlanDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.plan {
            Plan::Leaf(id) => f.write_str(&self.tree.word_key(*id)),
            Plan::Merge {
                relation,
                head,
                dependent,
            } => write!(
                f,
                "({} {} {})",
                relation_key(relation),
                head.display(self.tree),
                dependent.display(self.tree)
            ),
        }
    }
}

/// Binarize the tree below its root.
pub fn binarize(tree: &Tree, priorities: &RelationPriorityTable) -> Plan {
    binarize_node(tree, tree.root(), priorities)
}

/// Binarize the sub-tree rooted at `id`.
pub fn binarize_node(tree: &Tree, id: NodeId, priorities: &RelationPriorityTable) -> Plan {
    let mut dependents: Vec<(u32, usize, NodeId)> = tree
        .children(id)
        .iter()
        .enumerate()
        .map(|(position, &child)| (priorities.rank(tree.relation(child)), position, child))
        .collect();
    dependents.sort_unstable();

    dependents
        .into_iter()
        .fold(Plan::Leaf(id), |head, (_, _, child)| Plan::Merge {
            relation: tree.relation(child).to_string(),
            head: Box::new(head),
            dependent: Box::new(binarize_node(tree, child, priorities)),
        })
}
