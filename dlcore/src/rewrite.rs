//! Rewrite engine: applies rule groups to a tree until a fixpoint.
//!
//! For each group, the tree is scanned in pre-order and every rule is tried on every
//! node. The first rule whose application changes the tree restarts the scan from the
//! root. A scan with no effective application ends the group. Applications that leave
//! the tree unchanged do not count, so attribute-stamping rules converge on their own.
use log::{debug, trace};

use crate::{
    magic::ITERATION_CAP_FACTOR,
    rules::{Action, Rule, RuleGroup, RuleGroupSequence},
    tree::{NodeId, Tree},
    utils::error::{DlError, DlResult},
};

/// Run every group of `sequence` on `tree`, in order.
pub fn apply_rule_group_sequence(sequence: &RuleGroupSequence, tree: &mut Tree) -> DlResult<()> {
    for group in &sequence.groups {
        apply_rule_group(group, tree)?;
    }
    Ok(())
}

/// Apply `group` to `tree` until no rule changes it; returns the number of effective
/// applications.
pub fn apply_rule_group(group: &RuleGroup, tree: &mut Tree) -> DlResult<usize> {
    let cap = ITERATION_CAP_FACTOR * (tree.size() + 1) * (group.rules.len() + 1);
    trace!("Applying rule group '{}' (cap {})", group.name, cap);

    let mut applied = 0;
    'scan: loop {
        for id in tree.preorder() {
            for rule in &group.rules {
                if rule.matches(tree, id) && apply_rule(rule, tree, id)? {
                    applied += 1;
                    debug!(
                        "Rule '{}/{}' applied on {}",
                        group.name,
                        rule.name,
                        tree.word_key(id)
                    );
                    if applied > cap {
                        return Err(DlError::NonConvergence {
                            group: group.name.clone(),
                            cap,
                        });
                    }
                    continue 'scan;
                }
            }
        }
        break;
    }

    trace!("Rule group '{}' reached a fixpoint after {} applications", group.name, applied);
    Ok(applied)
}

/// Apply the actions of `rule` on `id`; returns `true` if the tree changed.
pub fn apply_rule(rule: &Rule, tree: &mut Tree, id: NodeId) -> DlResult<bool> {
    let mut changed = false;
    for action in &rule.then {
        changed |= apply_action(action, &rule.name, tree, id)?;
    }
    Ok(changed)
}

fn apply_action(action: &Action, rule: &str, tree: &mut Tree, id: NodeId) -> DlResult<bool> {
    Ok(match action {
        Action::Relabel { target, relation } => match target.resolve(tree, id) {
            Some(target) => tree.relabel(target, relation),
            None => false,
        },
        Action::SetAttribute { target, key, value } => match target.resolve(tree, id) {
            Some(target) => {
                let value = value.render(tree, id, rule)?;
                tree.set_attribute(target, key, value)
            }
            None => false,
        },
        Action::AddAttribute { target, key, value } => match target.resolve(tree, id) {
            Some(target) => {
                let value = value.render(tree, id, rule)?;
                tree.add_attribute(target, key, value)
            }
            None => false,
        },
        Action::Promote { child, grandchild } => {
            let found = tree.children(id).iter().find_map(|&c| {
                child
                    .matches(tree, c)
                    .then(|| grandchild.find_child(tree, c))
                    .flatten()
            });
            match found {
                Some(g) => tree.reattach(g, id),
                None => false,
            }
        }
        Action::Reattach {
            child,
            under,
            unless,
        } => {
            let Some(moved) = child.find_child(tree, id) else {
                return Ok(false);
            };
            let host = tree.children(id).iter().copied().find(|&sibling| {
                sibling != moved
                    && under.matches(tree, sibling)
                    && unless
                        .as_ref()
                        .is_none_or(|unless| unless.find_child(tree, sibling).is_none())
            });
            match host {
                Some(host) => tree.reattach(moved, host),
                None => false,
            }
        }
        Action::Delete { child } => {
            let Some(removed) = child.find_child(tree, id) else {
                return Ok(false);
            };
            let orphans = tree.children(removed).to_vec();
            for orphan in orphans {
                tree.reattach(orphan, id);
            }
            tree.detach(removed);
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::Sentence;

    fn tree(json: &str) -> Tree {
        Sentence::from_json(json).unwrap().tree().unwrap()
    }

    fn rules(toml: &str) -> RuleGroupSequence {
        RuleGroupSequence::from_toml_str(toml, "inline").unwrap()
    }

    const STRAY_CASE: &str = r#"{"sentence":"city in India","words":[
        {"word":"city","lemma":"city","pos":"NOUN","dep":"root","head":0,"index":1},
        {"word":"in","lemma":"in","pos":"ADP","index":2,"head":1,"dep":"case"},
        {"word":"India","lemma":"india","pos":"PROPN","index":3,"head":1,"dep":"nmod"}]}"#;

    #[test]
    fn reattach_moves_a_stray_case_marker() {
        let mut tree = tree(STRAY_CASE);
        let sequence = rules(
            r#"
[[group]]
name = "structure"
[[group.rule]]
name = "case-under-nmod"
when = [
  { kind = "child", pattern = { relation = "case" } },
  { kind = "child", pattern = { relation = "nmod" } },
]
then = [{ kind = "reattach", child = { relation = "case" }, under = { relation = "nmod" } }]
"#,
        );
        apply_rule_group_sequence(&sequence, &mut tree).unwrap();
        assert_eq!(
            tree.to_string(),
            "(l-root w-1-city t-NOUN (l-nmod w-3-india t-PROPN (l-case w-2-in t-ADP)))"
        );
    }

    #[test]
    fn reattach_skips_modifiers_with_their_own_marker() {
        let mut tree = tree(
            r#"{"sentence":"city in of Paris","words":[
            {"word":"city","lemma":"city","pos":"NOUN","dep":"root","head":0,"index":1},
            {"word":"in","lemma":"in","pos":"ADP","index":2,"head":1,"dep":"case"},
            {"word":"of","lemma":"of","pos":"ADP","index":3,"head":4,"dep":"case"},
            {"word":"Paris","lemma":"paris","pos":"PROPN","index":4,"head":1,"dep":"nmod"}]}"#,
        );
        let sequence = rules(
            r#"
[[group]]
name = "structure"
[[group.rule]]
name = "case-under-nmod"
when = [{ kind = "child", pattern = { relation = "case" } }]
then = [
  { kind = "reattach", child = { relation = "case" }, under = { relation = "nmod" }, unless = { relation = "case" } },
]
"#,
        );
        let before = tree.to_string();
        assert_eq!(apply_rule_group(&sequence.groups[0], &mut tree).unwrap(), 0);
        assert_eq!(tree.to_string(), before);
    }

    #[test]
    fn promote_and_delete_restructure() {
        let mut tree = tree(
            r#"{"sentence":"a b c","words":[
            {"word":"a","lemma":"a","pos":"X","dep":"root","head":0,"index":1},
            {"word":"b","lemma":"b","pos":"X","index":2,"head":1,"dep":"goeswith"},
            {"word":"c","lemma":"c","pos":"X","index":3,"head":2,"dep":"dep"}]}"#,
        );
        let sequence = rules(
            r#"
[[group]]
name = "structure"
[[group.rule]]
name = "drop-goeswith"
when = [{ kind = "child", pattern = { relation = "goeswith" } }]
then = [{ kind = "delete", child = { relation = "goeswith" } }]
"#,
        );
        apply_rule_group_sequence(&sequence, &mut tree).unwrap();
        assert_eq!(tree.to_string(), "(l-root w-1-a t-X (l-dep w-3-c t-X))");
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn idempotent_rules_reach_a_fixpoint() {
        let mut tree = tree(STRAY_CASE);
        let sequence = rules(
            r#"
[[group]]
name = "lambda"
[[group.rule]]
name = "nominal"
when = [{ kind = "node", pattern = { pos = "NOUN|PROPN" } }]
then = [{ kind = "set-attribute", key = "lambda", value = "TYPE EVENT ARG1" }]
"#,
        );
        assert_eq!(apply_rule_group(&sequence.groups[0], &mut tree).unwrap(), 2);
        assert_eq!(apply_rule_group(&sequence.groups[0], &mut tree).unwrap(), 0);
        let city = tree.root();
        assert_eq!(tree.attribute(city, "lambda"), ["TYPE EVENT ARG1"]);
    }

    #[test]
    fn oscillating_rules_do_not_converge() {
        let mut tree = tree(STRAY_CASE);
        let sequence = rules(
            r#"
[[group]]
name = "flip-flop"
[[group.rule]]
name = "to-b"
when = [{ kind = "attribute-equals", key = "state", value = "a" }]
then = [{ kind = "set-attribute", key = "state", value = "b" }]
[[group.rule]]
name = "to-a"
when = [{ kind = "missing-attribute", key = "never" }]
then = [{ kind = "set-attribute", key = "state", value = "a" }]
"#,
        );
        let err = apply_rule_group_sequence(&sequence, &mut tree).unwrap_err();
        match err {
            DlError::NonConvergence { group, cap } => {
                assert_eq!(group, "flip-flop");
                assert_eq!(cap, ITERATION_CAP_FACTOR * 4 * 3);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unresolved_placeholders_fail_the_sentence() {
        let mut tree = tree(STRAY_CASE);
        let sequence = rules(
            r#"
[[group]]
name = "lambda"
[[group.rule]]
name = "link"
when = [{ kind = "is-root" }]
then = [{ kind = "set-attribute", key = "link", value = "{rel}.{child:obl}" }]
"#,
        );
        let err = apply_rule_group_sequence(&sequence, &mut tree).unwrap_err();
        assert!(err.is_unresolved_placeholder());
    }
}
