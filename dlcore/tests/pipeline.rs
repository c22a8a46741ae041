use dlcore::{
    magic::{MAX_PLAN_DEPTH, MAX_TREE_DEPTH},
    prelude::*,
};
use dlformal::prelude::*;

const CITY: &str = r#"{"sentence":"city in India .","words":[
    {"word":"city","lemma":"city","pos":"NOUN","dep":"root","head":0,"index":1},
    {"word":"in","lemma":"in","pos":"ADP","index":2,"head":3,"dep":"case"},
    {"word":"India","lemma":"india","pos":"PROPN","index":3,"head":1,"dep":"nmod"},
    {"word":".","lemma":".","pos":"PUNCT","index":4,"head":1,"dep":"punct"}]}"#;

const CYCLE: &str = r#"{"sentence":"a b c","words":[
    {"word":"a","lemma":"a","pos":"X","index":1,"head":0,"dep":"root"},
    {"word":"b","lemma":"b","pos":"X","index":2,"head":3,"dep":"dep"},
    {"word":"c","lemma":"c","pos":"X","index":3,"head":2,"dep":"dep"}]}"#;

const LONG: &str = r#"{"sentence":"The big dog saw a cat in the park .","words":[
    {"word":"The","lemma":"the","pos":"DET","index":1,"head":3,"dep":"det"},
    {"word":"big","lemma":"big","pos":"ADJ","index":2,"head":3,"dep":"amod"},
    {"word":"dog","lemma":"dog","pos":"NOUN","index":3,"head":4,"dep":"nsubj"},
    {"word":"saw","lemma":"see","pos":"VERB","index":4,"head":0,"dep":"root"},
    {"word":"a","lemma":"a","pos":"DET","index":5,"head":6,"dep":"det"},
    {"word":"cat","lemma":"cat","pos":"NOUN","index":6,"head":4,"dep":"obj"},
    {"word":"in","lemma":"in","pos":"ADP","index":7,"head":9,"dep":"case"},
    {"word":"the","lemma":"the","pos":"DET","index":8,"head":9,"dep":"det"},
    {"word":"park","lemma":"park","pos":"NOUN","index":9,"head":4,"dep":"obl"},
    {"word":".","lemma":".","pos":"PUNCT","index":10,"head":4,"dep":"punct"}]}"#;

fn sentence(record: &str) -> Sentence {
    Sentence::from_json(record).unwrap()
}

/// `n` nouns; token `i` hangs under token `head(i)` (token 1 is the root).
fn nouns(n: usize, head: impl Fn(usize) -> usize) -> Sentence {
    let words: Vec<String> = (1..=n)
        .map(|i| {
            let (head, dep) = if i == 1 { (0, "root") } else { (head(i), "nmod") };
            format!(
                r#"{{"word":"n{i}","lemma":"n{i}","pos":"NOUN","index":{i},"head":{head},"dep":"{dep}"}}"#
            )
        })
        .collect();
    sentence(&format!(
        r#"{{"sentence":"nouns","words":[{}]}}"#,
        words.join(",")
    ))
}

#[test]
fn processing_is_deterministic() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();
    let first = pipeline.process(&sentence(LONG)).unwrap();
    let second = pipeline.process(&sentence(LONG)).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.composition.expressions[0].to_string(),
        second.composition.expressions[0].to_string()
    );
}

#[test]
fn every_node_is_composed_once() {
    let resources = SemanticResources::bundled().unwrap();
    let mut tree = sentence(LONG).tree().unwrap();
    apply_rule_group_sequence(&resources.structural, &mut tree).unwrap();
    apply_rule_group_sequence(&resources.lambda, &mut tree).unwrap();

    let plan = binarize(&tree, &resources.priorities);
    assert_eq!(plan.leaf_count(), tree.size());
    assert_eq!(plan.merge_count(), tree.size() - 1);
    assert_eq!(
        plan.display(&tree).to_string(),
        "(l-punct (l-nsubj (l-obj (l-obl w-4-see (l-det (l-case w-9-park w-7-in) w-8-the)) \
         (l-det w-6-cat w-5-a)) (l-amod (l-det w-3-dog w-1-the) w-2-big)) w-10-.)"
    );

    let composition = Composer::new(&resources.logic, false)
        .unwrap()
        .compose(&mut tree, &plan)
        .unwrap();
    assert_eq!(composition.expressions.len(), 1);
    for id in tree.preorder() {
        assert_eq!(tree.node(id).semantics().len(), 1);
    }

    let text = composition.expressions[0].to_string();
    assert!(text.contains("p_EVENT.ENTITY_l-nsubj:b"));
    assert!(text.contains("p_EVENT.ENTITY_l-obj:b"));
    assert!(text.contains("p_EVENT.ENTITY_l-obl.w-7-in:b"));
    assert!(text.contains("(p_TYPE_w-2-big:u"));
}

#[test]
fn stray_case_markers_move_to_the_modifier() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();
    let semantics = pipeline
        .process(&sentence(
            r#"{"sentence":"saw in park","words":[
            {"word":"saw","lemma":"see","pos":"VERB","index":1,"head":0,"dep":"root"},
            {"word":"in","lemma":"in","pos":"ADP","index":2,"head":1,"dep":"case"},
            {"word":"park","lemma":"park","pos":"NOUN","index":3,"head":1,"dep":"obl"}]}"#,
        ))
        .unwrap();
    assert_eq!(
        semantics.tree,
        "(l-root w-1-see t-VERB (l-obl w-3-park t-NOUN (l-case w-2-in t-ADP)))"
    );
    assert!(
        semantics.composition.expressions[0]
            .to_string()
            .contains("p_EVENT.ENTITY_l-obl.w-2-in:b")
    );
}

#[test]
fn structural_rules_clean_up_the_tree() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();

    let pieces = pipeline
        .process(&sentence(
            r#"{"sentence":"any where .","words":[
            {"word":"any","lemma":"any","pos":"ADV","index":1,"head":0,"dep":"root"},
            {"word":"where","lemma":"where","pos":"ADV","index":2,"head":1,"dep":"goeswith"},
            {"word":".","lemma":".","pos":"PUNCT","index":3,"head":1,"dep":"punct"}]}"#,
        ))
        .unwrap();
    assert_eq!(pieces.tree, "(l-root w-1-any t-ADV (l-punct w-3-. t-PUNCT))");

    let attached_to_punct = pipeline
        .process(&sentence(
            r#"{"sentence":"Hi , Bob","words":[
            {"word":"Hi","lemma":"hi","pos":"INTJ","index":1,"head":0,"dep":"root"},
            {"word":",","lemma":",","pos":"PUNCT","index":2,"head":1,"dep":"punct"},
            {"word":"Bob","lemma":"bob","pos":"PROPN","index":3,"head":2,"dep":"vocative"}]}"#,
        ))
        .unwrap();
    assert_eq!(
        attached_to_punct.tree,
        "(l-root w-1-hi t-INTJ (l-punct w-2-, t-PUNCT) (l-vocative w-3-bob t-PROPN))"
    );
}

#[test]
fn readings_multiply_into_candidates() {
    let mut resources = SemanticResources::bundled().unwrap();
    resources.lambda = RuleGroupSequence::from_toml_str(
        r#"
[[group]]
name = "readings"

[[group.rule]]
name = "noun-or-event"
when = [{ kind = "node", pattern = { pos = "NOUN" } }]
then = [
  { kind = "add-attribute", key = "lambda", value = "TYPE" },
  { kind = "add-attribute", key = "lambda", value = "EVENT" },
]
"#,
        "inline",
    )
    .unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();

    let semantics = pipeline
        .process(&sentence(
            r#"{"sentence":"dogs cats","words":[
            {"word":"dogs","lemma":"dog","pos":"NOUN","index":1,"head":0,"dep":"root"},
            {"word":"cats","lemma":"cat","pos":"NOUN","index":2,"head":1,"dep":"compound"}]}"#,
        ))
        .unwrap();
    let expressions: Vec<String> = semantics
        .composition
        .expressions
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        expressions,
        [
            "(lambda $0:<a,e> (and:c (p_TYPE_w-1-dog:u $0) (p_TYPE_w-2-cat:u $0)))",
            "(lambda $0:<a,e> (and:c (p_TYPE_w-1-dog:u $0) (p_EVENT_w-2-cat:u $0)))",
            "(lambda $0:<a,e> (and:c (p_EVENT_w-1-dog:u $0) (p_TYPE_w-2-cat:u $0)))",
            "(lambda $0:<a,e> (and:c (p_EVENT_w-1-dog:u $0) (p_EVENT_w-2-cat:u $0)))",
        ]
    );
}

#[test]
fn expanded_events_reify_the_link() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, true).unwrap();
    let semantics = pipeline.process(&sentence(CITY)).unwrap();
    assert_eq!(
        semantics.composition.expressions[0].to_string(),
        "(lambda $0:<a,e> (and:c (exists:ex $1:<a,e> (and:c \
         (and:c (p_TYPE_w-1-city:u $0) (p_EVENT_w-1-city:u $0) (p_EVENT.ENTITY_arg1:b $0 $0)) \
         (and:c (and:c (p_TYPE_w-3-india:u $1) (p_EVENT_w-3-india:u $1) (p_EVENT.ENTITY_arg1:b $1 $1)) (p_EMPTY:u $1)) \
         (exists:ex $2:<a,e> (and:c (p_EVENT_l-nmod.w-2-in:u $2) (p_EVENT.ENTITY_arg1:b $2 $0) (p_EVENT.ENTITY_arg2:b $2 $1))))) \
         (p_EMPTY:u $0)))"
    );
}

#[test]
fn failing_sentences_do_not_stop_the_batch() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();
    let sentences = [sentence(CITY), sentence(CYCLE), sentence(LONG)];

    let results = pipeline.process_batch(&sentences);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(DlError::MalformedInput(MalformedInput::Cycle { .. }))
    ));
    assert!(results[2].is_ok());
}

#[test]
fn resources_are_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SemanticResources>();

    let resources = SemanticResources::bundled().unwrap();
    let expected = Pipeline::new(&resources, false)
        .unwrap()
        .process(&sentence(LONG))
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let pipeline = Pipeline::new(&resources, false).unwrap();
                    pipeline.process(&sentence(LONG)).unwrap().plan
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected.plan);
        }
    });
}

#[test]
fn existential_requires_a_predicate() {
    let resources = SemanticResources::bundled().unwrap();
    let logic = &resources.logic;
    let composer = Composer::new(logic, false).unwrap();

    let head = logic.read("(lambda $x:v (p_EMPTY:u $x))").unwrap();
    let entity = logic.read("rex:e").unwrap();

    let err = composer.existential(&head, &entity, "l-nmod").unwrap_err();
    assert!(err.is_composition_type());

    let err = composer.conjoin(&head, &entity).unwrap_err();
    assert!(err.is_composition_type());
}

#[test]
fn unknown_templates_are_reported() {
    let mut resources = SemanticResources::bundled().unwrap();
    resources.lambda = RuleGroupSequence::from_toml_str(
        r#"
[[group]]
name = "typo"

[[group.rule]]
name = "nominal"
when = [{ kind = "node", pattern = { pos = "NOUN" } }]
then = [{ kind = "set-attribute", key = "lambda", value = "TYPE EVNET" }]
"#,
        "inline",
    )
    .unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();
    let err = pipeline.process(&sentence(CITY)).unwrap_err();
    assert!(matches!(err, DlError::UnknownTemplate { ref template, .. } if template == "EVNET"));
}

#[test]
fn modifiers_keep_their_own_case_marker() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();
    let semantics = pipeline
        .process(&sentence(
            r#"{"sentence":"lived in the city of Paris","words":[
            {"word":"lived","lemma":"live","pos":"VERB","index":1,"head":0,"dep":"root"},
            {"word":"in","lemma":"in","pos":"ADP","index":2,"head":4,"dep":"case"},
            {"word":"the","lemma":"the","pos":"DET","index":3,"head":4,"dep":"det"},
            {"word":"city","lemma":"city","pos":"NOUN","index":4,"head":1,"dep":"obl"},
            {"word":"of","lemma":"of","pos":"ADP","index":5,"head":6,"dep":"case"},
            {"word":"Paris","lemma":"paris","pos":"PROPN","index":6,"head":4,"dep":"nmod"}]}"#,
        ))
        .unwrap();
    assert_eq!(
        semantics.tree,
        "(l-root w-1-live t-VERB (l-obl w-4-city t-NOUN (l-case w-2-in t-ADP) \
         (l-det w-3-the t-DET) (l-nmod w-6-paris t-PROPN (l-case w-5-of t-ADP))))"
    );

    let text = semantics.composition.expressions[0].to_string();
    assert!(text.contains("p_EVENT.ENTITY_l-obl.w-2-in:b"));
    assert!(text.contains("p_EVENT.ENTITY_l-nmod.w-5-of:b"));
    assert!(!text.contains("p_EVENT.ENTITY_l-nmod.w-2-in:b"));
    assert!(!text.contains("p_EVENT.ENTITY_l-obl:b"));
}

#[test]
fn deep_head_chains_are_rejected() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();

    assert!(pipeline.process(&nouns(MAX_TREE_DEPTH, |i| i - 1)).is_ok());

    let sentences = [nouns(200, |i| i - 1), sentence(CITY)];
    let results = pipeline.process_batch(&sentences);
    assert!(matches!(
        results[0],
        Err(DlError::MalformedInput(MalformedInput::TooDeep { limit, .. })) if limit == MAX_TREE_DEPTH
    ));
    assert!(results[1].is_ok());
}

#[test]
fn wide_nodes_are_rejected_before_composition() {
    let resources = SemanticResources::bundled().unwrap();
    let pipeline = Pipeline::new(&resources, false).unwrap();

    let err = pipeline.process(&nouns(MAX_PLAN_DEPTH + 2, |_| 1)).unwrap_err();
    match err {
        DlError::PlanTooDeep { depth, limit } => {
            assert_eq!(depth, MAX_PLAN_DEPTH + 1);
            assert_eq!(limit, MAX_PLAN_DEPTH);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(pipeline.process(&nouns(12, |_| 1)).is_ok());
}

#[test]
fn ill_typed_leaves_fail_only_their_sentence() {
    let mut resources = SemanticResources::bundled().unwrap();
    // `u` no longer takes node variables, so no leaf predicate can be applied.
    let types = TypeRepository::from_toml_str(
        r#"
entity = "e"
truth = "t"

[[primitive]]
name = "e"
[[primitive]]
name = "t"
[[primitive]]
name = "a"

[[complex]]
name = "v"
definition = "<a,e>"
[[complex]]
name = "u"
definition = "<t,t>"
[[complex]]
name = "b"
definition = "<v,<v,t>>"
[[complex]]
name = "c"
definition = "<t*,t>"
[[complex]]
name = "ex"
definition = "<<v,t>,t>"
"#,
        "inline",
    )
    .unwrap();
    resources.logic = LogicServices::flexible(types);
    let pipeline = Pipeline::new(&resources, false).unwrap();

    let err = pipeline.process(&sentence(CITY)).unwrap_err();
    assert!(matches!(err, DlError::LeafType { ref node, .. } if node == "w-1-city"));
    assert!(!err.is_configuration_error());
}

#[test]
fn readings_are_capped_per_merge() {
    let mut resources = SemanticResources::bundled().unwrap();
    resources.lambda = RuleGroupSequence::from_toml_str(
        r#"
[[group]]
name = "readings"

[[group.rule]]
name = "noun-or-event"
when = [{ kind = "node", pattern = { pos = "NOUN" } }]
then = [
  { kind = "add-attribute", key = "lambda", value = "TYPE" },
  { kind = "add-attribute", key = "lambda", value = "EVENT" },
  { kind = "add-attribute", key = "lambda", value = "ARG1" },
]
"#,
        "inline",
    )
    .unwrap();

    let mut tree = nouns(4, |_| 1).tree().unwrap();
    apply_rule_group_sequence(&resources.lambda, &mut tree).unwrap();
    let plan = binarize(&tree, &resources.priorities);

    let full = Composer::new(&resources.logic, false)
        .unwrap()
        .compose(&mut tree, &plan)
        .unwrap();
    assert_eq!(full.expressions.len(), 81);

    let capped = Composer::new(&resources.logic, false)
        .unwrap()
        .with_max_readings(5)
        .compose(&mut tree, &plan)
        .unwrap();
    assert_eq!(capped.expressions.len(), 5);
    assert_eq!(capped.expressions[..], full.expressions[..5]);
}
