use std::collections::HashMap;

use thmgraph::graph::assemble::{assemble, find_proof_target};
use thmgraph::graph::mentions::RefLexicon;
use thmgraph::graph::ResultBlock;

fn block(result_id: i64, category: &str, text: &str, name: Option<&str>) -> ResultBlock {
    ResultBlock {
        result_id,
        category: category.to_string(),
        text: text.to_string(),
        name: name.map(str::to_string),
    }
}

#[test]
fn test_find_proof_target() {
    assert_eq!(
        find_proof_target("Proof. [Theorem 5.2] We proceed by induction."),
        Some("Theorem 5.2".to_string())
    );
    assert_eq!(find_proof_target("Proof. We proceed directly."), None);
    assert_eq!(find_proof_target("Proof. [of the main result]"), None);
}

#[test]
fn test_scenario_single_intra_edge() {
    let lexicon = RefLexicon::default();
    let blocks = vec![block(
        1,
        "theorem",
        "Theorem 1. See Lemma 2.",
        Some("Theorem 1"),
    )];

    let graph = assemble("paper", &blocks, None, &lexicon);

    assert_eq!(graph.results.len(), 1);
    assert_eq!(graph.results[0].pdf_from, "paper");
    assert_eq!(graph.results[0].result.as_deref(), Some("Theorem 1"));

    assert_eq!(graph.edges.len(), 1);
    let edge = &graph.edges[0];
    assert_eq!(edge.pdf_from, "paper");
    assert_eq!(edge.nres_in, 1);
    assert_eq!(edge.theorem_in.as_deref(), Some("Theorem 1"));
    assert_eq!(edge.theorem_ref, "lemma 2");
    assert!(edge.intra);
    assert_eq!(edge.ref_tag, None);
    assert_eq!(edge.pdf_to.as_deref(), Some("paper"));
}

#[test]
fn test_proof_attributed_to_last_theorem() {
    let lexicon = RefLexicon::default();
    let blocks = vec![
        block(1, "theorem", "Theorem 1. Base case.", Some("Theorem 1")),
        block(2, "proof", "Proof. It follows from Lemma 2.", None),
    ];

    let graph = assemble("paper", &blocks, None, &lexicon);

    // Both blocks attribute to the same result.
    assert_eq!(graph.results.len(), 1);
    assert_eq!(graph.results[0].result.as_deref(), Some("Theorem 1"));

    assert_eq!(graph.edges.len(), 1);
    let edge = &graph.edges[0];
    assert_eq!(edge.nres_in, 2);
    assert_eq!(edge.theorem_in.as_deref(), Some("Theorem 1"));
    assert_eq!(edge.theorem_ref, "lemma 2");
}

#[test]
fn test_proof_with_explicit_attribution() {
    let lexicon = RefLexicon::default();
    let blocks = vec![
        block(1, "theorem", "Theorem 1. Base case.", Some("Theorem 1")),
        block(
            2,
            "proof",
            "Proof. [Theorem 5.2] Apply Lemma 3 twice.",
            None,
        ),
    ];

    let graph = assemble("paper", &blocks, None, &lexicon);

    let names: Vec<Option<&str>> = graph
        .results
        .iter()
        .map(|r| r.result.as_deref())
        .collect();
    assert_eq!(names, vec![Some("Theorem 1"), Some("Theorem 5.2")]);

    let edge = graph.edges.iter().find(|e| e.nres_in == 2).unwrap();
    assert_eq!(edge.theorem_in.as_deref(), Some("Theorem 5.2"));
    assert_eq!(edge.theorem_ref, "lemma 3");
}

#[test]
fn test_references_are_deduplicated_per_block() {
    let lexicon = RefLexicon::default();
    let blocks = vec![block(
        1,
        "remark",
        "Lemma 2 holds and also Lemma 2 again",
        None,
    )];

    let graph = assemble("paper", &blocks, None, &lexicon);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].theorem_ref, "lemma 2");
}

#[test]
fn test_extra_reference_resolves_through_table() {
    let lexicon = RefLexicon::default();
    let blocks = vec![block(
        1,
        "remark",
        "see <LINK:ref7> Theorem 3 for details",
        None,
    )];
    let mut table = HashMap::new();
    table.insert("ref7".to_string(), "paperB".to_string());

    let graph = assemble("paperA", &blocks, Some(&table), &lexicon);

    assert_eq!(graph.edges.len(), 1);
    let edge = &graph.edges[0];
    assert!(!edge.intra);
    assert_eq!(edge.theorem_ref, "theorem 3");
    assert_eq!(edge.ref_tag.as_deref(), Some("ref7"));
    assert_eq!(edge.pdf_to.as_deref(), Some("paperB"));
}

#[test]
fn test_unresolved_extra_reference_keeps_null_target() {
    let lexicon = RefLexicon::default();
    let blocks = vec![block(
        1,
        "remark",
        "see <LINK:ref7> Theorem 3 for details",
        None,
    )];

    let graph = assemble("paperA", &blocks, None, &lexicon);
    let edge = &graph.edges[0];
    assert!(!edge.intra);
    assert_eq!(edge.ref_tag.as_deref(), Some("ref7"));
    assert_eq!(edge.pdf_to, None);

    // Same outcome with a table that does not know the tag.
    let table = HashMap::from([("other".to_string(), "paperC".to_string())]);
    let graph = assemble("paperA", &blocks, Some(&table), &lexicon);
    assert_eq!(graph.edges[0].pdf_to, None);
}

#[test]
fn test_duplicate_names_collapse_into_one_record() {
    let lexicon = RefLexicon::default();
    let blocks = vec![
        block(1, "theorem", "Theorem 1. First statement.", Some("Theorem 1")),
        block(2, "proof", "Proof. Easy.", None),
        block(3, "theorem", "Theorem 1. Restated.", Some("Theorem 1")),
    ];

    let graph = assemble("paper", &blocks, None, &lexicon);
    assert_eq!(graph.results.len(), 1);
}

#[test]
fn test_unnamed_result_is_recorded() {
    let lexicon = RefLexicon::default();
    let blocks = vec![block(1, "theorem", "An unnamed statement.", None)];

    let graph = assemble("paper", &blocks, None, &lexicon);
    assert_eq!(graph.results.len(), 1);
    assert_eq!(graph.results[0].result, None);
}
