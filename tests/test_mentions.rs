use thmgraph::graph::mentions::RefLexicon;

#[test]
fn test_unlinked_mention_defaults_to_intra() {
    let lexicon = RefLexicon::default();
    let outcome =
        lexicon.find_references(Some("Theorem 1"), "Theorem 1. See Lemma 2.");

    assert_eq!(outcome.mentions, vec!["Lemma 2"]);
    assert_eq!(outcome.intra, vec!["lemma 2"]);
    assert!(outcome.extra.is_empty());
}

#[test]
fn test_self_reference_is_excluded() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(Some("theorem 2"), "Theorem 2 holds trivially");

    assert!(outcome.mentions.is_empty());
    assert!(outcome.intra.is_empty());
    assert!(outcome.extra.is_empty());
}

#[test]
fn test_foreign_link_tag_classifies_extra() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "see <LINK:ref7> Theorem 3 here");

    assert!(outcome.intra.is_empty());
    assert_eq!(
        outcome.extra,
        vec![("ref7".to_string(), "theorem 3".to_string())]
    );
}

#[test]
fn test_tag_echoing_the_mention_classifies_intra() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "see <LINK:Lemma.4> Lemma 4 here");

    assert_eq!(outcome.intra, vec!["lemma 4"]);
    assert!(outcome.extra.is_empty());
}

#[test]
fn test_tag_naming_a_result_classifies_intra() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "see <LINK:theorem31> Lemma 4 here");
    assert_eq!(outcome.intra, vec!["lemma 4"]);

    let outcome = lexicon.find_references(None, "see <LINK:section2> Lemma 4 here");
    assert_eq!(outcome.intra, vec!["lemma 4"]);
    assert!(outcome.extra.is_empty());
}

#[test]
fn test_in_marker_short_circuits_link_search() {
    let lexicon = RefLexicon::default();
    // The foreign marker nearby is ignored: the #in suffix already proves
    // the reference is in-document.
    let outcome = lexicon.find_references(None, "see <LINK:xyz99> By Theorem 3.2#in ok");

    assert_eq!(outcome.mentions, vec!["Theorem 3.2"]);
    assert_eq!(outcome.intra, vec!["theorem 3.2"]);
    assert!(outcome.extra.is_empty());
}

#[test]
fn test_multi_number_mentions_expand() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "Lemmas 3.1 and 3.2 imply the claim");

    assert_eq!(outcome.mentions, vec!["Lemmas 3.1 and 3.2"]);
    assert_eq!(outcome.intra, vec!["Lemma 3.1", "Lemma 3.2"]);
}

#[test]
fn test_comma_separated_mentions_expand() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "by Propositions 2, 3 and 4 we are done");

    assert_eq!(outcome.intra, vec!["Proposition 2", "Proposition 3", "Proposition 4"]);
}

#[test]
fn test_abbreviations_expand_to_long_form() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "see Thm. 4.2 here");

    assert_eq!(outcome.mentions, vec!["Thm. 4.2"]);
    assert_eq!(outcome.intra, vec!["theorem 4.2"]);
}

#[test]
fn test_extra_expansion_pairs_every_number_with_the_tag() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "see <LINK:knu84> Lemmas 2 and 5 there");

    assert_eq!(
        outcome.extra,
        vec![
            ("knu84".to_string(), "Lemma 2".to_string()),
            ("knu84".to_string(), "Lemma 5".to_string())
        ]
    );
}

#[test]
fn test_nearest_marker_wins() {
    let lexicon = RefLexicon::default();
    let outcome =
        lexicon.find_references(None, "a <LINK:far> b c d <LINK:near> Theorem 5 x");

    assert_eq!(
        outcome.extra,
        vec![("near".to_string(), "theorem 5".to_string())]
    );
}

#[test]
fn test_preceding_marker_beats_following_at_equal_distance() {
    let lexicon = RefLexicon::default();
    let outcome =
        lexicon.find_references(None, "w x <LINK:bef> Theorem 6 <LINK:aft> y");

    assert_eq!(
        outcome.extra,
        vec![("bef".to_string(), "theorem 6".to_string())]
    );
}

#[test]
fn test_following_marker_found_when_nothing_precedes() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "w Theorem 7 <LINK:aft> z");

    assert_eq!(
        outcome.extra,
        vec![("aft".to_string(), "theorem 7".to_string())]
    );
}

#[test]
fn test_marker_outside_window_is_ignored() {
    let lexicon = RefLexicon::default();
    let outcome =
        lexicon.find_references(None, "<LINK:far> a b c d e f Theorem 8 x");

    assert_eq!(outcome.intra, vec!["theorem 8"]);
    assert!(outcome.extra.is_empty());
}

#[test]
fn test_repeated_occurrences_classified_independently() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "Lemma 2 holds and also Lemma 2 again");

    // One mention, two occurrences; deduplication is the assembler's job.
    assert_eq!(outcome.mentions, vec!["Lemma 2"]);
    assert_eq!(outcome.intra, vec!["lemma 2", "lemma 2"]);
}

#[test]
fn test_classification_is_deterministic() {
    let lexicon = RefLexicon::default();
    let text = "w x <LINK:bef> Theorem 6 <LINK:aft> y and Lemma 2 besides";
    let first = lexicon.find_references(None, text);
    let second = lexicon.find_references(None, text);
    assert_eq!(first, second);
}

#[test]
fn test_longer_numeric_tails_are_not_truncated() {
    let lexicon = RefLexicon::default();
    let outcome = lexicon.find_references(None, "apply Theorem 3.12 now");

    // "Theorem 3.12" must not also be located as "Theorem 3.1".
    assert_eq!(outcome.mentions, vec!["Theorem 3.12"]);
    assert_eq!(outcome.intra, vec!["theorem 3.12"]);
}
