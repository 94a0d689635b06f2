use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::identifiers::RefTable;
use crate::graph::mentions::RefLexicon;
use crate::graph::{Edge, ResultBlock, ResultRecord};

// Explicit attribution phrase: "Proof. [Theorem 5.2]".
static PROOF_TARGET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Proof\. \[([^\]]+)\]").expect("Invalid proof target regex pattern")
});
static TARGET_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)((\w+) ([a-z]\.)?\d+(\.\d+)*)").expect("Invalid target name regex pattern")
});

/// The result a proof explicitly claims to prove, when its text carries the
/// bracketed attribution phrase.
pub fn find_proof_target(text: &str) -> Option<String> {
    let bracket = PROOF_TARGET_REGEX.captures(text)?;
    TARGET_NAME_REGEX
        .find(bracket.get(1).unwrap().as_str())
        .map(|m| m.as_str().to_string())
}

/// The citation graph contribution of one paper.
#[derive(Debug, Clone, Default)]
pub struct PaperGraph {
    pub results: Vec<ResultRecord>,
    pub edges: Vec<Edge>,
}

/// Turn one paper's segmented blocks into its result records and citation
/// edges.
///
/// Blocks are visited in discovery order. A proof is attributed to the
/// result named by its explicit "Proof. [...]" phrase, falling back to the
/// most recent non-proof result; other blocks carry their own derived name.
/// Each block's text is scanned for reference mentions with the attributed
/// name as self-reference context; the scanner's outputs are deduplicated
/// per block. In-document references become self-targeted edges;
/// cross-document references resolve their tag through the paper's
/// reference table, keeping a null target when the tag is unknown.
pub fn assemble(
    paper: &str,
    blocks: &[ResultBlock],
    refs: Option<&RefTable>,
    lexicon: &RefLexicon,
) -> PaperGraph {
    let mut last_theorem: Option<String> = None;
    let mut names: BTreeSet<Option<String>> = BTreeSet::new();
    let mut edges = Vec::new();

    for block in blocks {
        let attributed = if block.category == "proof" {
            find_proof_target(&block.text).or_else(|| last_theorem.clone())
        } else {
            last_theorem = block.name.clone();
            block.name.clone()
        };
        names.insert(attributed.clone());

        let scan = lexicon.find_references(attributed.as_deref(), &block.text);
        let intra: BTreeSet<String> = scan.intra.into_iter().collect();
        let extra: BTreeSet<(String, String)> = scan.extra.into_iter().collect();

        for target in intra {
            edges.push(Edge {
                pdf_from: paper.to_string(),
                nres_in: block.result_id,
                theorem_in: attributed.clone(),
                theorem_ref: target,
                intra: true,
                ref_tag: None,
                pdf_to: Some(paper.to_string()),
            });
        }
        for (tag, target_name) in extra {
            let pdf_to = refs.and_then(|table| table.get(&tag)).cloned();
            edges.push(Edge {
                pdf_from: paper.to_string(),
                nres_in: block.result_id,
                theorem_in: attributed.clone(),
                theorem_ref: target_name,
                intra: false,
                ref_tag: Some(tag),
                pdf_to,
            });
        }
    }

    let results = names
        .into_iter()
        .map(|name| ResultRecord {
            pdf_from: paper.to_string(),
            result: name,
        })
        .collect();

    PaperGraph { results, edges }
}
