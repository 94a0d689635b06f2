use serde::{Deserialize, Serialize};

pub mod assemble;
pub mod corpus;
pub mod driver;
pub mod identifiers;
pub mod mentions;
pub mod normalize;
pub mod segment;

pub use assemble::{assemble, PaperGraph};
pub use corpus::{Corpus, CsvCorpus, RegionIndex};
pub use driver::{run_extraction, BatchOptions, RunSummary};
pub use identifiers::{merge, IdentifierMap, MergeReport};
pub use mentions::{RefLexicon, ScanOutcome};
pub use normalize::normalize;
pub use segment::{derive_result_name, segment};

/// One token of a paper's body text, as produced by the external layout
/// labeling stage. `result_id` and `link_group` use -1 as the "none"
/// sentinel; the destination fields are only meaningful while
/// `link_group >= 0`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRow {
    pub text: String,
    /// `O`, or `B-<category>` / `I-<category>`.
    pub label: String,
    pub result_id: i64,
    pub link_group: i64,
    pub dest_page: i64,
    pub dest_x: f64,
    pub dest_y: f64,
}

impl TokenRow {
    /// True when the token sits outside any labeled result span.
    pub fn is_outside(&self) -> bool {
        self.label.starts_with('O')
    }

    /// The category part of a `B-`/`I-` label ("theorem", "proof", ...).
    pub fn category(&self) -> &str {
        match self.label.split_once('-') {
            Some((_, cat)) => cat,
            None => &self.label,
        }
    }
}

/// One contiguous labeled span of a paper, reconstructed from its tokens.
///
/// The text carries `<LINK:tag>` markers around hyperlink spans that point
/// at ordinary prose, and `#in` suffixes on numerals inside hyperlink spans
/// that point at a result region of the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBlock {
    pub result_id: i64,
    pub category: String,
    pub text: String,
    /// Derived leading name ("Theorem 3.1"); `None` for proofs and for
    /// blocks whose text yields no recognizable name.
    pub name: Option<String>,
}

/// Destination of a hyperlink, in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DestPoint {
    pub page: i64,
    pub x: f64,
    pub y: f64,
}

/// Answer of the bounding-box classifier for a link destination.
/// `kind == "Text"` means the link lands in ordinary prose.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionHit {
    pub kind: String,
    pub result_id: Option<i64>,
}

impl RegionHit {
    pub fn text() -> Self {
        RegionHit {
            kind: "Text".to_string(),
            result_id: None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == "Text"
    }
}

/// Classifies a link destination point against the paper's labeled result
/// regions. Implemented by [`RegionIndex`]; the segmenter only depends on
/// this seam.
pub trait RegionClassify {
    fn classify(&self, point: &DestPoint, extend: f64) -> RegionHit;
}

/// One citation graph arc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub pdf_from: String,
    pub nres_in: i64,
    pub theorem_in: Option<String>,
    pub theorem_ref: String,
    pub intra: bool,
    pub ref_tag: Option<String>,
    pub pdf_to: Option<String>,
}

/// One distinct named result discovered in a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub pdf_from: String,
    pub result: Option<String>,
}
