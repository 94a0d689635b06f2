use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::normalize::normalize;
use crate::graph::{DestPoint, RegionClassify, ResultBlock, TokenRow};

// Leading result name: "Theorem 3.1", "Open Problem 2", "Lemma a.4.2".
static RESULT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^((open )?(\w+) ([a-z]\.)?\d+(\.\d+)*)")
        .expect("Invalid result name regex pattern")
});

// Numeral inside a link span pointing at an in-document result.
static NUMERAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(([a-z]\.)?\d+(\.\d+)*)").expect("Invalid numeral regex pattern")
});

// Link anchors sit slightly above the region box they target.
const DEST_Y_SHIFT: f64 = 10.0;
const DEST_EXTEND: f64 = 20.0;

/// The name of a result, taken from the leading phrase of its text.
/// `None` when the block does not start with a recognizable name.
pub fn derive_result_name(text: &str) -> Option<String> {
    RESULT_NAME_REGEX
        .find(text)
        .map(|m| m.as_str().to_string())
}

/// Suffix every numeral with the in-document marker consumed later by the
/// mention scanner.
fn mark_numerals(text: &str) -> String {
    NUMERAL_REGEX.replace_all(text, "${1}#in").into_owned()
}

/// An open hyperlink span and the kind of region its destination landed in.
struct LinkSpan {
    group: i64,
    is_text: bool,
}

struct SegmentState {
    blocks: Vec<ResultBlock>,
    index: HashMap<i64, usize>,
    current: Option<i64>,
    link: Option<LinkSpan>,
}

impl SegmentState {
    fn block_mut(&mut self, id: i64) -> &mut ResultBlock {
        let idx = self.index[&id];
        &mut self.blocks[idx]
    }

    /// Close the open link span, terminating its `<LINK:` marker if one was
    /// emitted (destinations classified as prose; result-targeting links
    /// carry `#in` suffixes instead of markers).
    fn close_link(&mut self) {
        if let Some(span) = self.link.take() {
            if span.is_text {
                if let Some(id) = self.current {
                    self.block_mut(id).text.push('>');
                }
            }
        }
    }
}

/// Fold a paper's token stream into its labeled result blocks, in discovery
/// order. Each distinct `result_id` yields exactly one block whose category
/// is fixed by the first token seen for that id; hyperlink spans are
/// rendered as `<LINK:tag>` markers (prose destinations) or `#in` numeral
/// suffixes (result destinations, decided through `regions` when the span
/// opens).
pub fn segment(rows: &[TokenRow], regions: &dyn RegionClassify) -> Vec<ResultBlock> {
    let mut state = SegmentState {
        blocks: Vec::new(),
        index: HashMap::new(),
        current: None,
        link: None,
    };

    for row in rows {
        if row.is_outside() {
            if state.current.is_some() {
                state.close_link();
                state.current = None;
            }
            continue;
        }

        let id = row.result_id;
        if state.current.map_or(false, |current| current != id) {
            // Leaving the previous block; its link span cannot straddle it.
            state.close_link();
        }

        if !state.index.contains_key(&id) {
            state.index.insert(id, state.blocks.len());
            state.blocks.push(ResultBlock {
                result_id: id,
                category: row.category().to_string(),
                text: row.text.clone(),
                name: None,
            });
            state.link = None;
        } else if row.link_group >= 0 {
            let open = state.link.as_ref().map(|span| (span.group, span.is_text));
            match open {
                Some((group, is_text)) if group == row.link_group => {
                    if is_text {
                        // Inside an open marker, tokens are glued together.
                        state.block_mut(id).text.push_str(&row.text);
                    } else {
                        let marked = mark_numerals(&row.text);
                        let block = state.block_mut(id);
                        block.text.push(' ');
                        block.text.push_str(&marked);
                    }
                }
                _ => {
                    // A new link group opens: classify its destination now.
                    let dest = DestPoint {
                        page: row.dest_page,
                        x: row.dest_x,
                        y: row.dest_y + DEST_Y_SHIFT,
                    };
                    let is_text = regions.classify(&dest, DEST_EXTEND).is_text();
                    state.close_link();
                    let block = state.block_mut(id);
                    if is_text {
                        block.text.push_str(" <LINK:");
                        block.text.push_str(&row.text);
                    } else {
                        block.text.push(' ');
                        block.text.push_str(&row.text);
                    }
                    state.link = Some(LinkSpan {
                        group: row.link_group,
                        is_text,
                    });
                }
            }
        } else if state.link.is_some() {
            state.close_link();
            let block = state.block_mut(id);
            block.text.push(' ');
            block.text.push_str(&row.text);
        } else {
            let block = state.block_mut(id);
            block.text.push(' ');
            block.text.push_str(&row.text);
        }

        state.current = Some(id);
    }

    // End of stream closes any open result and link implicitly.
    if state.current.is_some() {
        state.close_link();
    }

    let mut blocks = state.blocks;
    for block in &mut blocks {
        block.text = normalize(&block.text);
        if block.category != "proof" {
            block.name = derive_result_name(&block.text);
        }
    }
    blocks
}
