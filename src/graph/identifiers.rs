use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static NON_WORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W").expect("Invalid non-word regex pattern"));

#[derive(Error, Debug)]
pub enum IdentifierError {
    #[error("failed to read identifier source: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed identifier index row: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed cached lookup file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-paper table from cleaned reference tag to target paper id.
pub type RefTable = HashMap<String, String>;

/// Lookup from a citing paper to the papers its reference tags point at,
/// built from two independently constructed sources (a bibliographic index
/// file and a cached lookup-service result) and merged with per-key
/// agreement voting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierMap {
    papers: HashMap<String, RefTable>,
}

/// One row of the bibliographic index file.
#[derive(Debug, Deserialize)]
struct IndexRow {
    source: String,
    identifiant: String,
    target: Option<String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the bibliographic index file (columns `source,identifiant,target`).
    /// Tags are stripped of non-word characters; rows without a target are
    /// dropped.
    pub fn from_index_csv(path: &Path) -> Result<Self, IdentifierError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut map = Self::new();
        for row in reader.deserialize() {
            let row: IndexRow = row?;
            let target = match row.target {
                Some(t) if !t.is_empty() => t,
                _ => continue,
            };
            let tag = NON_WORD_REGEX.replace_all(&row.identifiant, "").to_string();
            map.insert(row.source, tag, target);
        }
        debug!("Loaded identifier index for {} papers from {:?}", map.len(), path);
        Ok(map)
    }

    /// Load the lookup service's cached result: a JSON object mapping each
    /// paper to its `{tag: target}` table.
    pub fn from_cached_lookup(path: &Path) -> Result<Self, IdentifierError> {
        let content = fs::read_to_string(path)?;
        let papers: HashMap<String, RefTable> = serde_json::from_str(&content)?;
        Ok(IdentifierMap { papers })
    }

    pub fn insert(&mut self, paper: String, tag: String, target: String) {
        self.papers.entry(paper).or_default().insert(tag, target);
    }

    /// The reference table of one citing paper, if any is known.
    pub fn for_paper(&self, paper: &str) -> Option<&RefTable> {
        self.papers.get(paper)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// Outcome counts of [`merge`]: keys present in both sources that passed or
/// failed the agreement vote, and keys copied wholesale from the secondary
/// source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub accepted: usize,
    pub rejected: usize,
    pub added: usize,
}

/// Merge two identifier maps, the primary source winning on conflicts.
///
/// For each paper key of the secondary source: keys absent from the primary
/// are copied wholesale. For keys present in both, the agreement ratio is
/// computed over the tags both tables know: if any tags are shared and
/// fewer than half agree on the target, the whole secondary entry is
/// discarded as untrustworthy; otherwise the secondary tags missing from
/// the primary table are added. Existing primary entries are never
/// overwritten.
pub fn merge(primary: IdentifierMap, secondary: IdentifierMap) -> (IdentifierMap, MergeReport) {
    let mut merged = primary;
    let mut report = MergeReport::default();

    for (paper, table) in secondary.papers {
        match merged.papers.entry(paper) {
            Entry::Vacant(slot) => {
                slot.insert(table);
                report.added += 1;
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                let mut shared = 0usize;
                let mut agreeing = 0usize;
                for (tag, target) in &table {
                    if let Some(known) = existing.get(tag) {
                        shared += 1;
                        if known == target {
                            agreeing += 1;
                        }
                    }
                }
                if shared > 0 && (agreeing as f64) / (shared as f64) < 0.5 {
                    report.rejected += 1;
                    continue;
                }
                report.accepted += 1;
                for (tag, target) in table {
                    existing.entry(tag).or_insert(target);
                }
            }
        }
    }

    info!(
        "Merged identifier sources: {} accepted, {} rejected, {} added",
        report.accepted, report.rejected, report.added
    );
    (merged, report)
}
