use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::graph::{DestPoint, RegionClassify, RegionHit, TokenRow};

const TOKENS_SUFFIX: &str = ".tokens.csv";
const REGIONS_SUFFIX: &str = ".regions.csv";

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to scan corpus directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("corpus root {0:?} is not a directory")]
    NotADirectory(PathBuf),
}

/// One labeled bounding box of a paper, produced by the external layout
/// stage.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultRegion {
    pub page: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: String,
    pub result_id: i64,
}

/// Point-in-box classifier over a paper's labeled result regions. A link
/// destination landing in none of them is ordinary prose.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    regions: Vec<ResultRegion>,
}

impl RegionIndex {
    pub fn new(regions: Vec<ResultRegion>) -> Self {
        RegionIndex { regions }
    }
}

impl RegionClassify for RegionIndex {
    fn classify(&self, point: &DestPoint, extend: f64) -> RegionHit {
        for region in &self.regions {
            if region.page == point.page
                && point.x >= region.x - extend
                && point.x <= region.x + region.width + extend
                && point.y >= region.y - extend
                && point.y <= region.y + region.height + extend
            {
                return RegionHit {
                    kind: region.kind.clone(),
                    result_id: Some(region.result_id),
                };
            }
        }
        RegionHit::text()
    }
}

/// Per-paper input source for the batch driver. `token_rows` returning
/// `None` means the paper's stream cannot be built and the paper is
/// skipped; it is never a batch failure.
pub trait Corpus: Sync {
    fn paper_ids(&self) -> Vec<String>;
    fn token_rows(&self, paper: &str) -> Option<Vec<TokenRow>>;
    fn regions(&self, paper: &str) -> RegionIndex;
}

/// File-backed corpus: every `<paper>.tokens.csv` under the root directory
/// is one paper, with an optional `<paper>.regions.csv` sibling holding its
/// labeled bounding boxes.
pub struct CsvCorpus {
    papers: Vec<String>,
    files: HashMap<String, PathBuf>,
}

impl CsvCorpus {
    pub fn open(root: &Path) -> Result<Self, CorpusError> {
        if !root.is_dir() {
            return Err(CorpusError::NotADirectory(root.to_path_buf()));
        }

        let mut files = HashMap::new();
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Some(paper) = name.strip_suffix(TOKENS_SUFFIX) {
                files.insert(paper.to_string(), entry.path().to_path_buf());
            }
        }
        // Discovery order depends on the filesystem; sort for stable runs.
        let mut papers: Vec<String> = files.keys().cloned().collect();
        papers.sort();

        Ok(CsvCorpus { papers, files })
    }

    fn regions_file(&self, paper: &str) -> Option<PathBuf> {
        self.files
            .get(paper)
            .map(|tokens| tokens.with_file_name(format!("{paper}{REGIONS_SUFFIX}")))
    }
}

impl Corpus for CsvCorpus {
    fn paper_ids(&self) -> Vec<String> {
        self.papers.clone()
    }

    fn token_rows(&self, paper: &str) -> Option<Vec<TokenRow>> {
        let path = self.files.get(paper)?;
        let mut reader = match csv::Reader::from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Skipping paper {paper}: cannot open {path:?}: {e}");
                return None;
            }
        };
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Skipping paper {paper}: malformed token row in {path:?}: {e}");
                    return None;
                }
            }
        }
        Some(rows)
    }

    fn regions(&self, paper: &str) -> RegionIndex {
        let path = match self.regions_file(paper) {
            Some(path) if path.exists() => path,
            _ => return RegionIndex::default(),
        };
        let mut reader = match csv::Reader::from_path(&path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Ignoring region table for paper {paper}: {e}");
                return RegionIndex::default();
            }
        };
        let mut regions = Vec::new();
        for row in reader.deserialize() {
            match row {
                Ok(row) => regions.push(row),
                Err(e) => {
                    warn!("Ignoring malformed region row for paper {paper}: {e}");
                }
            }
        }
        RegionIndex::new(regions)
    }
}
