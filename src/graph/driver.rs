use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::graph::assemble::{assemble, PaperGraph};
use crate::graph::corpus::Corpus;
use crate::graph::identifiers::IdentifierMap;
use crate::graph::mentions::RefLexicon;
use crate::graph::segment::segment;
use crate::graph::{Edge, ResultRecord};

/// Driver configuration: chunking, worker pool size and checkpoint target.
/// `jobs: None` selects fully sequential processing with the same chunked
/// checkpoint behavior.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub chunk_size: usize,
    pub jobs: Option<usize>,
    pub output_dir: PathBuf,
    pub run_name: String,
}

impl BatchOptions {
    pub fn new(output_dir: PathBuf, run_name: impl Into<String>) -> Self {
        BatchOptions {
            chunk_size: 1000,
            jobs: Some(4),
            output_dir,
            run_name: run_name.into(),
        }
    }
}

/// Totals of one driver run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub results: usize,
    pub links: usize,
}

/// Run the whole extraction pipeline over a corpus.
///
/// Papers are processed in fixed-size chunks; within a chunk each paper's
/// `segment → assemble` pipeline runs on a bounded worker pool (or inline
/// when `jobs` is unset). After every chunk the cumulative `results` and
/// `links` tables are rewritten atomically, so a crash loses at most the
/// in-flight chunk.
pub fn run_extraction<C: Corpus>(
    corpus: &C,
    identifiers: &IdentifierMap,
    lexicon: &RefLexicon,
    options: &BatchOptions,
) -> Result<RunSummary> {
    let papers = corpus.paper_ids();
    let chunk_size = options.chunk_size.max(1);
    let n_chunks = papers.len().div_ceil(chunk_size);

    let pool = match options.jobs {
        Some(jobs) => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs.max(1))
                .build()
                .context("Failed to build worker thread pool")?,
        ),
        None => None,
    };

    let mut all_results: Vec<ResultRecord> = Vec::new();
    let mut all_links: Vec<Edge> = Vec::new();
    let mut summary = RunSummary::default();

    for (i, chunk) in papers.chunks(chunk_size).enumerate() {
        info!("Chunk {}/{}", i + 1, n_chunks);

        let outputs: Vec<Option<PaperGraph>> = match &pool {
            Some(pool) => pool.install(|| {
                chunk
                    .par_iter()
                    .map(|paper| process_paper(corpus, paper, identifiers, lexicon))
                    .collect()
            }),
            None => chunk
                .iter()
                .map(|paper| process_paper(corpus, paper, identifiers, lexicon))
                .collect(),
        };

        for output in outputs {
            match output {
                Some(graph) => {
                    summary.processed += 1;
                    all_results.extend(graph.results);
                    all_links.extend(graph.edges);
                }
                None => summary.skipped += 1,
            }
        }

        write_checkpoint(options, &all_results, &all_links)?;
        info!("Saved {} results, {} links", all_results.len(), all_links.len());
    }

    if papers.is_empty() {
        warn!("Corpus contains no papers; writing empty output tables");
        write_checkpoint(options, &all_results, &all_links)?;
    }

    summary.results = all_results.len();
    summary.links = all_links.len();
    Ok(summary)
}

/// One paper's pipeline. A missing token stream skips the paper.
fn process_paper<C: Corpus>(
    corpus: &C,
    paper: &str,
    identifiers: &IdentifierMap,
    lexicon: &RefLexicon,
) -> Option<PaperGraph> {
    let rows = corpus.token_rows(paper)?;
    let regions = corpus.regions(paper);
    let blocks = segment(&rows, &regions);
    Some(assemble(paper, &blocks, identifiers.for_paper(paper), lexicon))
}

/// Rewrite both cumulative output tables.
fn write_checkpoint(
    options: &BatchOptions,
    results: &[ResultRecord],
    links: &[Edge],
) -> Result<()> {
    write_table(
        &options.output_dir,
        &format!("graph_results_{}.csv", options.run_name),
        &["pdf_from", "result"],
        results,
    )?;
    write_table(
        &options.output_dir,
        &format!("graph_intra_extra_{}.csv", options.run_name),
        &[
            "pdf_from",
            "nres_in",
            "theorem_in",
            "theorem_ref",
            "intra",
            "ref_tag",
            "pdf_to",
        ],
        links,
    )
}

/// Serialize one table to a temp file, then atomically replace the target.
fn write_table<T: Serialize>(
    dir: &Path,
    filename: &str,
    header: &[&str],
    rows: &[T],
) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {dir:?}"))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut tmp);
        writer.write_record(header)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    let target = dir.join(filename);
    tmp.persist(&target)
        .with_context(|| format!("Failed to replace output table {target:?}"))?;
    Ok(())
}
