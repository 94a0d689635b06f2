use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use thmgraph::graph::driver::{run_extraction, BatchOptions};
use thmgraph::graph::identifiers::{merge, IdentifierMap};
use thmgraph::graph::mentions::RefLexicon;
use thmgraph::graph::corpus::{Corpus, CsvCorpus};

/// CLI app for mining labeled papers for formal results and building the
/// cross-document citation graph
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding per-paper token tables (<paper>.tokens.csv)
    #[arg(short, long)]
    corpus: PathBuf,
    /// Bibliographic index file (columns: source,identifiant,target)
    #[arg(short, long)]
    ref_index: PathBuf,
    /// Cached lookup-service dictionary (JSON, optional second source)
    #[arg(long)]
    cached_refs: Option<PathBuf>,
    /// Directory receiving the two output tables
    #[arg(short, long)]
    output: PathBuf,
    /// Run name, used in the output file names
    #[arg(short, long, default_value = "all")]
    name: String,
    /// Papers per checkpoint chunk
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,
    /// Worker pool size
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,
    /// Process papers one by one instead of using the worker pool
    #[arg(long)]
    sequential: bool,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let t0 = Instant::now();
    info!("Loading identifier sources");
    let primary = IdentifierMap::from_index_csv(&args.ref_index)
        .with_context(|| format!("Failed to load reference index {:?}", args.ref_index))?;
    let identifiers = match &args.cached_refs {
        Some(path) => {
            let secondary = IdentifierMap::from_cached_lookup(path)
                .with_context(|| format!("Failed to load cached lookup {:?}", path))?;
            let (merged, report) = merge(primary, secondary);
            info!(
                "Identifier merge: {} accepted, {} rejected, {} added",
                report.accepted, report.rejected, report.added
            );
            merged
        }
        None => primary,
    };

    let t1 = Instant::now();
    info!("Opening corpus at {:?}", args.corpus);
    let corpus = CsvCorpus::open(&args.corpus)
        .with_context(|| format!("Failed to open corpus {:?}", args.corpus))?;
    let n_papers = corpus.paper_ids().len();
    if n_papers == 0 {
        anyhow::bail!("No papers found under {:?} (expected <paper>.tokens.csv files)", args.corpus);
    }
    info!("Found {} papers", n_papers);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {:?}", args.output))?;

    let mut options = BatchOptions::new(args.output.clone(), args.name.clone());
    options.chunk_size = args.chunk_size;
    options.jobs = if args.sequential { None } else { Some(args.jobs) };

    let t2 = Instant::now();
    info!("Extracting results and links");
    let lexicon = RefLexicon::default();
    let summary = run_extraction(&corpus, &identifiers, &lexicon, &options)?;

    let t3 = Instant::now();
    info!(
        "Processed {} papers ({} skipped): {} results, {} links",
        summary.processed, summary.skipped, summary.results, summary.links
    );
    info!("Identifier loading: {:.2}s", (t1 - t0).as_secs_f64());
    info!("Corpus discovery: {:.2}s", (t2 - t1).as_secs_f64());
    info!("Extraction: {:.2}s", (t3 - t2).as_secs_f64());

    Ok(())
}
