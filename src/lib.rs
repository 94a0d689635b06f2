pub mod graph;

pub use graph::{
    assemble, merge, normalize, run_extraction, segment, BatchOptions, Corpus, CsvCorpus,
    IdentifierMap, MergeReport, PaperGraph, RefLexicon, RegionIndex, RunSummary, ScanOutcome,
};
