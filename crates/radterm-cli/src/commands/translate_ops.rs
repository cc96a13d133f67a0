use std::path::Path;
use std::process;
use std::sync::Arc;

use radterm_core::build::batch::{read_terms, translate_batch, BatchOptions, BatchSummary};
use radterm_core::lookup::{DecsClient, FileCache, LookupCache, UreqTransport};
use radterm_core::{Engine, EngineOptions};

use crate::curated_dir::CuratedDir;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Term budget of a smoke run when none is given.
pub const SMOKE_MAX_TERMS: usize = 200;

pub struct EngineArgs<'a> {
    pub curated_dir: &'a str,
    pub cache_file: &'a str,
    pub options: EngineOptions,
}

pub struct TranslateArgs<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub resume: bool,
    pub max_terms: Option<usize>,
    pub smoke: bool,
}

type Client = Arc<DecsClient<UreqTransport>>;

fn build_engine(args: &EngineArgs<'_>) -> (Engine, Option<Client>) {
    let curated = CuratedDir::new(args.curated_dir);
    let overrides = die!(curated.overrides(), "Error loading overrides: {}");
    let generic = die!(curated.generic_terms(), "Error loading generic terms: {}");
    eprintln!(
        "Curated: {} overrides, {} generic terms",
        overrides.len(),
        generic.len()
    );

    let engine = Engine::new()
        .with_overrides(overrides)
        .with_generic_terms(generic)
        .with_options(args.options);
    if args.options.no_external {
        return (engine, None);
    }

    let cache = die!(
        FileCache::open(Path::new(args.cache_file)),
        "Error opening cache {}: {}",
        args.cache_file
    );
    eprintln!("Cache: {} entries", cache.len());
    let cache: Arc<dyn LookupCache> = Arc::new(cache);
    let client = Arc::new(DecsClient::from_settings(cache));
    (engine.with_lookup(client.clone()), Some(client))
}

fn finish_client(client: Option<Client>) {
    let Some(client) = client else {
        return;
    };
    die!(client.flush(), "Error flushing cache: {}");
    let stats = client.stats();
    eprintln!(
        "DeCS: {} requests, {} cache hits, {} failures",
        stats.requests(),
        stats.cache_hits(),
        stats.failures()
    );
}

fn print_summary(summary: &BatchSummary, output: &str) {
    println!("Processed: {} (skipped {})", summary.processed, summary.skipped);
    println!("Status:");
    for (status, n) in &summary.status_counts {
        println!("  {status}: {n}");
    }
    println!("Types:");
    for (ty, n) in &summary.type_counts {
        println!("  {ty}: {n}");
    }
    println!("ok changed:   {}", summary.ok_changed);
    println!("ok unchanged: {}", summary.ok_unchanged);
    println!("Output: {output}");
}

pub fn translate(engine_args: &EngineArgs<'_>, args: &TranslateArgs<'_>) {
    let terms = die!(read_terms(Path::new(args.input)), "Error reading terms: {}");
    let max_terms = args
        .max_terms
        .or(args.smoke.then_some(SMOKE_MAX_TERMS));
    let (engine, client) = build_engine(engine_args);

    let opts = BatchOptions {
        resume: args.resume,
        max_terms,
    };
    let summary = die!(
        translate_batch(&engine, &terms, Path::new(args.output), opts),
        "Error translating: {}"
    );
    finish_client(client);
    print_summary(&summary, args.output);
    if summary.ok_unchanged > 0 {
        eprintln!("Error: {} ok records are unchanged", summary.ok_unchanged);
        process::exit(1);
    }
}

/// Resolve one term and print its record as JSON.
pub fn term(engine_args: &EngineArgs<'_>, term: &str) {
    let (engine, client) = build_engine(engine_args);
    let record = engine.translate(term, 1);
    finish_client(client);
    let json = die!(serde_json::to_string_pretty(&record), "Error: {}");
    println!("{json}");
}
