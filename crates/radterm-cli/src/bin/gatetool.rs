use std::path::PathBuf;

use clap::{Parser, Subcommand};

use radterm_cli::commands::gate_ops::{self, GateArgs};

#[derive(Parser)]
#[command(name = "gatetool", about = "Vocabulary gate over the resolved dictionary")]
struct Cli {
    /// Resolved dictionary CSV
    #[arg(long = "dict", default_value = "dist/dictionary_full.csv")]
    dictionary: String,
    /// Append-only log of unresolved terms
    #[arg(long, default_value = "needs_review_hits.jsonl")]
    log: String,
    /// Alternatives CSV (term_en, alt_en)
    #[arg(long)]
    alternatives: Option<String>,
    /// Write JSON traces to this directory (requires --features trace)
    #[arg(long)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up English terms
    Lookup {
        /// Terms to look up
        terms: Vec<String>,
        /// File with one term per line
        #[arg(long)]
        input: Option<String>,
    },
    /// Validate and rewrite a text
    Rewrite {
        /// Text to rewrite
        text: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let _trace_guard = cli.trace_dir.as_deref().and_then(radterm::init_tracing);
    let args = GateArgs {
        dictionary: &cli.dictionary,
        log: &cli.log,
        alternatives: cli.alternatives.as_deref(),
    };

    match &cli.command {
        Command::Lookup { terms, input } => gate_ops::lookup(&args, terms, input.as_deref()),
        Command::Rewrite { text, json } => gate_ops::rewrite(&args, text, *json),
    }
}
