use std::path::PathBuf;

use clap::{Parser, Subcommand};

use radterm_cli::commands::build_ops::{self, PostprocessArgs};
use radterm_cli::commands::translate_ops::{self, EngineArgs, TranslateArgs};
use radterm_cli::commands::{cache_ops, config_ops};
use radterm_core::EngineOptions;

#[derive(Parser)]
#[command(name = "termtool", about = "Radiology terminology translation tool")]
struct Cli {
    /// Custom settings TOML (defaults are embedded)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Write JSON traces to this directory (requires --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct EngineFlags {
    /// Directory holding the curated CSV tables
    #[arg(long, default_value = ".")]
    curated_dir: String,
    /// External lookup cache log
    #[arg(long, default_value = "decs_cache.log")]
    cache: String,
    /// Never call the external lookup
    #[arg(long)]
    no_external: bool,
    /// Call the external lookup even when a local candidate is ok
    #[arg(long, conflicts_with = "no_external")]
    force_external: bool,
}

impl EngineFlags {
    fn args(&self) -> EngineArgs<'_> {
        EngineArgs {
            curated_dir: &self.curated_dir,
            cache_file: &self.cache,
            options: EngineOptions {
                no_external: self.no_external,
                force_external: self.force_external,
            },
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Translate a term list (one per line) into a JSONL record stream
    Translate {
        /// Input file, one English term per line
        input: String,
        /// Output JSONL file
        #[arg(short, long, default_value = "translations.full.jsonl")]
        output: String,
        /// Continue an interrupted run
        #[arg(long)]
        resume: bool,
        /// Stop after this many terms
        #[arg(long)]
        max_terms: Option<usize>,
        /// Quick run over the first 200 terms unless --max-terms is given
        #[arg(long)]
        smoke: bool,
        #[command(flatten)]
        engine: EngineFlags,
    },
    /// Resolve a single term and print its record
    Term {
        /// English term
        term: String,
        #[command(flatten)]
        engine: EngineFlags,
    },
    /// Re-apply overrides, normalizer rules and the DeCS sanity filter
    Postprocess {
        /// Input JSONL record stream
        #[arg(short, long, default_value = "translations.full.jsonl")]
        input: String,
        /// Output JSONL record stream
        #[arg(short, long, default_value = "translations.normalized.jsonl")]
        output: String,
        /// Directory holding the curated CSV tables
        #[arg(long, default_value = ".")]
        curated_dir: String,
        #[arg(long)]
        apply_overrides: bool,
        #[arg(long)]
        apply_normalizer: bool,
        #[arg(long)]
        apply_sanity: bool,
        /// Normalizer rules TOML
        #[arg(long, default_value = "normalizer_rules.toml")]
        normalizer_path: String,
    },
    /// Build the resolved dictionary from a post-processed record stream
    Build {
        /// Input JSONL record stream
        #[arg(short, long, default_value = "translations.normalized.jsonl")]
        input: String,
        /// Output directory
        #[arg(short, long, default_value = "dist")]
        outdir: String,
        /// Directory holding the curated CSV tables and radiology lexicon
        #[arg(long, default_value = ".")]
        curated_dir: String,
    },
    /// Show lookup cache statistics
    CacheInfo {
        /// Cache log file
        file: String,
    },
    /// Show the cached lookup for a term
    CacheGet {
        /// Cache log file
        file: String,
        /// Exact query term
        term: String,
    },
    /// Rewrite the cache log with one frame per term
    CacheCompact {
        /// Cache log file
        file: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Export the embedded lexicon as TOML
    LexiconExport,
    /// Validate a lexicon TOML file
    LexiconValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let _trace_guard = cli.trace_dir.as_deref().and_then(radterm::init_tracing);
    config_ops::load_settings(cli.settings.as_deref());

    match cli.command {
        Command::Translate {
            input,
            output,
            resume,
            max_terms,
            smoke,
            engine,
        } => translate_ops::translate(
            &engine.args(),
            &TranslateArgs {
                input: &input,
                output: &output,
                resume,
                max_terms,
                smoke,
            },
        ),
        Command::Term { term, engine } => translate_ops::term(&engine.args(), &term),
        Command::Postprocess {
            input,
            output,
            curated_dir,
            apply_overrides,
            apply_normalizer,
            apply_sanity,
            normalizer_path,
        } => build_ops::postprocess(&PostprocessArgs {
            input: &input,
            output: &output,
            curated_dir: &curated_dir,
            apply_overrides,
            apply_normalizer,
            apply_sanity,
            normalizer_path: &normalizer_path,
        }),
        Command::Build {
            input,
            outdir,
            curated_dir,
        } => build_ops::build(&input, &outdir, &curated_dir),
        Command::CacheInfo { file } => cache_ops::info(&file),
        Command::CacheGet { file, term } => cache_ops::get(&file, &term),
        Command::CacheCompact { file } => cache_ops::compact(&file),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
        Command::LexiconExport => config_ops::lexicon_export(),
        Command::LexiconValidate { file } => config_ops::lexicon_validate(&file),
    }
}
