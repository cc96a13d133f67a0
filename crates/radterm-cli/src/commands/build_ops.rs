use std::path::Path;
use std::process;

use radterm_core::build::{
    build_dictionary, postprocess_file, BuildInputs, NormalizerMap, PostprocessOptions,
};

use crate::curated_dir::CuratedDir;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub struct PostprocessArgs<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub curated_dir: &'a str,
    pub apply_overrides: bool,
    pub apply_normalizer: bool,
    pub apply_sanity: bool,
    pub normalizer_path: &'a str,
}

pub fn postprocess(args: &PostprocessArgs<'_>) {
    let curated = CuratedDir::new(args.curated_dir);
    let overrides = if args.apply_overrides {
        Some(die!(curated.overrides(), "Error loading overrides: {}"))
    } else {
        None
    };
    let generic = if args.apply_sanity {
        Some(die!(curated.generic_terms(), "Error loading generic terms: {}"))
    } else {
        None
    };
    let normalizer = if args.apply_normalizer {
        Some(die!(
            NormalizerMap::load(Path::new(args.normalizer_path)),
            "Error loading normalizer rules: {}"
        ))
    } else {
        None
    };

    let opts = PostprocessOptions {
        overrides: overrides.as_ref(),
        normalizer: normalizer.as_ref(),
        sanity: generic.as_ref(),
    };
    let summary = die!(
        postprocess_file(Path::new(args.input), Path::new(args.output), opts),
        "Error post-processing: {}"
    );
    println!("Post-processed {} records", summary.total);
    println!("  changed: {}", summary.changed);
    println!("  output:  {}", args.output);
}

pub fn build(input: &str, outdir: &str, curated_dir: &str) {
    let inputs = die!(
        BuildInputs::load(Path::new(curated_dir)),
        "Error loading curated tables: {}"
    );
    let s = die!(
        build_dictionary(Path::new(input), Path::new(outdir), &inputs),
        "Error building dictionary: {}"
    );

    println!("Dictionary: {} rows ({} duplicates skipped)", s.unique, s.duplicates);
    println!("  ok/keep_en:   {}", s.ok);
    println!("  needs_review: {}", s.needs_review);
    for (title, counts) in [
        ("Status", &s.status_counts),
        ("Source", &s.source_counts),
        ("Domain", &s.domain_counts),
    ] {
        println!("{title}:");
        for (k, v) in counts {
            println!("  {k}: {v}");
        }
    }
    println!("Sanity:");
    println!("  ok with pt==en:        {}", s.violations_ok_unchanged);
    println!("  ok mostly English:     {}", s.violations_ok_english);
    println!("  generic ok via DeCS:   {}", s.violations_generic_decs);
    println!("Output: {outdir}");
    if s.violations() > 0 {
        process::exit(1);
    }
}
