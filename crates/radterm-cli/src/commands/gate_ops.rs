use std::fs;
use std::path::Path;
use std::process;

use radterm_gate::{Alternatives, TokenReport, VocabularyGate};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub struct GateArgs<'a> {
    pub dictionary: &'a str,
    pub log: &'a str,
    pub alternatives: Option<&'a str>,
}

fn open(args: &GateArgs<'_>) -> VocabularyGate {
    let gate = die!(
        VocabularyGate::open(Path::new(args.dictionary), args.log),
        "Error: {}"
    );
    match args.alternatives {
        Some(path) => {
            let alts = die!(Alternatives::load(Path::new(path)), "Error: {}");
            gate.with_alternatives(alts)
        }
        None => gate,
    }
}

fn print_rows(report: &[TokenReport]) {
    for row in report {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            row.term_en, row.term_out, row.status, row.source, row.notes
        );
    }
}

/// Look up terms given directly and/or one per line in `input`.
pub fn lookup(args: &GateArgs<'_>, terms: &[String], input: Option<&str>) {
    let mut all: Vec<String> = terms.to_vec();
    if let Some(input) = input {
        let text = die!(fs::read_to_string(input), "Error reading {input}: {}");
        all.extend(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }
    if all.is_empty() {
        eprintln!("No terms provided. Use positional terms or --input.");
        process::exit(2);
    }

    let gate = open(args);
    let (_, report) = die!(gate.rewrite_tokens(&all), "Error: {}");
    print_rows(&report);
}

pub fn rewrite(args: &GateArgs<'_>, text: &str, json: bool) {
    let gate = open(args);
    let (rewritten, report) = die!(gate.rewrite_text(text), "Error: {}");
    println!("{rewritten}");
    if json {
        let out = die!(serde_json::to_string_pretty(&report), "Error: {}");
        println!("{out}");
    } else {
        print_rows(&report);
    }
}
