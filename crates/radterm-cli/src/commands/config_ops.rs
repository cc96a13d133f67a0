use std::fs;
use std::process;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Install a custom settings file before anything reads the settings.
pub fn load_settings(file: Option<&str>) {
    let Some(file) = file else {
        return;
    };
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(
        radterm_core::settings::init_custom(content),
        "Error in {file}: {}"
    );
}

pub fn settings_export() {
    print!("{}", radterm_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        radterm_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: thresholds.ok={}, thresholds.ambiguous={}, lookup.requests_per_second={}, lookup.max_retries={}",
        s.thresholds.ok, s.thresholds.ambiguous, s.lookup.requests_per_second, s.lookup.max_retries
    );
}

pub fn lexicon_export() {
    print!("{}", radterm_core::lexicon::DEFAULT_LEXICON_TOML);
}

pub fn lexicon_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let lex = die!(
        radterm_core::lexicon::Lexicon::from_toml_str(&content),
        "Error: {}"
    );
    println!("OK: {} entries", lex.len());
}
