fn main() {
    // Validate embedded TOML files at compile time.
    validate_toml(
        "src/default_settings.toml",
        include_str!("src/default_settings.toml"),
    );
    validate_toml(
        "src/lexicon/default_lexicon.toml",
        include_str!("src/lexicon/default_lexicon.toml"),
    );
}

fn validate_toml(path: &str, content: &str) {
    match content.parse::<toml::Value>() {
        Ok(value) if value.is_table() => {}
        _ => panic!("{path} contains invalid TOML"),
    }
}
