//! Picking the Portuguese descriptor that best matches an English query.
//!
//! DeCS answers a word search with many loosely related records; scoring on
//! the English side keeps e.g. `recurrent` from resolving to an unrelated
//! neoplasm descriptor.

use serde_json::Value;

use crate::settings::RelevanceSettings;

/// Points awarded per match kind. Only the first applicable kind counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceScores {
    pub exact_descriptor: u32,
    pub exact_synonym: u32,
    pub descriptor_token: u32,
    pub synonym_token: u32,
    pub descriptor_substring: u32,
}

impl Default for RelevanceScores {
    fn default() -> Self {
        Self {
            exact_descriptor: 10,
            exact_synonym: 9,
            descriptor_token: 5,
            synonym_token: 4,
            descriptor_substring: 2,
        }
    }
}

impl From<&RelevanceSettings> for RelevanceScores {
    fn from(s: &RelevanceSettings) -> Self {
        Self {
            exact_descriptor: s.exact_descriptor,
            exact_synonym: s.exact_synonym,
            descriptor_token: s.descriptor_token,
            synonym_token: s.synonym_token,
            descriptor_substring: s.descriptor_substring,
        }
    }
}

/// The parts of one DeCS record relevant to matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecsRecord {
    pub descriptor_en: String,
    pub descriptor_pt: String,
    pub synonyms_en: Vec<String>,
}

/// Extract records from a `search-by-words` JSON payload. Unexpected shapes
/// yield no records rather than an error.
pub fn extract_records(payload: &Value) -> Vec<DecsRecord> {
    let Some(objects) = payload.get("objects").and_then(Value::as_array) else {
        return Vec::new();
    };
    objects
        .iter()
        .filter_map(|obj| obj.get("decsws_response")?.get("record_list")?.get("record"))
        .flat_map(one_or_many)
        .map(parse_record)
        .collect()
}

fn one_or_many(v: &Value) -> Vec<&Value> {
    match v {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![v],
        _ => Vec::new(),
    }
}

fn lang_of(item: &Value) -> String {
    item.get("attr")
        .and_then(|a| a.get("lang"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| item.get("@lang").and_then(Value::as_str))
        .unwrap_or("")
        .to_lowercase()
}

fn text_of<'v>(item: &'v Value, keys: &[&str]) -> &'v str {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

fn parse_record(record: &Value) -> DecsRecord {
    let mut out = DecsRecord::default();

    if let Some(list) = record.get("descriptor_list") {
        for desc in one_or_many(list) {
            let lang = lang_of(desc);
            let text = text_of(desc, &["descriptor", "#text"]);
            if lang.starts_with("en") {
                out.descriptor_en = text.to_string();
            } else if lang.starts_with("pt") {
                out.descriptor_pt = text.to_string();
            }
        }
    }

    if let Some(items) = record.get("synonym_list").and_then(|l| l.get("synonym")) {
        for syn in one_or_many(items) {
            if lang_of(syn).starts_with("en") {
                out.synonyms_en.push(text_of(syn, &["#text", "val"]).to_string());
            }
        }
    }

    out
}

/// Relevance of `record` to the lowercased, trimmed query.
pub fn score(record: &DecsRecord, query: &str, scores: &RelevanceScores) -> u32 {
    let descriptor = record.descriptor_en.to_lowercase();
    let synonyms: Vec<String> = record.synonyms_en.iter().map(|s| s.to_lowercase()).collect();

    if query == descriptor {
        scores.exact_descriptor
    } else if synonyms.iter().any(|s| s == query) {
        scores.exact_synonym
    } else if descriptor.split_whitespace().any(|t| t == query) {
        scores.descriptor_token
    } else if synonyms
        .iter()
        .any(|s| s.split_whitespace().any(|t| t == query))
    {
        scores.synonym_token
    } else if descriptor.contains(query) {
        scores.descriptor_substring
    } else {
        0
    }
}

/// Portuguese descriptor of the best-scoring record. Records without a
/// Portuguese descriptor are skipped, the first maximum wins and a best
/// score of zero means no relevant match.
pub fn best_translation(payload: &Value, query: &str, scores: &RelevanceScores) -> Option<String> {
    let query = query.trim().to_lowercase();
    let mut best: Option<(u32, String)> = None;
    for record in extract_records(payload) {
        if record.descriptor_pt.is_empty() {
            continue;
        }
        let s = score(&record, &query, scores);
        if best.as_ref().map_or(true, |(b, _)| s > *b) {
            best = Some((s, record.descriptor_pt));
        }
    }
    best.filter(|(s, _)| *s > 0).map(|(_, pt)| pt)
}
