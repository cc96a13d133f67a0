use std::path::Path;
use std::process;

use radterm_core::lookup::{FileCache, LookupCache};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn info(file: &str) {
    let cache = die!(FileCache::open(Path::new(file)), "Error opening {file}: {}");
    println!("Cache: {file}");
    println!("  entries: {}", cache.len());
    println!("  frames:  {}", cache.frame_count());
}

pub fn get(file: &str, term: &str) {
    let cache = die!(FileCache::open(Path::new(file)), "Error opening {file}: {}");
    match cache.get(term) {
        Some(entry) => {
            let translation = entry.term_pt.as_deref().unwrap_or("(not found)");
            println!("{}\t{}\t{}", entry.term_en, translation, entry.timestamp);
        }
        None => println!("{term}: not cached"),
    }
}

pub fn compact(file: &str) {
    let cache = die!(FileCache::open(Path::new(file)), "Error opening {file}: {}");
    let before = cache.frame_count();
    let after = die!(cache.compact(), "Error compacting {file}: {}");
    println!("Compacted {file}: {before} -> {after} frames");
}
