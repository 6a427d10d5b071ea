//! This module contains a parser for opreport output
//!
//! An "opreport -cl" dump starts with one "Counted EVENT ..." banner per
//! hardware event that was recorded, followed by a table in which each row
//! gives, for one symbol, a (sample count, percentage) pair per counted
//! event, with the symbol name in the last column. Rows are recognized by
//! starting with a digit; everything else (CPU description, column headers,
//! callgraph separators) is skipped.

use reader;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;


/// Samples attributed to one symbol for one hardware event
#[derive(Clone, Debug, PartialEq)]
pub struct EventCount {
    /// Absolute number of samples
    pub samples: u64,

    /// Share of the event's total samples, in percent
    pub percentage: f64,
}


/// Per-symbol, per-event profile extracted from an opreport dump
pub type SymbolProfile = BTreeMap<String, BTreeMap<String, EventCount>>;


/// Parse an opreport dump into a per-symbol profile
pub fn parse(contents: &str) -> SymbolProfile {
    let mut profile = SymbolProfile::new();
    let mut events: Vec<String> = Vec::new();
    for line in contents.lines() {
        // Event banners announce one counted event each, in column order
        if line.starts_with("Counted") {
            let event = line.split_whitespace()
                            .nth(1)
                            .expect("Expected an event name after Counted")
                            .to_owned();
            events.push(event);
            continue;
        }

        // Data rows start with a digit (the first sample count)
        if !line.chars().next().map_or(false, |c| c.is_digit(10)) {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        let symbol = *columns.last()
                             .expect("Data rows cannot be empty");

        // Each counted event contributes a (samples, percentage) pair
        let mut counts = BTreeMap::new();
        for (index, event) in events.iter().enumerate() {
            let samples =
                columns[2 * index]
                    .parse()
                    .expect("Failed to parse a sample count");
            let percentage =
                columns[2 * index + 1]
                    .parse()
                    .expect("Failed to parse a sample percentage");
            counts.insert(event.clone(),
                          EventCount { samples, percentage });
        }
        profile.insert(symbol.to_owned(), counts);
    }
    profile
}

/// Parse an opreport dump loaded from a file
pub fn load<P: AsRef<Path>>(path: P) -> io::Result<SymbolProfile> {
    Ok(parse(&reader::slurp(path)?))
}
