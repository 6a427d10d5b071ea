//! This module contains a parser for postmark run output
//!
//! Postmark prints a free-form English summary at the end of a run. The
//! four figures that matter for file system comparisons are the pure file
//! creation and deletion rates and the read/write throughput, which appear
//! in sentences like:
//!
//! ```text
//! Creation alone: 1000 files (333 per second)
//! Deletion alone: 500 files (250 per second)
//! 21.41 megabytes read (1.74 megabytes per second)
//! 132.74 megabytes written (10.82 megabytes per second)
//! ```
//!
//! Throughput is reported in kilobytes or megabytes depending on the run
//! size, and gets normalized to bytes per second here.

use bytesize::ByteSize;
use reader;
use regex::Regex;
use std::io;
use std::path::Path;


lazy_static! {
    /// File creation rate, from the transaction-free creation phase
    static ref CREATION: Regex =
        Regex::new(r"Creation alone: [0-9]+ files \(([0-9]+) per second\)")
              .unwrap();

    /// File deletion rate, from the transaction-free deletion phase
    static ref DELETION: Regex =
        Regex::new(r"Deletion alone: [0-9]+ files \(([0-9]+) per second\)")
              .unwrap();

    /// Read throughput, with its unit
    static ref READ: Regex =
        Regex::new(r"[0-9.]+ [a-z]+ read \(([0-9.]+) ([a-z]+) per second\)")
              .unwrap();

    /// Write throughput, with its unit
    static ref WRITE: Regex =
        Regex::new(r"[0-9.]+ [a-z]+ written \(([0-9.]+) ([a-z]+) per second\)")
              .unwrap();
}


/// Figures extracted from one postmark run
///
/// Every field is optional because postmark only prints the sections that
/// the run configuration exercised, and a truncated output file should
/// produce a partial report rather than a crash.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostmarkReport {
    /// Pure file creation rate, in files per second
    pub creation: Option<f64>,

    /// Pure file deletion rate, in files per second
    pub deletion: Option<f64>,

    /// Read throughput, in bytes per second
    pub read: Option<ByteSize>,

    /// Write throughput, in bytes per second
    pub write: Option<ByteSize>,
}


/// Convert a postmark throughput figure and unit into bytes per second
fn parse_throughput(value: &str, unit: &str) -> ByteSize {
    let value: f64 = value.parse()
                          .expect("Failed to parse a throughput figure");
    let bytes = match unit {
        "bytes" => value,
        "kilobytes" => value * 1024.0,
        "megabytes" => value * 1024.0 * 1024.0,
        other => panic!("Unsupported postmark unit: {}", other),
    };
    ByteSize::b(bytes as usize)
}


/// Parse the output of a postmark run
pub fn parse(contents: &str) -> PostmarkReport {
    let mut report = PostmarkReport::default();
    for line in contents.lines() {
        if let Some(captures) = CREATION.captures(line) {
            report.creation =
                Some(captures[1].parse()
                                .expect("Failed to parse a creation rate"));
        }
        if let Some(captures) = DELETION.captures(line) {
            report.deletion =
                Some(captures[1].parse()
                                .expect("Failed to parse a deletion rate"));
        }
        if let Some(captures) = READ.captures(line) {
            report.read = Some(parse_throughput(&captures[1], &captures[2]));
        }
        if let Some(captures) = WRITE.captures(line) {
            report.write = Some(parse_throughput(&captures[1], &captures[2]));
        }
    }
    report
}

/// Parse postmark output loaded from a file
pub fn load<P: AsRef<Path>>(path: P) -> io::Result<PostmarkReport> {
    Ok(parse(&reader::slurp(path)?))
}
