//! This module contains a parser for /proc/lock_stat dumps
//!
//! When the kernel is built with CONFIG_LOCK_STAT, /proc/lock_stat exposes
//! per-lock-class contention statistics. Each lock class gets a line of the
//! form "lock-name: v1 v2 ... v10", carrying the ten standard counters
//! (contention and acquisition bounces/counts and wait/hold time extrema
//! and totals), followed by indented per-call-site breakdown lines which we
//! do not parse. Header, version and separator lines carry no colon and
//! are skipped naturally.

use reader;
use regex::Regex;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;


lazy_static! {
    /// A lock class record: a name, a colon, then numeric columns
    static ref LOCK_RECORD: Regex =
        Regex::new(r"^\s*(?P<name>\S[^:]*):(?P<values>(\s+[0-9.]+)+)\s*$")
              .unwrap();
}


/// Contention statistics for one lock class
///
/// Field order matches the column order of /proc/lock_stat. Times are in
/// microseconds, everything else is a count.
///
#[derive(Clone, Debug, PartialEq)]
pub struct LockContention {
    /// Contending acquisitions that bounced between CPUs
    pub con_bounces: f64,

    /// Number of contended acquisitions
    pub contentions: f64,

    /// Shortest wait for the lock
    pub waittime_min: f64,

    /// Longest wait for the lock
    pub waittime_max: f64,

    /// Total time spent waiting for the lock
    pub waittime_total: f64,

    /// Acquisitions that bounced between CPUs
    pub acq_bounces: f64,

    /// Total number of acquisitions
    pub acquisitions: f64,

    /// Shortest hold of the lock
    pub holdtime_min: f64,

    /// Longest hold of the lock
    pub holdtime_max: f64,

    /// Total time the lock was held
    pub holdtime_total: f64,
}
//
impl LockContention {
    /// Number of numeric columns in a lock class record
    const NUM_FIELDS: usize = 10;

    /// Build a record from the numeric columns of a lock class line
    ///
    /// Records truncated by the kernel (which happens for lock classes that
    /// were never contended, where the wait time columns are dropped) are
    /// padded with zeroes at the end.
    ///
    fn from_columns(columns: &[f64]) -> Self {
        // Pad short records so that every field has a value
        let mut fields = [0.0; Self::NUM_FIELDS];
        for (field, &column) in fields.iter_mut().zip(columns.iter()) {
            *field = column;
        }

        Self {
            con_bounces: fields[0],
            contentions: fields[1],
            waittime_min: fields[2],
            waittime_max: fields[3],
            waittime_total: fields[4],
            acq_bounces: fields[5],
            acquisitions: fields[6],
            holdtime_min: fields[7],
            holdtime_max: fields[8],
            holdtime_total: fields[9],
        }
    }

    /// Truth that this lock class never saw any activity at all
    pub fn is_idle(&self) -> bool {
        [self.con_bounces, self.contentions,
         self.waittime_min, self.waittime_max, self.waittime_total,
         self.acq_bounces, self.acquisitions,
         self.holdtime_min, self.holdtime_max, self.holdtime_total]
            .iter()
            .all(|&field| field == 0.0)
    }
}


/// Parse a /proc/lock_stat dump into per-lock-class statistics
///
/// Lock classes with all-zero statistics are left out: they are noise
/// from the report's point of view, and there are a lot of them.
///
pub fn parse(contents: &str) -> BTreeMap<String, LockContention> {
    let mut locks = BTreeMap::new();
    for line in contents.lines() {
        // Only lock class records have the "name: columns" shape
        let captures = match LOCK_RECORD.captures(line) {
            Some(captures) => captures,
            None => continue,
        };

        // Parse the numeric columns of the record
        let columns: Vec<f64> =
            captures["values"].split_whitespace()
                              .take(LockContention::NUM_FIELDS)
                              .map(|column| {
                                  column.parse()
                                        .expect("Failed to parse a lock \
                                                 statistics column")
                              })
                              .collect();

        // Record every lock class that saw some activity
        let contention = LockContention::from_columns(&columns);
        if !contention.is_idle() {
            locks.insert(captures["name"].trim().to_owned(), contention);
        }
    }
    locks
}

/// Parse a /proc/lock_stat dump loaded from a file
pub fn load<P: AsRef<Path>>(path: P)
                            -> io::Result<BTreeMap<String, LockContention>> {
    Ok(parse(&reader::slurp(path)?))
}


/// A plausible lock_stat excerpt used by tests and benchmarks: version
/// header, column header, separator, two lock class records and one
/// call-site breakdown line
#[cfg(test)]
const SAMPLE_DUMP: &'static str = "\
lock_stat version 0.4
-----------------------------------------------------------------------
              class name    con-bounces    contentions   waittime-min
-----------------------------------------------------------------------
           &rq->lock:          13128          13128           0.43
           ---------
             &rq->lock              645
       &sem->wait_lock:              0              0           0.00
";


/// Unit tests
#[cfg(test)]
mod tests {
    use super::{LockContention, SAMPLE_DUMP, parse};

    /// Check that lock class records are extracted and zero-padded
    #[test]
    fn parse_dump() {
        let locks = parse(SAMPLE_DUMP);

        // The active lock class is reported, with padded trailing fields
        assert_eq!(locks.len(), 1);
        assert_eq!(locks["&rq->lock"],
                   LockContention {
                       con_bounces: 13128.0,
                       contentions: 13128.0,
                       waittime_min: 0.43,
                       waittime_max: 0.0,
                       waittime_total: 0.0,
                       acq_bounces: 0.0,
                       acquisitions: 0.0,
                       holdtime_min: 0.0,
                       holdtime_max: 0.0,
                       holdtime_total: 0.0,
                   });

        // The all-zero lock class was filtered out
        assert!(!locks.contains_key("&sem->wait_lock"));
    }

    /// Check that a full ten-column record maps to the right fields
    #[test]
    fn parse_full_record() {
        let line = "clockevents_lock: 1 2 0.5 10.25 30.75 3 4 0.25 5.5 8.0\n";
        let locks = parse(line);
        assert_eq!(locks["clockevents_lock"],
                   LockContention {
                       con_bounces: 1.0,
                       contentions: 2.0,
                       waittime_min: 0.5,
                       waittime_max: 10.25,
                       waittime_total: 30.75,
                       acq_bounces: 3.0,
                       acquisitions: 4.0,
                       holdtime_min: 0.25,
                       holdtime_max: 5.5,
                       holdtime_total: 8.0,
                   });
    }

    /// Check that non-record lines are ignored
    #[test]
    fn skip_non_records() {
        assert!(parse("").is_empty());
        assert!(parse("lock_stat version 0.4\n").is_empty());
        assert!(parse("--------------------\n").is_empty());
    }
}


/// Performance benchmarks
///
/// See the benchmarks module of results for how to run these.
///
#[cfg(test)]
mod benchmarks {
    use super::{SAMPLE_DUMP, parse};
    use testbench;

    /// Benchmark of the lock_stat parsing hot loop
    #[test]
    #[ignore]
    fn parsing_overhead() {
        testbench::benchmark(1_000_000, || {
            assert_eq!(parse(SAMPLE_DUMP).len(), 1);
        });
    }
}
