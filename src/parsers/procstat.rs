//! This module contains a parser for captured /proc/stat cpu lines
//!
//! The usual measurement protocol dumps the aggregated "cpu" line of
//! /proc/stat into a capture file once right before the workload and once
//! right after it. What the analysis wants is the difference between the
//! two snapshots: how much user, system, idle and iowait time was burned
//! while the workload ran.

use reader;
use std::io;
use std::path::Path;


/// Number of jiffies per second on standard Linux builds (USER_HZ)
const USER_HZ: f64 = 100.0;


/// Cumulative CPU times from one "cpu" line of /proc/stat
#[derive(Clone, Debug, PartialEq)]
pub struct CpuTimes {
    /// Time spent running user-mode code
    pub user: f64,

    /// Time spent running kernel-mode code
    pub system: f64,

    /// Time spent doing nothing at all
    pub idle: f64,

    /// Time spent waiting for I/O to complete
    pub iowait: f64,
}
//
impl CpuTimes {
    /// Parse one "cpu ..." line of /proc/stat
    ///
    /// The line layout is "cpu user nice system idle iowait ...". The nice
    /// counter and the trailing irq/steal/guest counters are not used by
    /// the analysis and are skipped.
    ///
    pub fn parse_line(line: &str) -> Self {
        let mut columns = line.split_whitespace();

        // The header column must identify a cpu line
        let header = columns.next().expect("Expected a cpu header");
        assert!(header.starts_with("cpu"),
                "Not a cpu line from /proc/stat");

        // Extract the four counters of interest by position
        let mut counter = |skip: usize| -> f64 {
            columns.nth(skip)
                   .expect("Missing cpu time counter")
                   .parse()
                   .expect("Failed to parse a cpu time counter")
        };
        let user = counter(0);
        let system = counter(1);  // Skips the nice counter
        let idle = counter(0);
        let iowait = counter(0);

        Self { user, system, idle, iowait }
    }

    /// Elapsed times between an earlier snapshot and this one, scaled from
    /// jiffies to USER_HZ-normalized time units
    pub fn since(&self, before: &Self) -> Self {
        Self {
            user: (self.user - before.user) * USER_HZ,
            system: (self.system - before.system) * USER_HZ,
            idle: (self.idle - before.idle) * USER_HZ,
            iowait: (self.iowait - before.iowait) * USER_HZ,
        }
    }
}


/// Parse a /proc/stat capture file into a before/after delta
///
/// The first line of the capture is the snapshot taken before the workload
/// and the last line is the snapshot taken after it. A capture holding
/// fewer than two snapshots cannot produce a delta and yields None.
///
pub fn parse(contents: &str) -> Option<CpuTimes> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
    let before = CpuTimes::parse_line(lines.next()?);
    let after = CpuTimes::parse_line(lines.last()?);
    Some(after.since(&before))
}

/// Parse a /proc/stat capture loaded from a file
pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Option<CpuTimes>> {
    Ok(parse(&reader::slurp(path)?))
}


/// Unit tests
#[cfg(test)]
mod tests {
    use super::{CpuTimes, parse};

    /// Check that a single cpu line parses into the right counters
    #[test]
    fn parse_cpu_line() {
        let line = "cpu 10132153 290696 3084719 46828483 16683 0 25195";
        assert_eq!(CpuTimes::parse_line(line),
                   CpuTimes {
                       user: 10132153.0,
                       system: 3084719.0,
                       idle: 46828483.0,
                       iowait: 16683.0,
                   });
    }

    /// Check the before/after delta of a two-snapshot capture
    #[test]
    fn parse_capture() {
        let capture = "cpu 100 10 200 300 40 0 0\n\
                       cpu 150 12 230 420 46 0 0\n";
        assert_eq!(parse(capture),
                   Some(CpuTimes {
                       user: 5000.0,
                       system: 3000.0,
                       idle: 12000.0,
                       iowait: 600.0,
                   }));
    }

    /// Check that intermediate snapshots are ignored, keeping only the
    /// first and last ones
    #[test]
    fn parse_capture_with_intermediate_snapshots() {
        let capture = "cpu 100 10 200 300 40 0 0\n\
                       cpu 120 11 210 350 42 0 0\n\
                       cpu 150 12 230 420 46 0 0\n";
        assert_eq!(parse(capture),
                   Some(CpuTimes {
                       user: 5000.0,
                       system: 3000.0,
                       idle: 12000.0,
                       iowait: 600.0,
                   }));
    }

    /// Check that a capture without two snapshots yields no delta
    #[test]
    fn parse_short_captures() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("cpu 100 10 200 300 40 0 0\n"), None);
    }
}
