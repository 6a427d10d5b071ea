//! This module contains a checkpoint/resume facility for test scripts
//!
//! A full benchmark campaign over a parameter grid can run for many hours,
//! and the machine will find a way to die somewhere in the middle of it.
//! The Checkpoint keeps an append-only log of completed steps; when the
//! script is restarted with the same log file, it learns how many steps
//! already completed and skips them.
//!
//! The log is plain text, one record per line:
//!
//! ```text
//! CHK DIR: /var/tmp/results.20260831
//! CHK START: 1 2026-08-31T10:12:04+00:00
//! CHK DONE: 1
//! ```
//!
//! Only "CHK DONE" and "CHK DIR" records matter for resuming; "CHK START"
//! records (and their timestamps) exist for the humans who read the log
//! after a crash. A malformed record stops the replay, so that a log
//! truncated mid-line does not cause steps to be skipped incorrectly.

use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;


/// Log line prefix for the result output directory
const OUTDIR_PREFIX: &'static str = "CHK DIR:";

/// Log line prefix for a step having started
const START_PREFIX: &'static str = "CHK START:";

/// Log line prefix for a step having completed
const DONE_PREFIX: &'static str = "CHK DONE:";


/// Checkpointed progress through a sequence of benchmark steps
pub struct Checkpoint {
    /// Number of steps which have completed so far
    steps: u32,

    /// Result output directory recorded in the log, if any
    outdir: String,

    /// Open log file, appended to as further steps complete
    logfile: File,
}
//
impl Checkpoint {
    /// Open a checkpoint log, replaying any progress it already records
    ///
    /// A missing log file means a fresh run and is not an error: the file
    /// is created on the spot.
    ///
    pub fn open<P: AsRef<Path>>(logpath: P) -> io::Result<Self> {
        // Replay the existing log, if there is one
        let mut steps = 0;
        let mut outdir = String::new();
        if logpath.as_ref().exists() {
            let existing_log = BufReader::new(File::open(&logpath)?);
            for line in existing_log.lines() {
                let line = line?;
                if line.starts_with(DONE_PREFIX) {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    if fields.len() != 3 {
                        break;
                    }
                    match fields[2].parse() {
                        Ok(count) => steps = count,
                        Err(_) => break,
                    }
                } else if line.starts_with(OUTDIR_PREFIX) {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    if fields.len() != 3 {
                        break;
                    }
                    outdir = fields[2].to_owned();
                }
            }
        }

        // Keep the log open for appending further progress
        let logfile = OpenOptions::new().append(true)
                                        .create(true)
                                        .open(&logpath)?;
        Ok(
            Self {
                steps,
                outdir,
                logfile,
            }
        )
    }

    /// Tell how many steps have completed, counting resumed progress
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Access the recorded result output directory ("" if none was set)
    pub fn outdir(&self) -> &str {
        &self.outdir
    }

    /// Record the result output directory of this run
    ///
    /// A resumed run calls outdir() first and reuses the recorded
    /// directory, so that all results of one campaign end up in one place.
    ///
    pub fn set_outdir(&mut self, outdir: &str) -> io::Result<()> {
        self.outdir = outdir.to_owned();
        self.append(&format!("{} {}", OUTDIR_PREFIX, outdir))
    }

    /// Record that the next step has started
    pub fn start(&mut self) -> io::Result<()> {
        self.append(&format!("{} {} {}",
                             START_PREFIX,
                             self.steps + 1,
                             Utc::now().to_rfc3339()))
    }

    /// Record that the current step has completed successfully
    pub fn done(&mut self) -> io::Result<()> {
        self.steps += 1;
        let record = format!("{} {}", DONE_PREFIX, self.steps);
        self.append(&record)
    }

    /// Truth that a given step already completed and should be skipped
    pub fn should_skip(&self, step: u32) -> bool {
        self.steps >= step
    }

    /// Append one record to the log, flushing it all the way to disk
    ///
    /// Every record is flushed individually: the whole point of the log is
    /// to survive the process dying at an arbitrary moment.
    ///
    fn append(&mut self, record: &str) -> io::Result<()> {
        writeln!(self.logfile, "{}", record)?;
        self.logfile.flush()
    }
}


/// Unit tests
#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use super::Checkpoint;

    /// Pick a scratch log path unique to one test
    fn scratch_log(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("febench_chk_{}", name));
        let _ = fs::remove_file(&path);
        path
    }

    /// Check the state of a fresh checkpoint
    #[test]
    fn fresh_checkpoint() {
        let logpath = scratch_log("fresh");
        let checkpoint =
            Checkpoint::open(&logpath).expect("Failed to open a fresh log");
        assert_eq!(checkpoint.steps(), 0);
        assert_eq!(checkpoint.outdir(), "");
        assert!(!checkpoint.should_skip(1));
        fs::remove_file(&logpath).expect("Failed to clean up the log");
    }

    /// Check that completed steps and the output directory are recovered
    /// when the log is reopened
    #[test]
    fn resume_from_log() {
        let logpath = scratch_log("resume");

        // A first "run" completes two steps out of three
        {
            let mut checkpoint =
                Checkpoint::open(&logpath).expect("Failed to open the log");
            checkpoint.set_outdir("/var/tmp/results")
                      .expect("Failed to record the output directory");
            for _ in 0..2 {
                checkpoint.start().expect("Failed to record a step start");
                checkpoint.done().expect("Failed to record a step end");
            }
        }

        // The resumed "run" picks up where the first one left off
        let checkpoint =
            Checkpoint::open(&logpath).expect("Failed to reopen the log");
        assert_eq!(checkpoint.steps(), 2);
        assert_eq!(checkpoint.outdir(), "/var/tmp/results");
        assert!(checkpoint.should_skip(1));
        assert!(checkpoint.should_skip(2));
        assert!(!checkpoint.should_skip(3));
        fs::remove_file(&logpath).expect("Failed to clean up the log");
    }

    /// Check that a malformed record stops the replay instead of
    /// resuming from bogus progress
    #[test]
    fn truncated_log_replay() {
        let logpath = scratch_log("truncated");
        fs::write(&logpath, "CHK DONE: 1\nCHK DONE:")
            .expect("Failed to write a truncated log");
        let checkpoint =
            Checkpoint::open(&logpath).expect("Failed to open the log");
        assert_eq!(checkpoint.steps(), 1);
        fs::remove_file(&logpath).expect("Failed to clean up the log");
    }
}
