//! A small reader for kernel pseudo-files and tool output files
//!
//! The profiling drivers snapshot files like /proc/stat before and after a
//! workload, sometimes at a decent rate. Pseudo-files have properties which
//! make a dedicated reader worthwhile for that access pattern:
//!
//! - They are tiny (a few kB at most), so reading them in one go is best.
//! - Their contents are regenerated on every read, and "refreshing" them is
//!   just a matter of seeking back to the beginning, no reopen needed.
//! - Their size barely changes between reads, so the readout buffer from
//!   one snapshot is the right size for the next one.
//! - They contain ASCII text whose format is part of the kernel ABI, which
//!   only ever changes through backward-compatible extensions.
//!
//! The SnapshotReader below accounts for all of this. The module also hosts
//! the one-shot slurp() helper which the tool output parsers use to load
//! regular result files, where none of the above matters.

use std::fs::File;
use std::io::{Read, Result, Seek, SeekFrom};
use std::path::Path;


/// Read the entire contents of a file into a string
///
/// This is the boring counterpart of SnapshotReader, for files that are
/// read once per benchmark run (tool reports, postmark output...).
///
pub(crate) fn slurp<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}


/// Reader for repeated snapshots of one pseudo-file
pub(crate) struct SnapshotReader {
    /// Persistent handle to the file being snapshotted
    file_handle: File,

    /// Reusable buffer receiving the file contents
    contents: String,
}
//
impl SnapshotReader {
    /// Attempt to open a pseudo-file for snapshotting
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_handle = File::open(path)?;
        Ok(
            Self {
                file_handle,
                contents: String::new(),
            }
        )
    }

    /// Take a snapshot of the file and hand it to a caller-provided closure
    ///
    /// The closure gets no way to report errors because it should not need
    /// one: its only job is to extract numbers from a format that the
    /// kernel guarantees. A format mismatch is a logic error in the caller,
    /// for which panicking is the appropriate reaction.
    ///
    pub fn snapshot<F, R>(&mut self, mut process: F) -> Result<R>
        where F: FnMut(&str) -> R
    {
        // Grab the current contents of the file
        self.file_handle.read_to_string(&mut self.contents)?;

        // Let the caller extract whatever it is after
        let result = process(&self.contents);

        // Rewind so that the next snapshot sees fresh contents
        self.contents.clear();
        self.file_handle.seek(SeekFrom::Start(0u64))?;
        Ok(result)
    }
}
