//! This module contains OS-level helpers for benchmark scripts
//!
//! File system benchmarks need a small amount of system plumbing around
//! the measured workload: checking that the script runs with enough
//! privileges, counting CPUs to size thread sweeps, formatting and
//! mounting the disks under test, and dropping kernel caches between
//! repetitions so that runs do not contaminate each other.
//!
//! These are thin wrappers over libc calls, /proc files and the standard
//! mount/umount tools. Anything that can fail reports through io::Result.

use libc;
use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::process::Command;


/// Run a shell command to completion, treating failure as an I/O error
pub(crate) fn run_shell(command: &str) -> io::Result<()> {
    let status = Command::new("sh").arg("-c").arg(command).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::Other,
                           format!("Command failed: {}", command)))
    }
}

/// Run a shell command and capture its standard output as text
pub(crate) fn capture_shell(command: &str) -> io::Result<String> {
    let output = Command::new("sh").arg("-c").arg(command).output()?;
    if !output.status.success() {
        return Err(io::Error::new(io::ErrorKind::Other,
                                  format!("Command failed: {}", command)));
    }
    String::from_utf8(output.stdout)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData,
                                    "Command output was not UTF-8"))
}


/// Truth that the current process runs with root privileges
pub fn is_root() -> bool {
    // Safe: geteuid cannot fail and touches no memory
    unsafe { libc::geteuid() == 0 }
}

/// Require root privileges, failing with PermissionDenied otherwise
///
/// Scripts that format disks or reset kernel statistics call this first,
/// so that a misconfigured run dies before touching anything.
///
pub fn check_root() -> io::Result<()> {
    if is_root() {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::PermissionDenied,
                           "This operation requires root privileges"))
    }
}

/// Number of CPUs currently online
pub fn cpu_count() -> usize {
    // Safe: sysconf cannot fail for this configuration variable
    let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if count < 1 { 1 } else { count as usize }
}

/// Create a file system on a disk and mount it at a given path
///
/// The disk's previous contents are destroyed. XFS needs a -f flag to
/// overwrite an existing file system where the others do not ask.
///
pub fn mount_disk(device: &str, mountpoint: &str,
                  filesystem: &str) -> io::Result<()> {
    check_root()?;
    if filesystem == "xfs" {
        run_shell(&format!("mkfs.{} -f {}", filesystem, device))?;
    } else {
        run_shell(&format!("mkfs.{} {}", filesystem, device))?;
    }
    run_shell(&format!("mount -t {} {} {}",
                       filesystem, device, mountpoint))
}

/// Unmount every direct subdirectory of a path that is a mount point
///
/// Benchmark scripts mount each disk under test below one root directory,
/// and this is the matching teardown.
///
pub fn unmount_all(root: &Path) -> io::Result<()> {
    let root_device = fs::metadata(root)?.dev();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        // A directory on a different device than its parent is the root
        // of another file system, i.e. a mount point
        if fs::metadata(&path)?.dev() != root_device {
            run_shell(&format!("umount {}", path.display()))?;
        }
    }
    Ok(())
}

/// Flush dirty data and drop the kernel's page, dentry and inode caches
///
/// Called between benchmark repetitions so that every run starts from
/// cold caches instead of reusing whatever the previous run left behind.
///
pub fn clear_caches() -> io::Result<()> {
    check_root()?;
    run_shell("sync")?;
    let mut drop_caches = fs::File::create("/proc/sys/vm/drop_caches")?;
    drop_caches.write_all(b"3\n")
}


/// Unit tests
#[cfg(test)]
mod tests {
    use super::{capture_shell, check_root, cpu_count, is_root, run_shell};

    /// Check that the privilege check and probe agree with each other
    #[test]
    fn privilege_check() {
        assert_eq!(check_root().is_ok(), is_root());
    }

    /// Check that at least one CPU is reported online
    #[test]
    fn online_cpus() {
        assert!(cpu_count() >= 1);
    }

    /// Check success and failure reporting of the shell helpers
    #[test]
    fn shell_helpers() {
        run_shell("true").expect("true should succeed");
        assert!(run_shell("false").is_err());
        assert_eq!(capture_shell("echo hello")
                       .expect("echo should succeed"),
                   "hello\n");
        assert!(capture_shell("false").is_err());
    }
}
