//! This module contains drivers for profiling a benchmark workload
//!
//! A profiling session always has the same shape: arm some data source
//! before the workload runs, collect its output afterwards, and keep the
//! resulting textual report around for dumping into the result directory.
//! The report text is later fed to the matching submodule of parsers.
//!
//! Two kinds of data sources are covered: kernel counter files which are
//! snapshotted around the workload (/proc/stat, /proc/lock_stat), and
//! external profilers which are driven through their command line tools
//! (perf, oprofile). Both are accessed through the common Profiler trait
//! so that benchmark scripts can be written profiler-agnostically.

use osutil::{capture_shell, run_shell};
use reader::{self, SnapshotReader};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;


/// Common interface of all profiling session drivers
///
/// The expected call sequence is new -> start -> workload -> stop ->
/// report/dump. Reports are only meaningful after stop() has run.
///
pub trait Profiler {
    /// Arm the profiler, right before the workload starts
    fn start(&mut self) -> io::Result<()>;

    /// Collect profiling results, right after the workload ends
    fn stop(&mut self) -> io::Result<()>;

    /// Access the textual profiling report
    fn report(&self) -> &str;

    /// Write the report into a file, with a trailing newline
    fn dump(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.report().as_bytes())?;
        file.write_all(b"\n")
    }
}


/// A profiler that does nothing
///
/// Benchmark drivers take a profiler parameter; this is what they get when
/// the user asked for plain timing without any profiling.
///
pub struct NullProfiler;
//
impl Profiler for NullProfiler {
    fn start(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn report(&self) -> &str {
        ""
    }

    /// A null profiler has nothing worth writing to disk
    fn dump(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}


/// Extract the aggregated "cpu" line from a /proc/stat snapshot
fn cpu_line(contents: &str) -> String {
    contents.lines()
            .next()
            .expect("/proc/stat cannot be empty")
            .to_owned()
}

/// Compute the per-counter difference of two "cpu" lines
fn cpu_delta_line(before: &str, after: &str) -> String {
    let parse_counters = |line: &str| -> Vec<u64> {
        line.split_whitespace()
            .skip(1)
            .map(|column| column.parse()
                                .expect("Failed to parse a cpu counter"))
            .collect()
    };
    let deltas: Vec<String> =
        parse_counters(after).iter()
                             .zip(parse_counters(before).iter())
                             .map(|(after, before)| {
                                 (after - before).to_string()
                             })
                             .collect();
    format!("cpu {}", deltas.join(" "))
}


/// Profiler reporting global CPU time usage during the workload
///
/// This snapshots the aggregated cpu line of /proc/stat around the
/// workload and reports the counter deltas as a single cpu line in the
/// same format, so downstream tooling can treat it like /proc/stat text.
///
pub struct ProcStatProfiler {
    /// Snapshot reader for /proc/stat
    reader: SnapshotReader,

    /// Cpu line captured when the profiler was started
    before: String,

    /// Counter deltas, computed once the profiler is stopped
    report: String,
}
//
impl ProcStatProfiler {
    /// Set up CPU time profiling
    pub fn new() -> io::Result<Self> {
        let reader = SnapshotReader::open("/proc/stat")?;
        Ok(
            Self {
                reader,
                before: String::new(),
                report: String::new(),
            }
        )
    }
}
//
impl Profiler for ProcStatProfiler {
    fn start(&mut self) -> io::Result<()> {
        self.before = self.reader.snapshot(cpu_line)?;
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        let after = self.reader.snapshot(cpu_line)?;
        self.report = cpu_delta_line(&self.before, &after);
        Ok(())
    }

    fn report(&self) -> &str {
        &self.report
    }
}


/// Profiler reporting kernel lock contention during the workload
///
/// Requires a kernel built with CONFIG_LOCK_STAT and root privileges.
/// The report is a raw /proc/lock_stat dump, ready for parsers::lockstat.
///
pub struct LockstatProfiler {
    /// Contents of /proc/lock_stat after the workload
    report: String,
}
//
impl LockstatProfiler {
    /// Set up lock contention profiling
    pub fn new() -> Self {
        Self {
            report: String::new(),
        }
    }

    /// Reset the kernel's lock statistics
    fn clear_lockstat() -> io::Result<()> {
        let mut lock_stat = File::create("/proc/lock_stat")?;
        lock_stat.write_all(b"0\n")
    }
}
//
impl Profiler for LockstatProfiler {
    fn start(&mut self) -> io::Result<()> {
        Self::clear_lockstat()
    }

    fn stop(&mut self) -> io::Result<()> {
        self.report = reader::slurp("/proc/lock_stat")?;
        Ok(())
    }

    fn report(&self) -> &str {
        &self.report
    }
}


/// Profiler running the workload under Linux's perf tool
///
/// Unlike the snapshotting profilers, this one owns the workload: start()
/// runs it to completion under "perf record", and stop() turns the
/// recording into a textual report via "perf report --stdio".
///
pub struct PerfProfiler {
    /// Name or path of the perf executable
    perf: String,

    /// Comma-separated list of PMU events to record
    events: String,

    /// Shell command for the workload being profiled
    workload: String,

    /// Kernel image to resolve kernel symbols against, if any
    vmlinux: Option<String>,

    /// Kallsyms file to resolve kernel symbols against, if any
    kallsyms: Option<String>,

    /// Output of perf report, captured once the profiler is stopped
    report: String,
}
//
impl PerfProfiler {
    /// PMU events recorded when the caller does not pick their own
    pub const DEFAULT_EVENTS: &'static str =
        "cycles,cache-misses,LLC-load-misses";

    /// Set up perf profiling of a workload command
    pub fn new(workload: &str) -> io::Result<Self> {
        Self::with_perf("perf", workload)
    }

    /// Set up perf profiling using a specific perf executable
    pub fn with_perf(perf: &str, workload: &str) -> io::Result<Self> {
        // Detect a missing perf installation at setup time, not after the
        // workload already ran for an hour
        run_shell(&format!("which {} > /dev/null", perf))
            .map_err(|_| io::Error::new(
                io::ErrorKind::NotFound,
                format!("Cannot find the perf binary '{}'", perf)
            ))?;

        Ok(
            Self {
                perf: perf.to_owned(),
                events: Self::DEFAULT_EVENTS.to_owned(),
                workload: workload.to_owned(),
                vmlinux: None,
                kallsyms: None,
                report: String::new(),
            }
        )
    }

    /// Record a custom comma-separated PMU event list
    pub fn set_events(&mut self, events: &str) {
        self.events = events.to_owned();
    }

    /// Resolve kernel symbols against a specific kernel image
    pub fn set_vmlinux(&mut self, vmlinux: &str) {
        self.vmlinux = Some(vmlinux.to_owned());
    }

    /// Resolve kernel symbols against a specific kallsyms file
    pub fn set_kallsyms(&mut self, kallsyms: &str) {
        self.kallsyms = Some(kallsyms.to_owned());
    }
}
//
impl Profiler for PerfProfiler {
    /// Run the workload to completion under perf record
    fn start(&mut self) -> io::Result<()> {
        run_shell(&format!("{} record -e {} -a {}",
                           self.perf, self.events, self.workload))
    }

    fn stop(&mut self) -> io::Result<()> {
        let mut options = String::new();
        if let Some(ref vmlinux) = self.vmlinux {
            options.push_str(&format!(" -k {}", vmlinux));
        }
        if let Some(ref kallsyms) = self.kallsyms {
            options.push_str(&format!(" --kallsyms={}", kallsyms));
        }
        self.report = capture_shell(&format!("{} report{} --stdio",
                                             self.perf, options))?;
        Ok(())
    }

    fn report(&self) -> &str {
        &self.report
    }
}


/// Profiler driving oprofile through opcontrol
///
/// Requires a working oprofile installation and root privileges. The
/// report is an "opreport -cl" dump, ready for parsers::oprofile.
///
pub struct OProfiler {
    /// Event specification handed to opcontrol --setup
    events: String,

    /// Kernel image to resolve kernel symbols against, if any
    vmlinux: Option<String>,

    /// Output of opreport, captured once the profiler is stopped
    report: String,
}
//
impl OProfiler {
    /// Event specification used when the caller does not pick their own
    pub const DEFAULT_EVENTS: &'static str = "L3_CACHE_MISSES:500";

    /// Set up oprofile-based profiling
    pub fn new() -> Self {
        Self {
            events: Self::DEFAULT_EVENTS.to_owned(),
            vmlinux: None,
            report: String::new(),
        }
    }

    /// Record a custom oprofile event specification
    pub fn set_events(&mut self, events: &str) {
        self.events = events.to_owned();
    }

    /// Resolve kernel symbols against a specific kernel image
    pub fn set_vmlinux(&mut self, vmlinux: &str) {
        self.vmlinux = Some(vmlinux.to_owned());
    }
}
//
impl Profiler for OProfiler {
    fn start(&mut self) -> io::Result<()> {
        run_shell("opcontrol --reset")?;
        run_shell("opcontrol --init")?;
        if let Some(ref vmlinux) = self.vmlinux {
            run_shell(&format!("opcontrol --vmlinux={}", vmlinux))?;
        }
        run_shell(&format!("opcontrol --setup --separate=none --event={}",
                           self.events))?;
        run_shell("opcontrol --start")
    }

    fn stop(&mut self) -> io::Result<()> {
        run_shell("opcontrol --dump")?;
        run_shell("opcontrol --stop")?;
        self.report = capture_shell("opreport -cl")?;
        Ok(())
    }

    fn report(&self) -> &str {
        &self.report
    }
}


/// Unit tests
#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::Path;
    use super::{NullProfiler, ProcStatProfiler, Profiler, cpu_delta_line,
                cpu_line};

    /// Check that the null profiler goes through a full session quietly
    #[test]
    fn null_profiling_session() {
        let mut profiler = NullProfiler;
        profiler.start().expect("Null start cannot fail");
        profiler.stop().expect("Null stop cannot fail");
        assert_eq!(profiler.report(), "");

        // Dumping should not even create a file
        let target = env::temp_dir().join("febench_null_profiler_dump");
        profiler.dump(&target).expect("Null dump cannot fail");
        assert!(!target.exists());
    }

    /// Check the cpu line extraction and delta computation helpers
    #[test]
    fn cpu_line_deltas() {
        let before = "cpu 100 10 200 300 40 0 25\nintr 12345 0 0\n";
        assert_eq!(cpu_line(before), "cpu 100 10 200 300 40 0 25");
        assert_eq!(cpu_delta_line("cpu 100 10 200 300 40 0 25",
                                  "cpu 150 12 230 420 46 0 30"),
                   "cpu 50 2 30 120 6 0 5");
    }

    /// Check an actual CPU profiling session around a trivial workload
    #[test]
    fn procstat_profiling_session() {
        let mut profiler =
            ProcStatProfiler::new().expect("Failed to open /proc/stat");
        profiler.start().expect("Failed to start CPU profiling");
        profiler.stop().expect("Failed to stop CPU profiling");

        // The report must be a well-formed cpu line
        assert!(profiler.report().starts_with("cpu "));
        assert!(profiler.report()
                        .split_whitespace()
                        .skip(1)
                        .all(|column| column.parse::<u64>().is_ok()));
    }

    /// Check that report dumping writes the report plus a newline
    #[test]
    fn dump_report() {
        struct FixedProfiler;
        impl Profiler for FixedProfiler {
            fn start(&mut self) -> ::std::io::Result<()> { Ok(()) }
            fn stop(&mut self) -> ::std::io::Result<()> { Ok(()) }
            fn report(&self) -> &str { "cpu 1 2 3" }
        }

        let target = env::temp_dir().join("febench_profiler_dump");
        FixedProfiler.dump(Path::new(&target))
                     .expect("Failed to dump a report");
        let written = fs::read_to_string(&target)
                         .expect("Failed to read the dump back");
        fs::remove_file(&target).expect("Failed to clean up the dump");
        assert_eq!(written, "cpu 1 2 3\n");
    }
}
