//! febench is a small toolkit for running file system and storage benchmarks
//! on Linux and making sense of their output.
//!
//! It bundles the handful of facilities which every long-running benchmark
//! campaign ends up needing:
//!
//! - A hierarchical result container, indexed by variable-length key paths
//!   such as "workload.filesystem.disks.threads.iops", with forgiving reads
//!   and recursive leaf collection (see the results module).
//! - Parsers for the ad-hoc text output of common Linux performance tools:
//!   /proc/stat, /proc/lock_stat, oprofile and postmark (see parsers).
//! - Profiling session drivers which snapshot kernel counters around a
//!   workload or drive external profilers like perf (see profiler).
//! - Aggregation helpers (per-key averages, top-N views) and chart-data
//!   preparation for plotting backends (see analysis and plot).
//! - A checkpoint/resume log so that a multi-hour test script which dies
//!   half-way can skip the steps it already completed (see checkpoint).
//! - Assorted OS helpers for privilege checks, CPU enumeration, disk
//!   mounting and cache dropping (see osutil).
//!
//! Everything is synchronous and single-threaded: a benchmark run is a
//! sequential script, and these helpers are meant to be called from it.

extern crate bytesize;
extern crate chrono;
extern crate itertools;
#[macro_use] extern crate lazy_static;
extern crate libc;
extern crate regex;
#[cfg(test)]
extern crate testbench;

#[macro_use]
pub mod results;

pub mod analysis;
pub mod checkpoint;
pub mod osutil;
pub mod parsers;
pub mod plot;
pub mod profiler;

mod reader;
