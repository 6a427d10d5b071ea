//! This module contains parsers for benchmark and profiling tool output
//!
//! Each submodule handles the ad-hoc text format of one tool, and is named
//! after that tool. All parsers follow the same conventions:
//!
//! - A parse() function turns a full output dump, passed as a string, into
//!   flat typed data, ready to be aggregated or stored in a ResultTree.
//! - A load() convenience reads the dump from a file first, propagating
//!   I/O errors through io::Result.
//! - Malformed records inside recognizably-shaped tool output are treated
//!   as caller/environment contract violations and cause panics. These
//!   formats are stable tool interfaces; if they do not parse, either the
//!   wrong file was supplied or the parser needs updating, and silently
//!   producing wrong numbers would be worse than crashing the analysis.

pub mod lockstat;
pub mod oprofile;
pub mod postmark;
pub mod procstat;
