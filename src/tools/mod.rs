//! The tools module provides helper functions for huffzip.
//!
//! The tools are:
//! - cli: Command line interface for huffzip.
//! - freq_count: Frequency count of the input bytes.
//!
pub mod cli;
pub mod freq_count;
