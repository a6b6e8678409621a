//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for testing the
//! module collector without access to a real `/proc/modules`.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
