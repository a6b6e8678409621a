//! Collector for the Linux `/proc/modules` pseudo-file.

pub mod modules;
pub mod parser;

pub use modules::{DEFAULT_PROC_MODULES, LsmodError, lsmod, lsmod_with};
pub use parser::{Field, FieldError, ParseError, ScanError};
