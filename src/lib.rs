//! lsmod - parser for the Linux loaded kernel module table.
//!
//! The library reads `/proc/modules` into a map of [`model::ModuleInfo`]
//! records keyed by module name. The `lsmod` binary prints that map.

pub mod collector;
pub mod model;

pub use collector::{DEFAULT_PROC_MODULES, LsmodError, lsmod};
pub use model::{ModuleInfo, ModuleState, ModuleTable, Taint, TaintFlags};
