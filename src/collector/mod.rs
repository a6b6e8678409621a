//! Kernel module collector for Linux.
//!
//! Reads the `/proc/modules` pseudo-file into a [`ModuleTable`], with support
//! for mocking so tests run without a Linux `/proc`.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │          lsmod / lsmod_with            │
//! │  ┌──────────────────────────────────┐  │
//! │  │  parser: line -> ModuleInfo      │  │
//! │  └────────────────┬─────────────────┘  │
//! │            ┌──────▼──────┐             │
//! │            │  FileSystem │ (trait)     │
//! │            └──────┬──────┘             │
//! └───────────────────┼────────────────────┘
//!            ┌────────┴────────┐
//!     ┌──────▼──────┐   ┌──────▼──────┐
//!     │   RealFs    │   │   MockFs    │
//!     │  (Linux)    │   │  (Testing)  │
//!     └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! let modules = lsmod::collector::lsmod("").unwrap();
//! for (name, info) in &modules {
//!     println!("{} {} {}", name, info.mem, info.state);
//! }
//! ```
//!
//! ```
//! use lsmod::collector::{MockFs, lsmod_with};
//!
//! let fs = MockFs::typical_system();
//! let modules = lsmod_with(&fs, "").unwrap();
//! assert!(modules.contains_key("ext4"));
//! ```
//!
//! [`ModuleTable`]: crate::model::ModuleTable

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{DEFAULT_PROC_MODULES, LsmodError, lsmod, lsmod_with};
pub use traits::{FileSystem, RealFs};
