//! Reads `/proc/modules` into a [`ModuleTable`].

use crate::collector::procfs::parser::{ParseError, ScanError, parse_proc_modules};
use crate::collector::traits::{FileSystem, RealFs};
use crate::model::ModuleTable;
use std::path::Path;
use tracing::debug;

/// Pseudo-file read when the caller passes an empty path.
pub const DEFAULT_PROC_MODULES: &str = "/proc/modules";

/// Error type for reading the module table.
#[derive(Debug)]
pub enum LsmodError {
    /// The source could not be opened.
    Open {
        path: String,
        source: std::io::Error,
    },
    /// Reading failed part way through the source.
    Read {
        path: String,
        source: std::io::Error,
    },
    /// A line of the source is malformed.
    Parse {
        path: String,
        line: usize,
        source: ParseError,
    },
}

impl LsmodError {
    fn from_scan(path: &str, err: ScanError) -> Self {
        let path = path.to_string();
        match err {
            ScanError::Io(source) => LsmodError::Read { path, source },
            ScanError::Parse { line, source } => LsmodError::Parse { path, line, source },
        }
    }

    /// Path of the source the error refers to.
    pub fn path(&self) -> &str {
        match self {
            LsmodError::Open { path, .. }
            | LsmodError::Read { path, .. }
            | LsmodError::Parse { path, .. } => path,
        }
    }
}

impl std::fmt::Display for LsmodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LsmodError::Open { path, source } => write!(f, "error opening {:?}: {}", path, source),
            LsmodError::Read { path, source } => write!(f, "error reading {:?}: {}", path, source),
            LsmodError::Parse { path, line, source } => {
                write!(f, "error parsing {:?} line {}: {}", path, line, source)
            }
        }
    }
}

impl std::error::Error for LsmodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LsmodError::Open { source, .. } | LsmodError::Read { source, .. } => Some(source),
            LsmodError::Parse { source, .. } => Some(source),
        }
    }
}

/// Reads the loaded module table from `path`, or from
/// [`DEFAULT_PROC_MODULES`] when `path` is empty.
pub fn lsmod(path: &str) -> Result<ModuleTable, LsmodError> {
    lsmod_with(&RealFs::new(), path)
}

/// Same as [`lsmod`] over an arbitrary [`FileSystem`].
pub fn lsmod_with<F: FileSystem + ?Sized>(fs: &F, path: &str) -> Result<ModuleTable, LsmodError> {
    let path = if path.is_empty() {
        DEFAULT_PROC_MODULES
    } else {
        path
    };
    debug!(path, "reading module table");

    let reader = fs.open(Path::new(path)).map_err(|source| LsmodError::Open {
        path: path.to_string(),
        source,
    })?;
    let modules = parse_proc_modules(reader).map_err(|e| LsmodError::from_scan(path, e))?;

    debug!(path, modules = modules.len(), "module table parsed");
    Ok(modules)
}
