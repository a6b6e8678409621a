//! Abstraction for opening line sources to enable testing and mocking.
//!
//! The `FileSystem` trait lets the module collector read the real
//! `/proc/modules` on Linux and in-memory fixtures in tests.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Abstraction for filesystem access.
pub trait FileSystem: Send + Sync {
    /// Opens a file for buffered, line oriented reading.
    ///
    /// The returned reader is owned by the caller and closed on drop.
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_open_reads_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modules");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "ext4 1015808 1 - Live 0x0").unwrap();
        writeln!(file, "jbd2 180224 1 ext4, Live 0x0").unwrap();

        let fs = RealFs::new();
        let reader = fs.open(&path).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("jbd2"));
    }

    #[test]
    fn test_real_fs_open_missing() {
        let fs = RealFs::new();
        let err = fs.open(Path::new("/nonexistent/path/12345")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
