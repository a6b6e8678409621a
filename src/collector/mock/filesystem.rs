//! In-memory mock filesystem for testing collectors without real `/proc`.

use crate::collector::traits::FileSystem;
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum MockFile {
    Content(String),
    /// Yields the content, then fails the next read.
    FailAfter(String),
}

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: HashMap<PathBuf, MockFile>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(
            path.as_ref().to_path_buf(),
            MockFile::Content(content.into()),
        );
    }

    /// Adds a file that opens fine but returns an I/O error once `content`
    /// has been read.
    pub fn add_failing_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(
            path.as_ref().to_path_buf(),
            MockFile::FailAfter(content.into()),
        );
    }

    /// Loads a single real file into the mock under `virtual_path`.
    ///
    /// Useful for regression tests with captured `/proc/modules` snapshots.
    pub fn from_snapshot(real_path: &Path, virtual_path: impl AsRef<Path>) -> io::Result<Self> {
        let mut fs = Self::new();
        fs.add_file(virtual_path, std::fs::read_to_string(real_path)?);
        Ok(fs)
    }
}

/// Reader that serves a buffer and then errors.
struct FailingReader<'a> {
    data: &'a [u8],
}

impl Read for FailingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::other("simulated read failure"));
        }
        let n = self.data.len().min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

impl FileSystem for MockFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        match self.files.get(path) {
            Some(MockFile::Content(content)) => Ok(Box::new(content.as_bytes())),
            Some(MockFile::FailAfter(content)) => Ok(Box::new(BufReader::new(FailingReader {
                data: content.as_bytes(),
            }))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/modules", "ext4 1 1 - Live 0x0\n");

        let mut content = String::new();
        fs.open(Path::new("/proc/modules"))
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "ext4 1 1 - Live 0x0\n");
    }

    #[test]
    fn test_mock_fs_missing_file() {
        let fs = MockFs::new();
        let err = fs.open(Path::new("/proc/modules")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_fs_failing_file() {
        let mut fs = MockFs::new();
        fs.add_failing_file("/proc/modules", "ext4 1 1 - Live 0x0\n");

        let mut lines = fs.open(Path::new("/proc/modules")).unwrap().lines();
        assert_eq!(lines.next().unwrap().unwrap(), "ext4 1 1 - Live 0x0");
        assert!(lines.next().unwrap().is_err());
    }

    #[test]
    fn test_mock_fs_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("modules");
        std::fs::write(&real, "loop 40960 0 - Live 0x0\n").unwrap();

        let fs = MockFs::from_snapshot(&real, "/proc/modules").unwrap();
        let line = fs.open(Path::new("/proc/modules")).unwrap().lines().next();
        assert_eq!(line.unwrap().unwrap(), "loop 40960 0 - Live 0x0");
    }
}
