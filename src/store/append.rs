use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::app::{HarvestError, Result};

/// Append-only text file shared between workers.
///
/// Each line goes out in a single locked write followed by a flush, so
/// concurrent callers never interleave within a line.
pub struct AppendFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl AppendFile {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Open an existing-or-new file without write access, so every append fails.
    #[cfg(test)]
    pub fn read_only(path: &Path) -> Result<Self> {
        let append = Self::open(path)?;
        Ok(Self {
            file: Mutex::new(File::open(path)?),
            ..append
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `line` plus a newline. Embedded newlines are flattened to spaces.
    pub fn append_line(&self, line: &str) -> Result<()> {
        let mut buf = line.replace(['\r', '\n'], " ");
        buf.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| HarvestError::Other(format!("{} lock poisoned", self.path.display())))?;
        file.write_all(buf.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_append_creates_parent_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.txt");
        let log = AppendFile::open(&path).unwrap();
        log.append_line("one").unwrap();
        log.append_line("two\nlines").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo lines\n");
    }

    #[test]
    fn test_append_to_read_only_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = AppendFile::read_only(&dir.path().join("log.txt")).unwrap();
        assert!(log.append_line("one").is_err());
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let log = Arc::new(AppendFile::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.append_line(&format!("https://s.example/app/{t}/{i}/")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("https://s.example/app/") && l.ends_with('/')));
    }
}
