use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::app::Result;
use crate::store::append::AppendFile;

/// Durable record of links this device has already processed.
///
/// One URL per line, append-only. Membership is the only query, so duplicate
/// lines left by an interrupted run are harmless.
pub struct ProgressLedger {
    file: AppendFile,
}

impl ProgressLedger {
    /// Read the processed set from `path`. A missing file is a first run.
    pub fn load(path: &Path) -> Result<HashSet<String>> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            file: AppendFile::open(path)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn read_only(path: &Path) -> Result<Self> {
        Ok(Self {
            file: AppendFile::read_only(path)?,
        })
    }

    /// Mark `url` as processed. Safe to call from many workers at once.
    pub fn record(&self, url: &str) -> Result<()> {
        self.file.append_line(url)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let done = ProgressLedger::load(&dir.path().join("progress_1.txt")).unwrap();
        assert!(done.is_empty());
    }

    #[test]
    fn test_record_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress_1.txt");

        let ledger = ProgressLedger::open(&path).unwrap();
        ledger.record("https://s.example/app/1/").unwrap();
        ledger.record("https://s.example/app/2/").unwrap();
        ledger.record("https://s.example/app/1/").unwrap();

        let done = ProgressLedger::load(&path).unwrap();
        assert_eq!(done.len(), 2);
        assert!(done.contains("https://s.example/app/1/"));
        assert!(done.contains("https://s.example/app/2/"));
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress_1.txt");

        ProgressLedger::open(&path).unwrap().record("a").unwrap();
        ProgressLedger::open(&path).unwrap().record("b").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress_1.txt");
        fs::write(&path, "a\n\n  \nb\r\n").unwrap();

        let done = ProgressLedger::load(&path).unwrap();
        assert_eq!(done.len(), 2);
        assert!(done.contains("b"));
    }
}
