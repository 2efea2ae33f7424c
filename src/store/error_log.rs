use std::path::Path;

use crate::app::Result;
use crate::store::append::AppendFile;

/// Per-device log of failed links, one `<url> | <message>` line each.
pub struct ErrorLog {
    file: AppendFile,
}

impl ErrorLog {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            file: AppendFile::open(path)?,
        })
    }

    pub fn record(&self, url: &str, message: &str) -> Result<()> {
        self.file.append_line(&format!("{} | {}", url, message))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
