use crate::app_dirs::AppDirs;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// One finished session as appended to the csv session log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub date: String,
    pub bank: String,
    pub mode: String,
    pub total: usize,
    pub correct: usize,
    pub coins: u32,
    pub xp: u32,
    pub passed: bool,
    pub elapsed_secs: f64,
}

/// Append-only csv log of finished sessions.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new() -> Option<Self> {
        AppDirs::session_log_path().map(|path| Self { path })
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Appends a record. The header is emitted only when the file is new.
    pub fn append(&self, record: &SessionRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        Ok(())
    }

    pub fn read_all(&self) -> io::Result<Vec<SessionRecord>> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut records = Vec::new();
        for result in reader.deserialize() {
            records.push(result?);
        }

        Ok(records)
    }
}
