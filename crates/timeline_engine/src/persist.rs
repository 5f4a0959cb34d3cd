use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use tempfile::NamedTempFile;
use thiserror::Error;
use timeline_core::Record;

use crate::{format_header, format_record, output_filename, Clock, Subject};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("output file not initialized")]
    NotInitialized,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Append-only text file for one run. Content is never rewritten; every
/// write is flushed and synced before returning.
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    file: File,
    records: usize,
}

impl OutputSink {
    /// Opens `path` for append and writes `header`.
    pub fn create(path: PathBuf, header: &str) -> Result<Self, PersistError> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut sink = Self {
            path,
            file,
            records: 0,
        };
        sink.write_durably(header)?;
        Ok(sink)
    }

    pub fn append(&mut self, block: &str) -> Result<(), PersistError> {
        self.write_durably(block)?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> usize {
        self.records
    }

    fn write_durably(&mut self, content: &str) -> Result<(), PersistError> {
        self.file.write_all(content.as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// Writes accepted records to `{dir}/{subject}_tweets_{run}.txt` one at a time.
pub struct IncrementalPersister {
    dir: PathBuf,
    clock: Clock,
    sink: Option<OutputSink>,
}

impl IncrementalPersister {
    pub fn new(dir: PathBuf, clock: Clock) -> Self {
        Self {
            dir,
            clock,
            sink: None,
        }
    }

    /// Creates the output file and writes its header. Replaces any sink left
    /// from an earlier call.
    pub fn initialize(&mut self, subject: &Subject) -> Result<&Path, PersistError> {
        self.sink = None;
        ensure_output_dir(&self.dir)?;

        let run_time = (self.clock)();
        let path = self.dir.join(output_filename(subject.as_str(), run_time));
        let sink = OutputSink::create(path, &format_header(subject.as_str(), run_time))?;
        engine_info!("Writing records to {:?}", sink.path());
        Ok(self.sink.insert(sink).path())
    }

    pub fn append(&mut self, record: &Record) -> Result<(), PersistError> {
        let sink = self.sink.as_mut().ok_or(PersistError::NotInitialized)?;
        sink.append(&format_record(record))?;
        engine_debug!("Saved record {} ({} total)", record.id(), sink.records());
        Ok(())
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.sink.as_ref().map(OutputSink::path)
    }

    pub fn saved(&self) -> usize {
        self.sink.as_ref().map_or(0, OutputSink::records)
    }

    /// Closes the file, returning its path.
    pub fn close(&mut self) -> Option<PathBuf> {
        self.sink.take().map(|sink| sink.path)
    }
}
