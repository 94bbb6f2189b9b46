//! CSV row formatting and the directory-backed table sink.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use beamline_core::{Detector, EventId, HitRecord, SinkError, Species, Table, TableSink};

/// Format one trajectory-table row.
///
/// Columns: `EventID,Detector,X,PX,Y,PY,Z,PZ`. Positions in cm, momenta in
/// GeV/c. `detector` is the bucket the hit was recorded under.
pub fn trajectory_row(event: EventId, detector: Detector, hit: &HitRecord) -> String {
    let (x, p) = (hit.position, hit.momentum);
    format!(
        "{event},{detector},{},{},{},{},{},{}",
        x.x, p.x, x.y, p.y, x.z, p.z
    )
}

/// Format one particle-table row.
///
/// Columns: `EventID,Detector,ParticleName,Energy`. Energy in GeV.
pub fn particle_row(event: EventId, detector: Detector, species: Species, energy: f64) -> String {
    format!("{event},{detector},{species},{energy}")
}

/// One append's text: the optional header, then each row, newline-terminated.
fn render_block(header: Option<&str>, rows: &[String]) -> String {
    let len = header.map_or(0, |h| h.len() + 1) + rows.iter().map(|r| r.len() + 1).sum::<usize>();
    let mut block = String::with_capacity(len);
    for line in header.into_iter().chain(rows.iter().map(String::as_str)) {
        block.push_str(line);
        block.push('\n');
    }
    block
}

/// Appends tables as CSV files inside one directory.
///
/// Every [`append`](TableSink::append) opens the file in append mode,
/// writes the whole block with a single `write_all`, flushes and closes it
/// again. Appends are serialized so rows from concurrent workers never
/// interleave. A write error can still leave a truncated block behind if
/// the OS accepted part of it (e.g. a full disk).
#[derive(Debug)]
pub struct CsvDirSink {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvDirSink {
    /// A sink writing into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create `dir` (and parents) if needed, then build the sink.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SinkError::Open {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(dir))
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of `table` inside the output directory.
    pub fn path(&self, table: Table) -> PathBuf {
        self.dir.join(table.file_name())
    }
}

impl TableSink for CsvDirSink {
    fn append(&self, table: Table, header: Option<&str>, rows: &[String]) -> Result<(), SinkError> {
        let path = self.path(table);
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SinkError::Open {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let block = render_block(header, rows);
        if block.is_empty() {
            return Ok(());
        }
        file.write_all(block.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| SinkError::Write {
                path,
                reason: e.to_string(),
            })
    }
}
