use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use super::{trim_leading_zeros, SessionRecord};
use crate::error::{Error, Result};

const PREFIX: &str = "session_";
const EXTENSION: &str = "txt";
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";

/// Directory of finished sessions, one flat file of numbers per session.
pub struct SessionLog {
    dir: PathBuf,
}

impl SessionLog {
    /// Opens the store at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Error::storage(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `series` without its leading zero padding, named after the
    /// current local time. Returns `None` when there was nothing to write.
    pub fn save(&self, series: &[f64]) -> Result<Option<PathBuf>> {
        self.save_at(series, Local::now().naive_local())
    }

    pub fn save_at(&self, series: &[f64], ended: NaiveDateTime) -> Result<Option<PathBuf>> {
        let samples = trim_leading_zeros(series);
        if samples.is_empty() {
            info!("session has no samples, nothing saved");
            return Ok(None);
        }

        let stamp = ended.format(STAMP_FORMAT).to_string();
        let (path, file) = self.create_unique(&stamp)?;

        let mut writer = BufWriter::new(file);
        let written: io::Result<()> = samples
            .iter()
            .try_for_each(|v| writeln!(writer, "{v}"))
            .and_then(|_| writer.flush());
        written.map_err(|e| Error::storage(&path, e))?;

        info!(path = %path.display(), samples = samples.len(), "session saved");
        Ok(Some(path))
    }

    /// Reads every stored session in file name order. Unreadable files are
    /// skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<SessionRecord>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::storage(&self.dir, e))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_session_file(p))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            match read_samples(&path) {
                Ok(samples) => records.push(SessionRecord::new(parse_stamp(&path), samples)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable session"),
            }
        }
        Ok(records)
    }

    fn create_unique(&self, stamp: &str) -> Result<(PathBuf, File)> {
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{PREFIX}{stamp}.{EXTENSION}")
            } else {
                format!("{PREFIX}{stamp}.{attempt}.{EXTENSION}")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempt < 100 => {
                    attempt += 1;
                }
                Err(e) => return Err(Error::storage(path, e)),
            }
        }
    }
}

fn is_session_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(PREFIX))
}

fn read_samples(path: &Path) -> io::Result<Vec<f64>> {
    let reader = BufReader::new(File::open(path)?);
    let mut samples = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = line.parse::<f64>().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("'{line}': {e}"))
        })?;
        samples.push(value);
    }
    Ok(samples)
}

fn parse_stamp(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(PREFIX)?.split('.').next()?;
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
}
