use crate::audit::event::{compute_entry_hash, finalize_entry, JournalEntry, ZERO_HASH_64};
use crate::error::{CoreError, CoreResult};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const JOURNAL_FILE_NAME: &str = "activity.ndjson";

/// Append-only NDJSON journal; each line chains to the previous line's hash.
pub struct ActivityJournal {
    path: PathBuf,
    last_hash: String,
}

impl ActivityJournal {
    pub fn open_or_create(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
            return Ok(Self {
                path,
                last_hash: ZERO_HASH_64.to_string(),
            });
        }
        let last_hash = read_entries(&path)?
            .last()
            .map(|e| e.hash.clone())
            .unwrap_or_else(|| ZERO_HASH_64.to_string());
        Ok(Self { path, last_hash })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, mut entry: JournalEntry) -> CoreResult<JournalEntry> {
        entry.prev_hash = self.last_hash.clone();
        let entry = finalize_entry(entry)?;
        let line = serde_json::to_string(&entry)?;
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        self.last_hash = entry.hash.clone();
        Ok(entry)
    }
}

pub fn read_entries(path: &Path) -> CoreResult<Vec<JournalEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(&line)?);
    }
    Ok(out)
}

/// Checks every link and every hash; returns the entry count.
pub fn verify_chain(path: &Path) -> CoreResult<usize> {
    let entries = read_entries(path)?;
    let mut prev = ZERO_HASH_64.to_string();
    for (idx, e) in entries.iter().enumerate() {
        if e.prev_hash != prev {
            return Err(CoreError::InvalidInput(format!(
                "journal line {} does not chain to its predecessor",
                idx + 1
            )));
        }
        if compute_entry_hash(e)? != e.hash {
            return Err(CoreError::InvalidInput(format!(
                "journal line {} hash mismatch",
                idx + 1
            )));
        }
        prev = e.hash.clone();
    }
    Ok(entries.len())
}
