use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key-value boundary the cache persists through. One value per key,
/// always replaced whole.
pub trait DurableStore: Send {
    fn get(&self, key: &str) -> CoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&mut self, key: &str) -> CoreResult<()>;
}

fn validate_key(key: &str) -> CoreResult<()> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CoreError::InvalidInput(format!(
            "store key must be [A-Za-z0-9_-]+, got '{}'",
            key
        )));
    }
    Ok(())
}

/// One `<key>.json` file per key under `root`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl AsRef<Path>) -> CoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        validate_key(key)?;
        let target = self.path_for(key);
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        let written = (|| -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(value.as_bytes())?;
            f.sync_all()?;
            // rename over the old file so readers never see a half-written payload
            fs::rename(&tmp, &target)
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_like_keys_are_rejected() {
        let mut s = MemoryStore::new();
        assert!(s.set("../escape", "x").is_err());
        assert!(s.set("", "x").is_err());
        assert!(s.set("flood_requests_cache", "x").is_ok());
    }

    #[test]
    fn file_store_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path()).unwrap();
        assert_eq!(s.get("k").unwrap(), None);
        s.set("k", "[1]").unwrap();
        s.set("k", "[2]").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("[2]"));
        s.remove("k").unwrap();
        assert!(!s.path_for("k").exists());
        s.remove("k").unwrap();
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path()).unwrap();
        // a directory at the target path makes the final rename fail
        fs::create_dir(s.path_for("k")).unwrap();
        fs::write(s.path_for("k").join("occupied"), "x").unwrap();

        assert!(s.set("k", "[1]").is_err());
        assert!(!dir.path().join(".k.json.tmp").exists());
    }
}
