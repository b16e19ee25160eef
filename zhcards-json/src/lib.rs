use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zhcards_core::{CoreError, KeyValueStore};

pub mod paths;

const FILE_VERSION: u32 = 1;
pub const DEFAULT_MAX_BACKUPS: usize = 10;

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    updated_at: DateTime<Utc>,
    entries: BTreeMap<String, String>,
}

impl FileImage {
    fn of(entries: &BTreeMap<String, String>) -> Self {
        Self {
            version: FILE_VERSION,
            updated_at: Utc::now(),
            entries: entries.clone(),
        }
    }
}

/// Key-value store kept in a single JSON file.
///
/// Every write replaces the file atomically (temp file + rename) and drops a
/// timestamped copy into the backups directory, keeping the newest
/// `max_backups`.
pub struct FileStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open_default() -> Result<Self, CoreError> {
        let (file, backups) = paths::default_store_file();
        Self::open_with(file, backups, DEFAULT_MAX_BACKUPS)
    }

    pub fn open_in(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let (file, backups) = paths::store_files_in(dir.into());
        Self::open_with(file, backups, DEFAULT_MAX_BACKUPS)
    }

    pub fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        let max_backups = max_backups.max(1);
        let entries = load_or_init(&path, &backups_dir, max_backups)?;
        debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Ok(Self {
            path,
            backups_dir,
            max_backups,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), CoreError> {
        write_with_backup(&self.path, &self.backups_dir, self.max_backups, &FileImage::of(entries))
            .map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "store write failed");
                CoreError::Storage("io")
            })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut m = self.entries.write();
        let previous = m.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&m) {
            match previous {
                Some(v) => m.insert(key.to_string(), v),
                None => m.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut m = self.entries.write();
        let Some(previous) = m.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&m) {
            m.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(|_| CoreError::Storage("io"))
}

fn load_or_init(path: &Path, backups_dir: &Path, keep: usize) -> Result<BTreeMap<String, String>, CoreError> {
    if path.exists() {
        let mut buf = String::new();
        fs::File::open(path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(|_| CoreError::Storage("io"))?;
        match serde_json::from_str::<FileImage>(&buf) {
            Ok(img) => Ok(img.entries),
            Err(e) => {
                // Keep the unreadable file next to the store and start over.
                let aside = corrupt_path(path);
                warn!(path = %path.display(), moved_to = %aside.display(), error = %e, "store file is corrupt");
                fs::rename(path, &aside).map_err(|_| CoreError::Storage("io"))?;
                init_empty(path, backups_dir, keep)
            }
        }
    } else {
        init_empty(path, backups_dir, keep)
    }
}

fn init_empty(path: &Path, backups_dir: &Path, keep: usize) -> Result<BTreeMap<String, String>, CoreError> {
    let entries = BTreeMap::new();
    write_with_backup(path, backups_dir, keep, &FileImage::of(&entries)).map_err(|_| CoreError::Storage("io"))?;
    Ok(entries)
}

fn corrupt_path(path: &Path) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| paths::STORE_FILE.to_string());
    path.with_file_name(format!("{name}.corrupt-{ts}"))
}

fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, img: &FileImage) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(backups_dir)?;

    let json = serde_json::to_vec_pretty(img)?;
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path)?;

    // Backup rotation
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = backups_dir.join(format!("zhcards-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(&json)?;
    btmp.flush()?;
    btmp.persist(&backup_path)?;

    rotate_backups(backups_dir, max_backups)?;

    Ok(())
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    entries.sort_by_key(|e| e.file_name());
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}
