//! JSON snapshot persistence for the memory store
//!
//! The whole store state is written to one JSON file after every committed
//! write. The file is replaced via a temporary sibling and a rename, so a
//! crash mid-write leaves the previous snapshot intact.
//!
//! Processes sharing a snapshot coordinate through an advisory lock on a
//! `.lock` sibling: shared for reads, exclusive for read-modify-write.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::core::error::{MatchingError, Result};

use super::memory::StoreState;

/// Load a snapshot, or an empty state if the file does not exist
pub fn load(path: &Path) -> Result<StoreState> {
    if !path.exists() {
        return Ok(StoreState::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| MatchingError::Storage(format!("read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| MatchingError::Storage(format!("parse {}: {e}", path.display())))
}

/// Write a snapshot
pub fn save(path: &Path, state: &StoreState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| MatchingError::Storage(format!("create {}: {e}", parent.display())))?;
    }
    let content = serde_json::to_string_pretty(state)
        .map_err(|e| MatchingError::Storage(format!("serialize store: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .map_err(|e| MatchingError::Storage(format!("write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| MatchingError::Storage(format!("replace {}: {e}", path.display())))
}

/// Advisory lock on a snapshot, released on drop
#[derive(Debug)]
pub struct SnapshotLock {
    _file: File,
}

/// Lock access to the snapshot at `path`, blocking until granted
pub fn lock(path: &Path, exclusive: bool) -> Result<SnapshotLock> {
    let lock_path = lock_path(path);
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| MatchingError::Storage(format!("create {}: {e}", parent.display())))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| MatchingError::Storage(format!("open {}: {e}", lock_path.display())))?;
    let locked = if exclusive {
        FileExt::lock_exclusive(&file)
    } else {
        FileExt::lock_shared(&file)
    };
    locked.map_err(|e| MatchingError::Storage(format!("lock {}: {e}", lock_path.display())))?;
    Ok(SnapshotLock { _file: file })
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
