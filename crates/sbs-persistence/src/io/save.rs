//! Snapshot saving.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{PersistenceError, Result};
use crate::types::BoardSnapshot;

/// Folder next to the snapshot that receives backups.
const BACKUP_DIR: &str = "bak";

/// Appends `.json` unless the path already ends with it.
pub fn snapshot_path(path: &Path) -> PathBuf {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// `<dir>/bak/<file>.<YYYYmmddHHMMSS>.bak`
pub fn backup_path_for(path: &Path, at: DateTime<Local>) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(BACKUP_DIR)
        .join(format!("{}.{}.bak", file_name, at.format("%Y%m%d%H%M%S")))
}

/// Save a snapshot, returning the path actually written.
///
/// An existing file is copied to the backup folder first; a failed backup
/// is logged and does not stop the save. The write itself goes through a
/// temp file and a rename.
pub fn save_snapshot(snapshot: &mut BoardSnapshot, path: &Path) -> Result<PathBuf> {
    let path = snapshot_path(path);
    snapshot.touch();

    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|source| PersistenceError::Serialization { source })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if path.exists() {
        backup_existing(&path);
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(&bytes).map_err(|e| PersistenceError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, &path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.clone(),
        source: e,
    })?;

    tracing::info!(
        path = %path.display(),
        rows = snapshot.row_status.len(),
        "saved snapshot"
    );
    Ok(path)
}

fn backup_existing(path: &Path) {
    let backup = backup_path_for(path, Local::now());
    let result = backup
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::copy(path, &backup));
    match result {
        Ok(_) => tracing::debug!(backup = %backup.display(), "previous snapshot backed up"),
        Err(error) => tracing::warn!(
            path = %path.display(),
            %error,
            "could not back up previous snapshot, saving anyway"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_path_appends_extension() {
        assert_eq!(snapshot_path(Path::new("review")), PathBuf::from("review.json"));
        assert_eq!(snapshot_path(Path::new("review.json")), PathBuf::from("review.json"));
        assert_eq!(snapshot_path(Path::new("a.txt")), PathBuf::from("a.txt.json"));
    }

    #[test]
    fn test_backup_path_layout() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 5).unwrap();
        let backup = backup_path_for(Path::new("/work/review.json"), at);
        assert_eq!(
            backup,
            PathBuf::from("/work/bak/review.json.20240501093005.bak")
        );
    }

    #[test]
    fn test_save_snapshot() {
        let dir = tempdir().unwrap();
        let mut snapshot = BoardSnapshot::default();
        snapshot.row_status.insert("0".into(), 1);

        let written = save_snapshot(&mut snapshot, &dir.path().join("state")).unwrap();
        assert_eq!(written, dir.path().join("state.json"));
        assert!(!dir.path().join("state.json.tmp").exists());

        let text = fs::read_to_string(&written).unwrap();
        assert!(text.contains("\"row_status\""));
        assert!(text.contains("\"version\": \"1.2\""));
        assert!(snapshot.saved_at.is_some());
    }

    #[test]
    fn test_overwrite_keeps_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut snapshot = BoardSnapshot::default();
        save_snapshot(&mut snapshot, &path).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        snapshot.row_status.insert("4".into(), 3);
        save_snapshot(&mut snapshot, &path).unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path().join("bak"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(backups.len(), 1);
        let name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("state.json.") && name.ends_with(".bak"));
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), first);
    }

    #[test]
    fn test_backup_failure_does_not_block_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{}").unwrap();
        // A plain file where the backup folder should be.
        fs::write(dir.path().join("bak"), "").unwrap();

        let mut snapshot = BoardSnapshot::default();
        snapshot.row_status.insert("1".into(), 2);
        save_snapshot(&mut snapshot, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"1\": 2"));
    }
}
