// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! On-disk snapshot of the datastore, written atomically: the new state is
//! serialized to a temp file in the same directory, synced, then renamed
//! over the previous snapshot so a crash never leaves a torn file.

use super::types::{StoreError, Tag, Translation, User};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SnapshotData {
    #[serde(default)]
    pub translations: Vec<Translation>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub users: Vec<User>,
    /// (translation_id, tag_id) join rows.
    #[serde(default)]
    pub links: Vec<(u64, u64)>,
    #[serde(default)]
    pub next_translation_id: u64,
    #[serde(default)]
    pub next_tag_id: u64,
    #[serde(default)]
    pub next_user_id: u64,
}

pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: PathBuf) -> Result<Self, StoreError> {
        if path.as_os_str().is_empty() {
            return Err(StoreError::FileError(
                "Snapshot file path is empty".to_string(),
            ));
        }
        Ok(Self { path })
    }

    /// Load the snapshot, or an empty dataset when the file does not exist
    /// yet (first run).
    pub fn load(&self) -> Result<SnapshotData, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SnapshotData::default());
            }
            Err(err) => {
                return Err(StoreError::FileError(format!(
                    "Failed to read snapshot file: {}",
                    err
                )));
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| StoreError::ParseError(format!("Failed to parse snapshot file: {}", e)))
    }

    pub fn save(&self, data: &SnapshotData) -> Result<(), StoreError> {
        let parent = self.path.parent().ok_or_else(|| {
            StoreError::FileError("Snapshot file path has no parent directory".to_string())
        })?;
        let file_name = self.path.file_name().ok_or_else(|| {
            StoreError::FileError("Snapshot file path has no file name".to_string())
        })?;

        let serialized = serde_json::to_vec(data).map_err(|e| {
            StoreError::ParseError(format!("Failed to serialize snapshot: {}", e))
        })?;

        let (mut file, temp_path) = create_temp_file(parent, file_name)?;

        if let Err(err) = file.write_all(&serialized) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to write snapshot temp file: {}",
                err
            )));
        }
        if let Err(err) = file.sync_all() {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to sync snapshot temp file: {}",
                err
            )));
        }

        if let Err(err) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::FileError(format!(
                "Failed to replace snapshot file: {}",
                err
            )));
        }

        #[cfg(unix)]
        {
            if let Err(err) = sync_parent_dir(parent) {
                log::warn!("Snapshot directory sync failed: {}", err);
            }
        }

        Ok(())
    }
}

fn create_temp_file(
    dir: &Path,
    file_name: &std::ffi::OsStr,
) -> Result<(std::fs::File, PathBuf), StoreError> {
    use std::fs::OpenOptions;
    const MAX_ATTEMPTS: u32 = 100;
    let base = file_name.to_string_lossy();
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = dir.join(format!(".{}.tmp.{}.{}", base, std::process::id(), attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::FileError(format!(
                    "Failed to create snapshot temp file: {}",
                    err
                )));
            }
        }
    }
    Err(StoreError::FileError(
        "Failed to create snapshot temp file after repeated attempts".to_string(),
    ))
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> Result<(), StoreError> {
    let dir = std::fs::File::open(parent).map_err(|err| {
        StoreError::FileError(format!("Failed to open snapshot directory for sync: {}", err))
    })?;
    dir.sync_all()
        .map_err(|err| StoreError::FileError(format!("Failed to sync snapshot directory: {}", err)))
}
