// ABOUTME: Pre-deploy backups of the database, media files, and environment file.
// ABOUTME: Creates uniquely named backup directories and rotates out all but the newest.

mod copy;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::deploy::DeployError;
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::Environment;

pub const BACKUP_DIR: &str = "backups";
pub const DEFAULT_RETENTION: usize = 7;

const BACKUP_PREFIX: &str = "backup_";
const DATABASE_FILE: &str = "db.sqlite3";
const MEDIA_DIR: &str = "media";
const ENV_FILE: &str = ".env";

/// A backup taken before a deployment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub environment: Environment,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Creates and rotates backups under a fixed backup root.
///
/// Assumes a single deployer per project directory. Directory creation is
/// atomic per name, but nothing coordinates two concurrent processes.
#[derive(Debug, Clone)]
pub struct BackupManager {
    project_root: PathBuf,
    root: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(project_root: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            root: root.into(),
            retention: DEFAULT_RETENTION,
        }
    }

    /// Backups stored in `<project_root>/backups`.
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let root = project_root.join(BACKUP_DIR);
        Self::new(project_root, root)
    }

    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy the database, media directory, and environment file, each only if
    /// present, into a new `backup_<env>_<unix-seconds>` directory.
    pub fn create_backup(&self, environment: Environment) -> Result<BackupRecord, DeployError> {
        tracing::info!("Creating backup...");

        self.try_create_backup(environment).map_err(|e| {
            tracing::error!("Backup creation failed: {}", e);
            DeployError::backup(format!("Failed to create backup: {e}")).with_source(e)
        })
    }

    fn try_create_backup(&self, environment: Environment) -> io::Result<BackupRecord> {
        fs::create_dir_all(&self.root)?;

        let created_at = Utc::now();
        let path = self.reserve_dir(environment, created_at.timestamp())?;

        let database = self.project_root.join(DATABASE_FILE);
        if database.is_file() {
            fs::copy(&database, path.join(DATABASE_FILE))?;
            tracing::info!("Database backup created");
        }

        let media = self.project_root.join(MEDIA_DIR);
        if media.is_dir() {
            copy::copy_dir_all(&media, &path.join(MEDIA_DIR))?;
            tracing::info!("Media files backup created");
        }

        let env_file = self.project_root.join(ENV_FILE);
        if env_file.is_file() {
            fs::copy(&env_file, path.join(ENV_FILE))?;
            tracing::info!("Environment file backup created");
        }

        tracing::info!("Backup created successfully at {}", path.display());
        Ok(BackupRecord {
            environment,
            path,
            created_at,
        })
    }

    /// Atomically create the backup directory, adding a `_<n>` suffix when
    /// another backup already took this second.
    fn reserve_dir(&self, environment: Environment, timestamp: i64) -> io::Result<PathBuf> {
        let base = format!("{BACKUP_PREFIX}{environment}_{timestamp}");
        let mut sequence = 0u32;
        loop {
            let name = if sequence == 0 {
                base.clone()
            } else {
                format!("{base}_{sequence}")
            };
            let path = self.root.join(name);
            match fs::create_dir(&path) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => sequence += 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// All backup entries, oldest first.
    ///
    /// Ordered by creation time (modification time where the filesystem has
    /// no birth time), then by the timestamp and sequence in the name.
    pub fn list_backups(&self) -> io::Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut backups: Vec<(SystemTime, (i64, u32), PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(BACKUP_PREFIX) {
                continue;
            }
            let metadata = entry.metadata()?;
            let created = metadata.created().or_else(|_| metadata.modified())?;
            backups.push((created, name_order(&name), entry.path()));
        }

        backups.sort();
        Ok(backups.into_iter().map(|(_, _, path)| path).collect())
    }

    /// Delete all but the newest backups. Failures are warnings only.
    ///
    /// Returns the number of backups removed.
    pub fn cleanup_old_backups(&self, diag: &mut Diagnostics) -> usize {
        match self.rotate() {
            Ok(removed) => {
                tracing::info!("Old backups cleaned up ({} removed)", removed);
                removed
            }
            Err(e) => {
                diag.warn(Warning::backup_rotation(format!(
                    "Failed to cleanup old backups: {e}"
                )));
                0
            }
        }
    }

    fn rotate(&self) -> io::Result<usize> {
        let backups = self.list_backups()?;
        let excess = backups.len().saturating_sub(self.retention);

        for path in &backups[..excess] {
            if path.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
            tracing::debug!("Removed old backup {}", path.display());
        }

        Ok(excess)
    }
}

/// Timestamp and sequence embedded in `backup_<env>_<secs>[_<n>]`.
fn name_order(name: &str) -> (i64, u32) {
    let mut parts = name.trim_start_matches(BACKUP_PREFIX).split('_').skip(1);
    let timestamp = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let sequence = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    (timestamp, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_order_reads_timestamp_and_sequence() {
        assert_eq!(name_order("backup_local_1700000000"), (1700000000, 0));
        assert_eq!(name_order("backup_docker_1700000000_12"), (1700000000, 12));
        assert_eq!(name_order("backup_notes.txt"), (0, 0));
    }

    #[test]
    fn name_order_sorts_sequences_numerically() {
        assert!(name_order("backup_local_5_2") < name_order("backup_local_5_10"));
        assert!(name_order("backup_local_5_10") < name_order("backup_local_6"));
    }

    #[test]
    fn missing_root_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path(), dir.path().join("nope"));
        assert!(manager.list_backups().unwrap().is_empty());
    }
}
