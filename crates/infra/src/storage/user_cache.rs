//! Durable user cache
//!
//! The cached record only pre-renders the signed-in user across restarts; the
//! session controller always revalidates it with the backend. Tokens are not
//! part of `UserRecord` and never reach this file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use passage_core::UserCache;
use passage_domain::constants::USER_CACHE_FILE;
use passage_domain::{AuthError, Result, UserRecord};
use tracing::debug;

use crate::errors::InfraError;

/// JSON file holding one [`UserRecord`]
///
/// Writes go to a sibling temp file and are renamed into place so a crash
/// never leaves a half-written record.
///
/// File access is synchronous and runs on the calling task; the record is a
/// few hundred bytes written once per login.
#[derive(Debug, Clone)]
pub struct FileUserCache {
    path: PathBuf,
}

impl FileUserCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/user.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(USER_CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl UserCache for FileUserCache {
    fn load(&self) -> Result<Option<UserRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|err| {
            AuthError::Storage(format!("corrupt user cache {}: {err}", self.path.display()))
        })
    }

    fn store(&self, user: &UserRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(InfraError::from)?;
        }

        let json = serde_json::to_vec_pretty(user).map_err(InfraError::from)?;
        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp).map_err(InfraError::from)?;
            file.write_all(&json).map_err(InfraError::from)?;
            file.sync_all().map_err(InfraError::from)?;
        }
        fs::rename(&temp, &self.path).map_err(InfraError::from)?;

        debug!(path = %self.path.display(), "user cache written");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}

/// Non-durable [`UserCache`] for embedders without a writable directory
#[derive(Debug, Default)]
pub struct InMemoryUserCache {
    user: Mutex<Option<UserRecord>>,
}

impl InMemoryUserCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserCache for InMemoryUserCache {
    fn load(&self) -> Result<Option<UserRecord>> {
        Ok(self.user.lock().clone())
    }

    fn store(&self, user: &UserRecord) -> Result<()> {
        *self.user.lock() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.user.lock() = None;
        Ok(())
    }
}
