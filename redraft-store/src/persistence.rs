//! On-disk layout and file primitives for settings and session state.
//!
//! Several `redraft` processes may run at once against the same files. Each
//! write goes through its own temp file and an atomic rename, so a reader
//! sees either the old document or the new one. Read-modify-write cycles
//! that must not lose updates take a [`FileLock`] first.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "REDRAFT_CONFIG_DIR";
/// Overrides the cache directory holding session state.
pub const CACHE_DIR_ENV: &str = "REDRAFT_CACHE_DIR";

/// How long [`FileLock::acquire`] keeps retrying.
const LOCK_WAIT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(20);
/// A lock file older than this was left behind by a crashed process.
const LOCK_STALE_AFTER: Duration = Duration::from_secs(30);

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// Locations
// ============================================================================

fn dir_from_env(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Directory for `settings.json` and `models.yaml`.
///
/// `$REDRAFT_CONFIG_DIR` wins; otherwise `~/Library/Application
/// Support/Redraft` on macOS and `<config dir>/redraft` elsewhere.
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = dir_from_env(CONFIG_DIR_ENV) {
        return dir;
    }

    #[cfg(target_os = "macos")]
    let base = dirs::home_dir().map(|h| h.join("Library").join("Application Support").join("Redraft"));
    #[cfg(not(target_os = "macos"))]
    let base = dirs::config_dir().map(|c| c.join("redraft"));

    base.unwrap_or_else(|| PathBuf::from(".redraft"))
}

/// Directory for `session.json`.
///
/// `$REDRAFT_CACHE_DIR` wins; otherwise `~/Library/Caches/Redraft` on macOS
/// and `<cache dir>/redraft` elsewhere.
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = dir_from_env(CACHE_DIR_ENV) {
        return dir;
    }

    #[cfg(target_os = "macos")]
    let base = dirs::home_dir().map(|h| h.join("Library").join("Caches").join("Redraft"));
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir().map(|c| c.join("redraft"));

    base.unwrap_or_else(|| PathBuf::from(".redraft"))
}

/// User preferences.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// Session ledger and session instruction.
pub fn default_session_path() -> PathBuf {
    default_cache_dir().join("session.json")
}

/// Optional model catalog overrides.
pub fn default_catalog_path() -> PathBuf {
    default_config_dir().join("models.yaml")
}

// ============================================================================
// Writing
// ============================================================================

/// Creates the parent directory owner-only if it does not exist yet.
async fn ensure_private_parent(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::try_exists(parent).await? {
        return Ok(());
    }

    tokio::fs::create_dir_all(parent).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700)).await?;
    }
    debug!(path = %parent.display(), "Created state directory");
    Ok(())
}

/// Sibling temp path unique to this process and call.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "state".into(), |n| n.to_string_lossy());
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}

/// Replaces `path` with `bytes`, readable by the owner only.
///
/// The temp file is created with mode 0600 and never shared with another
/// writer; the rename makes the new content visible in one step.
pub async fn write_private(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    ensure_private_parent(path).await?;

    let temp = temp_path_for(path);
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let written = async {
        let mut file = options.open(&temp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }

    debug!(path = %path.display(), bytes = bytes.len(), "State file written");
    Ok(())
}

/// Serializes `data` as pretty JSON and writes it with [`write_private`].
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(data)?;
    write_private(path, &json).await
}

// ============================================================================
// Reading
// ============================================================================

/// Reads a JSON document. Missing files are an `Io` error with `NotFound`.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&content)?)
}

/// Reads a JSON document, falling back to `T::default()`.
///
/// A missing file is the normal first-run case. A file that no longer
/// parses is logged and replaced by defaults on the next save. Any other
/// I/O failure is returned.
pub async fn load_or_recover<T>(path: &Path, what: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    match load_json(path).await {
        Ok(data) => {
            debug!(path = %path.display(), what, "Loaded state file");
            Ok(data)
        }
        Err(e) if e.is_not_found() => {
            debug!(path = %path.display(), what, "No state file yet, using defaults");
            Ok(T::default())
        }
        Err(StoreError::Serialization(e)) => {
            warn!(path = %path.display(), what, error = %e, "Unreadable state file, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Cross-Process Lock
// ============================================================================

/// Exclusive lock on a state file, held by creating `<file>.lock`.
///
/// The lock file is removed on drop. One left behind by a crashed process
/// is taken over once it is older than thirty seconds.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    /// Path of the lock guarding `path`.
    pub fn lock_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        path.with_file_name(name)
    }

    /// Waits for the lock on `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another process holds it for longer
    /// than five seconds.
    pub async fn acquire(path: &Path) -> Result<Self, StoreError> {
        ensure_private_parent(path).await?;
        let lock_path = Self::lock_path(path);
        let started = Instant::now();

        loop {
            let mut options = tokio::fs::OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            options.mode(0o600);

            match options.open(&lock_path).await {
                Ok(mut file) => {
                    file.write_all(std::process::id().to_string().as_bytes()).await?;
                    debug!(path = %lock_path.display(), "Lock acquired");
                    return Ok(Self { path: lock_path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Self::is_stale(&lock_path).await {
                        warn!(path = %lock_path.display(), "Removing stale lock");
                        let _ = tokio::fs::remove_file(&lock_path).await;
                        continue;
                    }
                    if started.elapsed() >= LOCK_WAIT {
                        return Err(StoreError::Locked(lock_path));
                    }
                    tokio::time::sleep(LOCK_RETRY).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn is_stale(lock_path: &Path) -> bool {
        tokio::fs::metadata(lock_path)
            .await
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age > LOCK_STALE_AFTER)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

// ============================================================================
// Tests
// ============================================================================
