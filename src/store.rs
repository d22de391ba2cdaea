//! Shared persistence plumbing for the flat-file stores.
//!
//! The account and review stores serialize their whole map with bincode and
//! overwrite the backing file on every mutation. A file that is missing,
//! empty or unreadable degrades to an empty collection so the application
//! stays usable; the failure is logged, never propagated as fatal.

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const USERS_FILE: &str = "users.bin";
pub const REVIEWS_FILE: &str = "reviews.bin";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Encode(#[from] bincode::Error),
}

/// Directory holding every persisted file: the two bincode store files plus
/// one `watchlist_<stem>.txt` per identity.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DataDir { root: root.into() }
    }

    /// Resolves the data directory from `MOVIE_EXPLORER_DATA_DIR`, defaulting
    /// to the current directory.
    pub fn from_env() -> Self {
        let root = std::env::var("MOVIE_EXPLORER_DATA_DIR").unwrap_or_else(|_| ".".to_owned());
        DataDir::new(root)
    }

    pub fn users_file(&self) -> PathBuf {
        self.root.join(USERS_FILE)
    }

    pub fn reviews_file(&self) -> PathBuf {
        self.root.join(REVIEWS_FILE)
    }

    pub fn watchlist_file(&self, stem: &str) -> PathBuf {
        self.root.join(format!("watchlist_{}.txt", stem))
    }

    /// Startup bootstrap: make sure the directory and the two structured
    /// store files exist. Empty files are fine, the loaders treat them as
    /// empty collections.
    pub fn ensure_store_files(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        for path in [self.users_file(), self.reviews_file()] {
            if !path.exists() {
                fs::write(&path, b"")?;
            }
        }
        Ok(())
    }
}

/// Loads a bincode-serialized collection, falling back to the default on a
/// missing, empty or corrupt file.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("could not read {}: {}", path.display(), err);
            }
            return T::default();
        }
    };
    if bytes.is_empty() {
        return T::default();
    }
    match bincode::deserialize(&bytes) {
        Ok(value) => value,
        Err(err) => {
            warn!("corrupt store file {}: {}", path.display(), err);
            T::default()
        }
    }
}

/// Overwrites the whole file with the serialized collection. Write failures
/// are logged and swallowed; the in-memory state stays authoritative for the
/// rest of the process lifetime.
pub fn save<T: Serialize>(path: &Path, value: &T) {
    let result = bincode::serialize(value)
        .map_err(StoreError::from)
        .and_then(|bytes| fs::write(path, bytes).map_err(StoreError::from));
    if let Err(err) = result {
        warn!("could not persist {}: {}", path.display(), err);
    }
}
