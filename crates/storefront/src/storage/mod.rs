//! Typed key-value persistence.
//!
//! [`KeyValueStore`] is the single source of truth for all engine state. It
//! wraps a [`StorageBackend`] (the browser-storage analogue) and adds JSON
//! encoding with a safe-fallback read path: corrupt or foreign data never
//! propagates an error to the caller, it is logged and replaced by the
//! caller-supplied fallback.
//!
//! There are no transactions. Each key is read and written independently;
//! composite consistency across keys is the caller's responsibility. The
//! store uses interior mutability and is deliberately single-threaded:
//! mutation only ever happens synchronously inside a dispatch call.

pub mod cookies;
pub mod keys;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors surfaced by storage writes.
///
/// Reads never fail: absent and undecodable values fall back.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The value could not be serialized.
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        /// Key the write was addressed to.
        key: String,
        /// Underlying serializer error.
        source: serde_json::Error,
    },

    /// The backend rejected the write (quota and I/O analogues).
    #[error("failed to write key {key}: {reason}")]
    Write {
        /// Key the write was addressed to.
        key: String,
        /// Backend-reported failure.
        reason: String,
    },
}

/// Raw string storage, the browser persistent-store analogue.
///
/// Backends deal in raw strings only; JSON encoding lives in
/// [`KeyValueStore`]. Implementations use interior mutability so a shared
/// reference can serve every service in the single-threaded engine.
pub trait StorageBackend {
    /// Read the raw string stored under `key`.
    fn read(&self, key: &str) -> Option<String>;

    /// Store a raw string under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the backend cannot persist the
    /// value. A failed write must not affect other keys.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` if present.
    fn remove(&self, key: &str);
}

/// Volatile in-memory backend. The default for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// File-backed backend: one JSON document holding every key.
///
/// The document is read once on open and written through on every mutation,
/// so state survives process restarts the way browser storage survives page
/// reloads. Two engines over the same file may race to overwrite records
/// with stale data; that mirrors the multi-tab limitation of the source
/// system and is not papered over here.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: RefCell<HashMap<String, String>>,
}

impl JsonFileBackend {
    /// Open (or create) the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the file exists but cannot be
    /// read. A malformed document is treated as empty, matching the
    /// fallback-on-corruption read policy.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "storage file corrupt, starting empty");
                HashMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(StorageError::Write {
                    key: path.display().to_string(),
                    reason: err.to_string(),
                });
            }
        };

        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, key: &str) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&*self.entries.borrow()).map_err(|source| {
            StorageError::Encode {
                key: key.to_owned(),
                source,
            }
        })?;
        std::fs::write(&self.path, raw).map_err(|err| StorageError::Write {
            key: key.to_owned(),
            reason: err.to_string(),
        })
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self.flush(key)
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
        if let Err(err) = self.flush(key) {
            tracing::warn!(key, %err, "failed to persist key removal");
        }
    }
}

/// JSON-typed view over a [`StorageBackend`].
pub struct KeyValueStore {
    backend: Box<dyn StorageBackend>,
}

impl KeyValueStore {
    /// Wrap an arbitrary backend.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Convenience constructor over a fresh [`MemoryBackend`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Read and decode the value stored under `key`.
    ///
    /// Returns `fallback` when the key is absent or holds data that does
    /// not decode as `T`. Decode failures are logged at warn level and
    /// otherwise swallowed: corrupt persisted state must never take the
    /// page down.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.backend.read(key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(key, %err, "undecodable stored value, using fallback");
                    fallback
                }
            },
            None => fallback,
        }
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] if serialization fails and
    /// [`StorageError::Write`] if the backend rejects the write. Neither
    /// affects any other key.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.backend.write(key, &raw)
    }

    /// Read the raw (non-JSON) string under `key`.
    ///
    /// Used for the legacy flag values that the source layout stores as
    /// bare strings rather than JSON documents.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.backend.read(key)
    }

    /// Store a raw (non-JSON) string under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the backend rejects the write.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.write(key, value)
    }

    /// Remove `key` if present.
    pub fn remove(&self, key: &str) {
        self.backend.remove(key);
    }
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore").finish_non_exhaustive()
    }
}
