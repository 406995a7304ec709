//! Versioned-document repository abstraction.
//!
//! The engine assumes a transactional document store keyed by entity id:
//! every mutation of a single document is one atomic compare-and-swap
//! against its version. Cross-document flows are ordered sequences of such
//! swaps; a losing swap surfaces as [`DomainError::ConcurrencyConflict`]
//! and callers re-read before acting, so races degrade to benign no-ops.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;

/// A document together with the store version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// The stored document.
    pub document: T,
    /// The version observed at read time; passed back on update.
    pub version: i64,
}

/// Repository trait for versioned documents of one kind.
#[async_trait]
pub trait DocumentRepository<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Load a document by id, if present.
    async fn get(&self, id: Uuid) -> Result<Option<Versioned<T>>, DomainError>;

    /// Insert a new document at version 1. Fails with
    /// `DomainError::Infrastructure` if the id already exists.
    async fn insert(&self, id: Uuid, document: &T) -> Result<(), DomainError>;

    /// Replace a document atomically. The write succeeds only if the stored
    /// version still equals `expected_version`; otherwise returns
    /// `DomainError::ConcurrencyConflict`.
    async fn update(&self, id: Uuid, expected_version: i64, document: &T)
    -> Result<(), DomainError>;

    /// Delete a document atomically under the same version check.
    async fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError>;

    /// Load a document by id, failing with `DocumentNotFound` if absent.
    async fn require(&self, id: Uuid) -> Result<Versioned<T>, DomainError> {
        self.get(id)
            .await?
            .ok_or(DomainError::DocumentNotFound(id))
    }
}

/// In-memory versioned map with the same compare-and-swap semantics as a
/// real document store. Backs the `testing` repositories each context
/// crate exposes, so the conflict paths exercised in tests match
/// production behavior.
#[derive(Debug)]
pub struct MemoryStore<T> {
    inner: Mutex<HashMap<Uuid, (T, i64)>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> MemoryStore<T> {
    /// Reads a document with its current version.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Versioned<T>> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .get(&id)
            .map(|(document, version)| Versioned {
                document: document.clone(),
                version: *version,
            })
    }

    /// Inserts a new document at version 1.
    ///
    /// # Errors
    ///
    /// Returns `Infrastructure` if the id already exists.
    pub fn insert(&self, id: Uuid, document: &T) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.contains_key(&id) {
            return Err(DomainError::Infrastructure(format!(
                "document already exists: {id}"
            )));
        }
        inner.insert(id, (document.clone(), 1));
        Ok(())
    }

    /// Replaces a document if the stored version still matches.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` for a missing id and
    /// `ConcurrencyConflict` on a version mismatch.
    pub fn update(&self, id: Uuid, expected_version: i64, document: &T) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let Some((stored, version)) = inner.get_mut(&id) else {
            return Err(DomainError::DocumentNotFound(id));
        };
        if *version != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                document_id: id,
                expected: expected_version,
                actual: *version,
            });
        }
        *stored = document.clone();
        *version += 1;
        Ok(())
    }

    /// Deletes a document under the same version check as `update`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` for a missing id and
    /// `ConcurrencyConflict` on a version mismatch.
    pub fn remove(&self, id: Uuid, expected_version: i64) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let Some((_, version)) = inner.get(&id) else {
            return Err(DomainError::DocumentNotFound(id));
        };
        if *version != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                document_id: id,
                expected: expected_version,
                actual: *version,
            });
        }
        inner.remove(&id);
        Ok(())
    }

    /// Every stored document with its version, in arbitrary order.
    #[must_use]
    pub fn all(&self) -> Vec<Versioned<T>> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .values()
            .map(|(document, version)| Versioned {
                document: document.clone(),
                version: *version,
            })
            .collect()
    }
}
