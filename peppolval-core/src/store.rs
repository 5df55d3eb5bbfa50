//! Filesystem-backed store for produced SVRL report artifacts.
//!
//! Output paths are request-unique: `validated_<ruleset>_<token>.svrl.xml`
//! with a fresh UUID per allocation, so concurrent requests against the same
//! ruleset never share an output file. The file basename doubles as the
//! caller-visible report id.
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::report::ReportHandle;

/// Errors from report artifact storage and retrieval.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create report directory {dir}: {source}")]
    Create {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid report id: {0}")]
    InvalidId(String),
    #[error("unknown report id: {0}")]
    Unknown(String),
}

/// Directory holding SVRL reports, retrievable by id until externally
/// cleaned up. There is no garbage collection of stale artifacts.
#[derive(Debug)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Opens (creating if needed) the report directory. An unwritable store
    /// is a service fault, not a validation outcome.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Create {
            dir: dir.clone(),
            source,
        })?;
        Ok(ReportStore { dir })
    }

    /// Allocates a request-unique output handle for a run against `ruleset`.
    /// The file itself is written later by the rule processor.
    pub fn allocate(&self, ruleset: &str) -> ReportHandle {
        let token = Uuid::new_v4().simple();
        let id = format!("validated_{ruleset}_{token}.svrl.xml");
        let path = self.dir.join(&id);
        ReportHandle { id, path }
    }

    /// Maps a caller-supplied report id back to its file. Ids containing
    /// path separators or parent components are rejected before touching
    /// the filesystem.
    pub fn resolve(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty()
            || id.contains('/')
            || id.contains('\\')
            || id.contains("..")
        {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        let path = self.dir.join(id);
        if !path.is_file() {
            return Err(StoreError::Unknown(id.to_string()));
        }
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_request_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::create(dir.path()).unwrap();
        let a = store.allocate("PEPPOL-EN16931-UBL");
        let b = store.allocate("PEPPOL-EN16931-UBL");
        assert_ne!(a.id, b.id);
        assert_ne!(a.path, b.path);
        assert!(a.id.starts_with("validated_PEPPOL-EN16931-UBL_"));
        assert!(a.id.ends_with(".svrl.xml"));
    }

    #[test]
    fn resolve_round_trips_an_allocated_report() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::create(dir.path()).unwrap();
        let handle = store.allocate("rules");
        std::fs::write(&handle.path, b"<svrl/>").unwrap();
        assert_eq!(store.resolve(&handle.id).unwrap(), handle.path);
    }

    #[test]
    fn resolve_rejects_traversal_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::create(dir.path()).unwrap();
        for id in ["../etc/passwd", "a/b.svrl.xml", "..", "nested\\file", ""] {
            let err = store.resolve(id).unwrap_err();
            assert!(matches!(err, StoreError::InvalidId(_)), "id: {id:?}");
        }
    }

    #[test]
    fn resolve_rejects_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::create(dir.path()).unwrap();
        let err = store.resolve("validated_x_deadbeef.svrl.xml").unwrap_err();
        assert!(matches!(err, StoreError::Unknown(_)));
    }
}
