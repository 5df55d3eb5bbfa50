//! Schema and ruleset registries.
//!
//! Resources are scanned from a directory once at startup and indexed by
//! file stem, so `"UBL-Invoice-2.1"` resolves to `UBL-Invoice-2.1.xsd`.
//! The registry is injected into the pipeline rather than re-read from the
//! filesystem on every request.
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Marker trait selecting which files a registry indexes.
pub trait ResourceKind {
    /// File extension (without the dot) a resource of this kind carries.
    const EXTENSION: &'static str;
    /// Human-readable kind name used in error messages.
    const KIND: &'static str;
}

/// XSD schema resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SchemaKind;
/// Compiled Schematron (XSLT) ruleset resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RulesetKind;

impl ResourceKind for SchemaKind {
    const EXTENSION: &'static str = "xsd";
    const KIND: &'static str = "XSD schema";
}

impl ResourceKind for RulesetKind {
    const EXTENSION: &'static str = "xslt";
    const KIND: &'static str = "Schematron ruleset";
}

/// Errors from registry construction and lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read {kind} directory {dir}: {source}")]
    Scan {
        kind: &'static str,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown {kind}: {name}")]
    Unknown { kind: &'static str, name: String },
}

/// A resolved registry entry: the lookup name plus the file it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    name: String,
    path: PathBuf,
}

impl ResourceRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The resource's file basename, used as the summary-row artifact label.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Directory-backed index of validation resources of one kind.
#[derive(Debug)]
pub struct Registry<K: ResourceKind> {
    dir: PathBuf,
    entries: BTreeMap<String, PathBuf>,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> Registry<K> {
    /// Scans `dir` and indexes every `*.{EXTENSION}` file by stem. Other
    /// files are ignored.
    pub fn scan(dir: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let dir = dir.into();
        let entries = Self::read_entries(&dir)?;
        Ok(Registry {
            dir,
            entries,
            _kind: PhantomData,
        })
    }

    /// Re-reads the directory, picking up resources added since the last scan.
    pub fn refresh(&mut self) -> Result<(), RegistryError> {
        self.entries = Self::read_entries(&self.dir)?;
        Ok(())
    }

    /// Resolves a resource name to its file.
    pub fn get(&self, name: &str) -> Result<ResourceRef, RegistryError> {
        let path = self
            .entries
            .get(name)
            .ok_or_else(|| RegistryError::Unknown {
                kind: K::KIND,
                name: name.to_string(),
            })?;
        Ok(ResourceRef {
            name: name.to_string(),
            path: path.clone(),
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn read_entries(dir: &Path) -> Result<BTreeMap<String, PathBuf>, RegistryError> {
        let mut entries = BTreeMap::new();
        let listing = std::fs::read_dir(dir).map_err(|source| RegistryError::Scan {
            kind: K::KIND,
            dir: dir.to_path_buf(),
            source,
        })?;
        for entry in listing {
            let entry = entry.map_err(|source| RegistryError::Scan {
                kind: K::KIND,
                dir: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(K::EXTENSION));
            if !matches {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                entries.insert(stem.to_string_lossy().into_owned(), path);
            }
        }
        Ok(entries)
    }
}
