use crate::canvas::FlowDefinition;
use crate::error::StoreError;
use ahash::AHashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Durable record of every deployed process document, keyed by `(id, version)`.
pub trait DefinitionStore: Send + Sync {
    fn get_document(&self, id: &str, version: &str) -> Result<Option<String>, StoreError>;
    fn save_document(&self, id: &str, version: &str, document: &str) -> Result<(), StoreError>;
}

/// A process-local store, mainly for tests and single-process setups.
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    documents: RwLock<AHashMap<(String, String), String>>,
}

impl InMemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let documents = self.documents.read().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl DefinitionStore for InMemoryDefinitionStore {
    fn get_document(&self, id: &str, version: &str) -> Result<Option<String>, StoreError> {
        let documents = self.documents.read().map_err(|_| StoreError::Poisoned)?;
        Ok(documents
            .get(&(id.to_string(), version.to_string()))
            .cloned())
    }

    fn save_document(&self, id: &str, version: &str, document: &str) -> Result<(), StoreError> {
        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;
        documents.insert(
            (id.to_string(), version.to_string()),
            document.to_string(),
        );
        Ok(())
    }
}

/// Filesystem-backed store.
///
/// Each definition is a bincode-encoded [`FlowDefinition`] in its own file,
/// named by a readable label and a blake3 digest of the `(id, version)` key:
/// ```text
/// {root}/
/// └── order-approval--1.0.0--3f2a…c9.def
/// ```
/// Only the digest identifies the record. The decoded record's own key is
/// checked on every read.
#[derive(Debug, Clone)]
pub struct FileDefinitionStore {
    root: PathBuf,
}

impl FileDefinitionStore {
    /// Opens a store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str, version: &str) -> PathBuf {
        self.root.join(record_file_name(id, version))
    }
}

const LABEL_LEN: usize = 48;

/// File name for `(id, version)`. The label is cosmetic; the digest is over
/// the length-prefixed key, so distinct keys never share a file.
fn record_file_name(id: &str, version: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(id.len() as u64).to_le_bytes());
    hasher.update(id.as_bytes());
    hasher.update(version.as_bytes());

    let label = |s: &str| -> String {
        s.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .take(LABEL_LEN)
            .collect()
    };
    format!(
        "{}--{}--{}.def",
        label(id),
        label(version),
        hasher.finalize().to_hex()
    )
}

impl DefinitionStore for FileDefinitionStore {
    fn get_document(&self, id: &str, version: &str) -> Result<Option<String>, StoreError> {
        match FlowDefinition::from_file(self.record_path(id, version)) {
            Ok(definition) if definition.id == id && definition.version == version => {
                Ok(Some(definition.document))
            }
            Ok(definition) => Err(StoreError::Codec(format!(
                "record for '{}' (version {}) holds '{}' (version {})",
                id, version, definition.id, definition.version
            ))),
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_document(&self, id: &str, version: &str, document: &str) -> Result<(), StoreError> {
        FlowDefinition::new(id, version, document).save(self.record_path(id, version))
    }
}
