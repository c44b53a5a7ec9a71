use crate::document::process_key;
use crate::error::EngineError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reference to a process definition the execution engine has ingested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefinitionHandle {
    pub id: String,
    pub version: String,
    /// Engine-assigned identifier of the deployment that produced this definition.
    pub deployment_id: String,
}

impl fmt::Display for DefinitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.id, self.version, self.deployment_id)
    }
}

/// The process-execution engine that definitions are registered with.
pub trait ExecutionEngine: Send + Sync {
    /// Looks up a definition the engine already has cached.
    fn cached_definition(
        &self,
        id: &str,
        version: &str,
    ) -> Result<Option<DefinitionHandle>, EngineError>;

    /// Submits a serialized process document for registration.
    fn register_definition(&self, document: &str) -> Result<DefinitionHandle, EngineError>;
}

/// An engine that keeps its definition cache in process memory.
///
/// The process key is read back out of the submitted document, the same way
/// a real engine would parse the definition it is given.
#[derive(Debug, Default)]
pub struct InMemoryExecutionEngine {
    definitions: RwLock<AHashMap<(String, String), (DefinitionHandle, String)>>,
    registrations: AtomicUsize,
}

impl InMemoryExecutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of successful `register_definition` calls.
    pub fn registration_count(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    /// The document registered for `(id, version)`, if any.
    pub fn document(&self, id: &str, version: &str) -> Option<String> {
        self.definitions
            .read()
            .ok()?
            .get(&(id.to_string(), version.to_string()))
            .map(|(_, document)| document.clone())
    }
}

impl ExecutionEngine for InMemoryExecutionEngine {
    fn cached_definition(
        &self,
        id: &str,
        version: &str,
    ) -> Result<Option<DefinitionHandle>, EngineError> {
        let definitions = self
            .definitions
            .read()
            .map_err(|_| EngineError::Unavailable("definition cache lock poisoned".to_string()))?;
        Ok(definitions
            .get(&(id.to_string(), version.to_string()))
            .map(|(handle, _)| handle.clone()))
    }

    fn register_definition(&self, document: &str) -> Result<DefinitionHandle, EngineError> {
        let (id, version) = process_key(document).ok_or_else(|| {
            EngineError::Rejected("document does not contain a keyed <process> element".to_string())
        })?;

        let mut definitions = self
            .definitions
            .write()
            .map_err(|_| EngineError::Unavailable("definition cache lock poisoned".to_string()))?;

        let sequence = self.registrations.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = DefinitionHandle {
            id: id.clone(),
            version: version.clone(),
            deployment_id: sequence.to_string(),
        };
        definitions.insert((id, version), (handle.clone(), document.to_string()));
        Ok(handle)
    }
}
