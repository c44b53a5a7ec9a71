use crate::compiler::CompiledProcess;
use crate::error::StoreError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// The output of a deployment: the process key and its serialized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub id: String,
    pub version: String,
    pub document: String,
}

impl FlowDefinition {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            document: document.into(),
        }
    }

    /// Encodes the definition with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        encode_to_vec(self, standard())
            .map_err(|e| StoreError::Codec(format!("Serialization failed: {}", e)))
    }

    /// Saves the definition to a file using the bincode format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    /// Loads a definition previously written with [`FlowDefinition::save`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut file = fs::File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        decode_from_slice(bytes, standard())
            .map(|(definition, _)| definition) // bincode 2 returns (data, bytes_read)
            .map_err(|e| StoreError::Codec(format!("Deserialization failed: {}", e)))
    }
}

impl From<CompiledProcess> for FlowDefinition {
    fn from(compiled: CompiledProcess) -> Self {
        Self {
            id: compiled.id,
            version: compiled.version,
            document: compiled.document,
        }
    }
}
