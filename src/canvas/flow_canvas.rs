use super::definition::FlowDefinition;
use super::graph::FlowGraph;
use crate::compiler::{CompiledProcess, Compiler};
use crate::deploy::{DefinitionStore, DeploymentManager, ExecutionEngine};
use crate::error::{CompileError, FlowError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Version assigned to a canvas that does not carry one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// How the execution engine should keep per-session state for a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStorage {
    #[default]
    InMemory,
    Redis,
    Database,
}

/// Cross-node configuration of a canvas. Carried along, never interpreted by the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default)]
    pub variables: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub session_storage: SessionStorage,
}

/// The compilation unit: a root node in a shared graph plus process metadata.
#[derive(Debug, Clone)]
pub struct FlowCanvas {
    graph: Arc<FlowGraph>,
    root: String,
    config: CanvasConfig,
    id: String,
    version: String,
}

impl FlowCanvas {
    /// Creates a canvas with a freshly generated identifier and the default version.
    pub fn new(graph: Arc<FlowGraph>, root: impl Into<String>) -> Self {
        Self {
            graph,
            root: root.into(),
            config: CanvasConfig::default(),
            id: generate_process_id(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// Sets the process identifier. An empty identifier keeps a generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = if id.trim().is_empty() {
            generate_process_id()
        } else {
            id
        };
        self
    }

    /// Sets the version. An empty version falls back to [`DEFAULT_VERSION`].
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.version = if version.trim().is_empty() {
            DEFAULT_VERSION.to_string()
        } else {
            version
        };
        self
    }

    pub fn with_config(mut self, config: CanvasConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Compiles the canvas into a process document without touching any store or engine.
    pub fn compile(&self, compiler: &Compiler) -> Result<CompiledProcess, CompileError> {
        compiler.compile(self)
    }

    /// Compiles the canvas and hands the document to the deployment manager.
    ///
    /// Either a complete definition is returned or the whole call fails;
    /// compilation errors abort before the store or engine is contacted.
    pub fn deploy<S, E>(
        self,
        compiler: &Compiler,
        manager: &DeploymentManager<S, E>,
    ) -> Result<FlowDefinition, FlowError>
    where
        S: DefinitionStore,
        E: ExecutionEngine,
    {
        let compiled = self.compile(compiler).map_err(|source| FlowError::Compile {
            id: self.id.clone(),
            version: self.version.clone(),
            source,
        })?;

        let receipt = manager.deploy(&compiled.id, &compiled.version, &compiled.document)?;
        log::info!(
            "Deployed process '{}' (version {}) as '{}'",
            compiled.id,
            compiled.version,
            receipt.handle
        );

        Ok(FlowDefinition::from(compiled))
    }
}

/// Generated identifiers must be valid XML names, so they never start with a digit.
fn generate_process_id() -> String {
    format!("process_{}", uuid::Uuid::new_v4().simple())
}
