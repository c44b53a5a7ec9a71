use thiserror::Error;

/// Structural problems in a node graph, detected while building or walking it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphIntegrityError {
    #[error("Node '{missing_node_id}' not found, which is referenced by '{referenced_by}'")]
    NodeNotFound {
        missing_node_id: String,
        referenced_by: String,
    },

    #[error("Node '{0}' is defined more than once in the graph")]
    DuplicateNode(String),

    #[error("Node identifier '{0}' is reserved for the process start/end markers")]
    ReservedIdentifier(String),
}

/// Errors raised while rendering the process document to text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("'{0}' is not a valid XML name")]
    InvalidName(String),

    #[error("Value for '{context}' contains a character that cannot appear in XML: {character:?}")]
    InvalidCharacter { context: String, character: char },

    #[error("Element '{element}' carries attribute '{attribute}' more than once")]
    DuplicateAttribute { element: String, attribute: String },

    #[error("Condition on flow '{flow_id}' contains the CDATA terminator ']]>'")]
    UnterminatedCdata { flow_id: String },
}

/// Errors that can occur during the compilation phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Graph(#[from] GraphIntegrityError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("Node '{node_id}' has an unregistered node kind: '{kind}'")]
    UnknownNodeKind { node_id: String, kind: String },

    #[error("Node '{node_id}' could not be turned into a fragment: {message}")]
    InvalidFragment { node_id: String, message: String },

    #[error("Failed to write debug output: {0}")]
    DebugOutput(String),
}

/// Errors reported by a definition store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Definition store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored definition could not be encoded or decoded: {0}")]
    Codec(String),

    #[error("Definition store lock was poisoned")]
    Poisoned,
}

/// Errors reported by an execution engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Execution engine rejected the definition: {0}")]
    Rejected(String),

    #[error("Execution engine is unavailable: {0}")]
    Unavailable(String),
}

/// The underlying cause of a failed deployment.
#[derive(Error, Debug)]
pub enum DeploymentFailure {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("a different document is already stored for this identifier and version")]
    VersionConflict,
}

/// A failed deployment, carrying the identifier and version it was attempted for.
#[derive(Error, Debug)]
#[error("Failed to deploy process '{id}' (version {version}): {source}")]
pub struct DeploymentError {
    pub id: String,
    pub version: String,
    #[source]
    pub source: DeploymentFailure,
}

impl DeploymentError {
    pub fn new(id: &str, version: &str, source: impl Into<DeploymentFailure>) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
            source: source.into(),
        }
    }
}

/// The single failure type returned from `FlowCanvas::deploy`.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Failed to compile process '{id}' (version {version}): {source}")]
    Compile {
        id: String,
        version: String,
        #[source]
        source: CompileError,
    },

    #[error(transparent)]
    Deployment(#[from] DeploymentError),
}

/// Errors that can occur when converting a custom user format into a `FlowGraph`.
#[derive(Error, Debug, Clone)]
pub enum CanvasConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Graph(#[from] GraphIntegrityError),
}
