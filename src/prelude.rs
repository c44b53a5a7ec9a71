//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! flowcanvas crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowcanvas::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let graph = FlowGraph::from_nodes([FlowNode::new("only", "task")])?;
//! let canvas = FlowCanvas::new(Arc::new(graph), "only").with_id("single-step");
//!
//! let compiled = canvas.compile(&Compiler::default())?;
//! println!("{}", compiled.document);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::canvas::{
    CanvasConfig, ConditionalContainer, DEFAULT_VERSION, FlowCanvas, FlowDefinition, FlowGraph,
    FlowNode, IntoCanvas, SessionStorage, Successors,
};

// Compilation
pub use crate::compiler::fragment::{Fragment, FragmentGenerator};
pub use crate::compiler::traversal::{TraversalEvent, TraversalPlan, traverse};
pub use crate::compiler::{CompiledProcess, Compiler, CompilerBuilder};
pub use crate::document::Namespaces;

// Deployment
pub use crate::deploy::{
    DefinitionHandle, DefinitionStore, DeployState, DeploymentManager, DeploymentReceipt,
    ExecutionEngine, FileDefinitionStore, InMemoryDefinitionStore, InMemoryExecutionEngine,
    OverwritePolicy,
};

// Error types
pub use crate::error::{
    CanvasConversionError, CompileError, DeploymentError, DeploymentFailure, EngineError,
    FlowError, GraphIntegrityError, SerializationError, StoreError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
