//! # flowcanvas - Flow-Graph Compiler and Deployment Manager
//!
//! **flowcanvas** compiles an in-memory graph of workflow nodes, which may
//! contain cycles and conditional branches, into a BPMN 2.0 process
//! definition and registers that definition with a process-execution engine
//! exactly once per `(identifier, version)` pair.
//!
//! ## Core Workflow
//!
//! 1.  **Describe the graph**: Build `FlowNode`s into a `FlowGraph`, or implement
//!     `IntoCanvas` to convert your own workflow format.
//! 2.  **Create a canvas**: Point a `FlowCanvas` at the root node. Identifier and
//!     version are optional; a unique identifier and version `1.0.0` are filled in.
//! 3.  **Compile**: A `Compiler` walks the graph breadth-first, visiting every
//!     reachable node once, and renders the process document.
//! 4.  **Deploy**: A `DeploymentManager`, constructed with your definition store and
//!     execution engine, persists the document and registers it only if the engine
//!     has not already cached that identifier and version.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowcanvas::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     // 1. A review step that either approves, rejects, or loops back for changes.
//!     let graph = FlowGraph::from_nodes([
//!         FlowNode::new("submit", "userTask").with_next("review"),
//!         FlowNode::new("review", "userTask")
//!             .with_property("assignee", "${reviewer}")
//!             .with_condition("${decision == 'approve'}", "publish")
//!             .with_condition("${decision == 'changes'}", "submit")
//!             .with_else("reject"),
//!         FlowNode::new("publish", "serviceTask").with_property("class", "com.example.Publish"),
//!         FlowNode::new("reject", "serviceTask").with_property("class", "com.example.Reject"),
//!     ])?;
//!
//!     // 2. Point a canvas at the root node.
//!     let canvas = FlowCanvas::new(Arc::new(graph), "submit")
//!         .with_id("document-review")
//!         .with_version("1.0.0");
//!
//!     // 3. Build the compiler and the deployment manager.
//!     let compiler = Compiler::builder().build();
//!     let manager = DeploymentManager::new(
//!         InMemoryDefinitionStore::new(),
//!         InMemoryExecutionEngine::new(),
//!     );
//!
//!     // 4. Compile and deploy.
//!     let definition = canvas.deploy(&compiler, &manager)?;
//!     println!("{}", definition.document);
//!     Ok(())
//! }
//! ```

pub mod canvas;
pub mod compiler;
pub mod deploy;
pub mod document;
pub mod error;
pub mod prelude;
