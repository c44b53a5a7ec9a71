use crate::canvas::FlowCanvas;
use crate::document::{END_EVENT_ID, Namespaces, START_EVENT_ID};
use crate::error::{CompileError, GraphIntegrityError};
use ahash::AHashMap;

#[cfg(feature = "debug-tools")]
use std::fs;
#[cfg(feature = "debug-tools")]
use std::path::Path;

mod assembler;
pub mod fragment;
pub mod traversal;

use assembler::DocumentBuilder;
use fragment::*;
use traversal::{TraversalEvent, traverse};

/// A rendered process document together with its deployment key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProcess {
    pub id: String,
    pub version: String,
    pub document: String,
    /// Number of node fragments in the document.
    pub node_count: usize,
    /// Number of sequence flows in the document, including the one leaving the start marker.
    pub flow_count: usize,
}

/// Turns canvases into process documents.
///
/// A compiler only holds its fragment registry and namespaces, so one
/// instance can compile any number of canvases, from several threads at once.
pub struct Compiler {
    registry: AHashMap<String, Box<dyn FragmentGenerator>>,
    namespaces: Namespaces,
}

pub struct CompilerBuilder {
    registry: AHashMap<String, Box<dyn FragmentGenerator>>,
    namespaces: Namespaces,
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerBuilder {
    pub fn new() -> Self {
        let mut registry: AHashMap<String, Box<dyn FragmentGenerator>> = AHashMap::new();
        register_default_generators(&mut registry);
        Self {
            registry,
            namespaces: Namespaces::default(),
        }
    }

    /// Renders nodes of `user_kind` with the built-in generator for `builtin_kind`.
    pub fn with_type_mapping(mut self, user_kind: &str, builtin_kind: &str) -> Self {
        if let Some(generator) = create_generator_by_kind(builtin_kind) {
            self.registry.insert(user_kind.to_string(), generator);
        }
        self
    }

    pub fn with_custom_generator(mut self, generator: Box<dyn FragmentGenerator>) -> Self {
        self.registry
            .insert(generator.node_kind().to_string(), generator);
        self
    }

    pub fn with_namespaces(mut self, namespaces: Namespaces) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            registry: self.registry,
            namespaces: self.namespaces,
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        CompilerBuilder::new().build()
    }
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Walks the canvas graph from its root and renders the process document.
    pub fn compile(&self, canvas: &FlowCanvas) -> Result<CompiledProcess, CompileError> {
        let plan = traverse(canvas.graph(), canvas.root())?;
        log::debug!(
            "--- Traversal plan for '{}' (version {}) ---\n{}",
            canvas.id(),
            canvas.version(),
            plan
        );

        let mut builder =
            DocumentBuilder::new(&self.namespaces, canvas.id(), canvas.version(), plan.root());
        let mut node_count = 0;
        let mut flow_count = 1;

        for event in plan.events() {
            match *event {
                TraversalEvent::Fragment(node) => {
                    if node.id == START_EVENT_ID || node.id == END_EVENT_ID {
                        let reserved = GraphIntegrityError::ReservedIdentifier(node.id.clone());
                        return Err(reserved.into());
                    }
                    let generator = self.registry.get(&node.kind).ok_or_else(|| {
                        CompileError::UnknownNodeKind {
                            node_id: node.id.clone(),
                            kind: node.kind.clone(),
                        }
                    })?;
                    let fragment = generator.generate(node, &self.namespaces)?;
                    builder.add_fragment(&node.id, fragment)?;
                    node_count += 1;
                }
                TraversalEvent::Conditional {
                    source,
                    condition,
                    target,
                } => {
                    builder.add_flow(source, target, Some(condition));
                    flow_count += 1;
                }
                TraversalEvent::Else { source, target } => {
                    let flow_id = builder.add_flow(source, target, None);
                    builder.set_default_flow(source, flow_id);
                    flow_count += 1;
                }
                TraversalEvent::Sequence { source, target } => {
                    builder.add_flow(source, target, None);
                    flow_count += 1;
                }
                TraversalEvent::Terminal { source } => {
                    builder.add_terminal_flow(source);
                    flow_count += 1;
                }
            }
        }

        let document = builder.finish()?;

        #[cfg(feature = "debug-tools")]
        write_debug_file(Path::new(DEBUG_DIR), canvas.id(), canvas.version(), &document)?;

        log::info!(
            "Compiled process '{}' (version {}): {} nodes, {} flows",
            canvas.id(),
            canvas.version(),
            node_count,
            flow_count
        );

        Ok(CompiledProcess {
            id: canvas.id().to_string(),
            version: canvas.version().to_string(),
            document,
            node_count,
            flow_count,
        })
    }
}

#[cfg(feature = "debug-tools")]
const DEBUG_DIR: &str = "tmp";

#[cfg(feature = "debug-tools")]
fn write_debug_file(
    dir: &Path,
    id: &str,
    version: &str,
    document: &str,
) -> Result<(), CompileError> {
    let sanitized: String = format!("{}_{}", id, version)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    let path = dir.join(format!("process_{}.bpmn20.xml", sanitized));
    let to_error =
        |e: std::io::Error| CompileError::DebugOutput(format!("'{}': {}", path.display(), e));
    fs::create_dir_all(dir).map_err(to_error)?;
    fs::write(&path, document).map_err(to_error)?;
    log::info!("  -> Wrote process document to '{}'", path.display());
    Ok(())
}

#[cfg(all(test, feature = "debug-tools"))]
mod tests {
    use super::*;

    #[test]
    fn test_debug_file_written() {
        let dir = tempfile::tempdir().unwrap();
        write_debug_file(dir.path(), "wf-1", "1.0.0", "<definitions/>").unwrap();

        let written = fs::read_to_string(dir.path().join("process_wf1_100.bpmn20.xml")).unwrap();
        assert_eq!(written, "<definitions/>");
    }

    #[test]
    fn test_debug_file_failure_is_debug_output_error() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let err = write_debug_file(blocker.path(), "wf-1", "1.0.0", "<definitions/>").unwrap_err();

        assert!(matches!(err, CompileError::DebugOutput(_)));
    }
}
