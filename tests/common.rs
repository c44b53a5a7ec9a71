//! Common test utilities: fixture graphs and recording store/engine doubles.
use flowcanvas::prelude::*;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// `A -> B`, with `B` branching to `C` on a condition and falling back to `D`.
///
/// `B` also carries `next = A`, which must be ignored because it has conditions.
#[allow(dead_code)]
pub fn create_branching_cycle() -> FlowGraph {
    FlowGraph::from_nodes([
        FlowNode::new("A", "userTask")
            .with_name("Submit")
            .with_next("B"),
        FlowNode::new("B", "userTask")
            .with_name("Review")
            .with_next("A")
            .with_condition("${approved}", "C")
            .with_else("D"),
        FlowNode::new("C", "serviceTask").with_property("class", "com.example.Publish"),
        FlowNode::new("D", "serviceTask").with_property("class", "com.example.Archive"),
    ])
    .expect("fixture graph is valid")
}

/// `first -> second -> third`, no branching.
#[allow(dead_code)]
pub fn create_linear_graph() -> FlowGraph {
    FlowGraph::from_nodes([
        FlowNode::new("first", "task").with_next("second"),
        FlowNode::new("second", "task").with_next("third"),
        FlowNode::new("third", "task"),
    ])
    .expect("fixture graph is valid")
}

#[allow(dead_code)]
pub fn canvas(graph: FlowGraph, root: &str, id: &str, version: &str) -> FlowCanvas {
    FlowCanvas::new(Arc::new(graph), root)
        .with_id(id)
        .with_version(version)
}

/// Counts occurrences of `needle` in `haystack`.
#[allow(dead_code)]
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Store double that records every call and can be told to fail.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryDefinitionStore,
    pub gets: AtomicUsize,
    pub saves: AtomicUsize,
    pub fail_saves: bool,
}

impl DefinitionStore for RecordingStore {
    fn get_document(
        &self,
        id: &str,
        version: &str,
    ) -> std::result::Result<Option<String>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_document(id, version)
    }

    fn save_document(
        &self,
        id: &str,
        version: &str,
        document: &str,
    ) -> std::result::Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save_document(id, version, document)
    }
}

/// Engine double that records submitted documents and can be told to fail.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingEngine {
    pub inner: InMemoryExecutionEngine,
    pub lookups: AtomicUsize,
    pub submitted: Mutex<Vec<String>>,
    pub fail_registration: bool,
}

impl ExecutionEngine for RecordingEngine {
    fn cached_definition(
        &self,
        id: &str,
        version: &str,
    ) -> std::result::Result<Option<DefinitionHandle>, EngineError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.cached_definition(id, version)
    }

    fn register_definition(
        &self,
        document: &str,
    ) -> std::result::Result<DefinitionHandle, EngineError> {
        self.submitted.lock().unwrap().push(document.to_string());
        if self.fail_registration {
            return Err(EngineError::Unavailable("connection refused".to_string()));
        }
        self.inner.register_definition(document)
    }
}

#[allow(dead_code)]
pub fn loads(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
