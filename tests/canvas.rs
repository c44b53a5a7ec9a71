//! Tests for the canvas model: defaults, configuration, graph sharing and conversion.
mod common;
use common::*;
use flowcanvas::error::CanvasConversionError;
use flowcanvas::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn test_defaults_are_filled_in() {
    let canvas = FlowCanvas::new(Arc::new(create_linear_graph()), "first");

    assert!(canvas.id().starts_with("process_"));
    assert_eq!(canvas.version(), DEFAULT_VERSION);
    assert_eq!(canvas.version(), "1.0.0");
    assert_eq!(canvas.root(), "first");
    assert_eq!(canvas.config(), &CanvasConfig::default());
}

#[test]
fn test_blank_id_and_version_fall_back_to_defaults() {
    let canvas = FlowCanvas::new(Arc::new(create_linear_graph()), "first")
        .with_id("  ")
        .with_version("");

    assert!(canvas.id().starts_with("process_"));
    assert_eq!(canvas.version(), DEFAULT_VERSION);
}

#[test]
fn test_generated_ids_are_unique() {
    let graph = Arc::new(create_linear_graph());
    let ids: HashSet<String> = (0..100)
        .map(|_| FlowCanvas::new(graph.clone(), "first").id().to_string())
        .collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn test_generated_id_compiles() {
    let canvas = FlowCanvas::new(Arc::new(create_linear_graph()), "first");
    let compiled = canvas.compile(&Compiler::default()).unwrap();

    assert_eq!(compiled.id, canvas.id());
    assert!(
        compiled
            .document
            .contains(&format!("<process id=\"{}\"", canvas.id()))
    );
}

#[test]
fn test_config_deserialization() {
    let config: CanvasConfig = serde_json::from_value(json!({
        "variables": { "region": "eu", "retries": 3 },
        "session_storage": "redis"
    }))
    .unwrap();

    assert_eq!(config.session_storage, SessionStorage::Redis);
    assert_eq!(config.variables["retries"], json!(3));

    let empty: CanvasConfig = serde_json::from_value(json!({})).unwrap();
    assert_eq!(empty.session_storage, SessionStorage::InMemory);
    assert!(empty.variables.is_empty());
}

#[test]
fn test_config_does_not_change_document() {
    let graph = Arc::new(create_linear_graph());
    let compiler = Compiler::default();
    let plain = FlowCanvas::new(graph.clone(), "first").with_id("same");
    let mut config = CanvasConfig {
        session_storage: SessionStorage::Database,
        ..CanvasConfig::default()
    };
    config.variables.insert("tenant".to_string(), json!("acme"));
    let configured = FlowCanvas::new(graph, "first")
        .with_id("same")
        .with_config(config);

    assert_eq!(
        plain.compile(&compiler).unwrap().document,
        configured.compile(&compiler).unwrap().document
    );
}

#[test]
fn test_graph_shared_between_canvases() {
    let graph = Arc::new(create_branching_cycle());
    let compiler = Compiler::default();

    let from_a = FlowCanvas::new(graph.clone(), "A").compile(&compiler).unwrap();
    let from_b = FlowCanvas::new(graph.clone(), "B").compile(&compiler).unwrap();

    assert_eq!(from_a.node_count, 4);
    assert_eq!(from_b.node_count, 4);
    assert!(from_b.document.contains("sourceRef=\"startEvent\" targetRef=\"B\""));
    assert_eq!(Arc::strong_count(&graph), 1);
}

#[test]
fn test_concurrent_compilation() {
    let graph = Arc::new(create_branching_cycle());
    let compiler = Arc::new(Compiler::default());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let graph = graph.clone();
            let compiler = compiler.clone();
            thread::spawn(move || {
                FlowCanvas::new(graph, "A")
                    .with_id(format!("worker-{}", i))
                    .compile(&compiler)
                    .map(|compiled| compiled.flow_count)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 6);
    }
}

#[test]
fn test_node_serde_defaults() {
    let node: FlowNode = serde_json::from_value(json!({
        "id": "approve",
        "kind": "userTask"
    }))
    .unwrap();

    assert_eq!(node, FlowNode::new("approve", "userTask"));
    assert_eq!(node.successors(), Successors::Terminal);
}

#[test]
fn test_graph_deserialization_rejects_duplicates() {
    let result: std::result::Result<FlowGraph, _> = serde_json::from_value(json!([
        { "id": "a", "kind": "task" },
        { "id": "a", "kind": "task" }
    ]));
    assert!(result.is_err());
}

#[test]
fn test_graph_serialization_keeps_insertion_order() {
    let graph = create_linear_graph();
    let value = serde_json::to_value(&graph).unwrap();
    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["first", "second", "third"]);

    let back: FlowGraph = serde_json::from_value(value).unwrap();
    assert_eq!(back.nodes(), graph.nodes());
}

struct Checklist {
    items: Vec<&'static str>,
}

impl IntoCanvas for Checklist {
    fn into_canvas(self) -> std::result::Result<(FlowGraph, String), CanvasConversionError> {
        let root = self
            .items
            .first()
            .map(|item| item.to_string())
            .ok_or_else(|| CanvasConversionError::ValidationError("empty checklist".into()))?;

        let mut nodes = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            let node = FlowNode::new(*item, "manualTask");
            nodes.push(match self.items.get(i + 1) {
                Some(next) => node.with_next(*next),
                None => node,
            });
        }
        Ok((FlowGraph::from_nodes(nodes)?, root))
    }
}

#[test]
fn test_into_canvas() {
    let (graph, root) = Checklist {
        items: vec!["unpack", "inspect", "shelve"],
    }
    .into_canvas()
    .unwrap();

    assert_eq!(root, "unpack");
    assert_eq!(graph.len(), 3);

    let compiled = FlowCanvas::new(Arc::new(graph), root)
        .compile(&Compiler::default())
        .unwrap();
    assert_eq!(count(&compiled.document, "<manualTask "), 3);
}

#[test]
fn test_into_canvas_errors() {
    let empty = Checklist { items: vec![] }.into_canvas();
    assert!(matches!(empty, Err(CanvasConversionError::ValidationError(_))));

    let duplicated = Checklist {
        items: vec!["a", "a"],
    }
    .into_canvas();
    assert!(matches!(
        duplicated,
        Err(CanvasConversionError::Graph(GraphIntegrityError::DuplicateNode(_)))
    ));
}
