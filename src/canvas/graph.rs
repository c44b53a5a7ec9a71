use super::node::FlowNode;
use crate::error::GraphIntegrityError;
use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An insertion-ordered arena of workflow nodes, indexed by identifier.
///
/// A graph is read-only while it is being compiled and can be shared
/// between several canvases behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    index: AHashMap<String, usize>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a list of nodes, rejecting duplicate identifiers.
    pub fn from_nodes(
        nodes: impl IntoIterator<Item = FlowNode>,
    ) -> Result<Self, GraphIntegrityError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.insert(node)?;
        }
        Ok(graph)
    }

    pub fn insert(&mut self, node: FlowNode) -> Result<(), GraphIntegrityError> {
        if self.index.contains_key(&node.id) {
            return Err(GraphIntegrityError::DuplicateNode(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, node_id: &str) -> Option<&FlowNode> {
        self.index.get(node_id).map(|&i| &self.nodes[i])
    }

    /// Looks up a node that another node (or the canvas) points at.
    pub fn resolve(
        &self,
        node_id: &str,
        referenced_by: &str,
    ) -> Result<&FlowNode, GraphIntegrityError> {
        self.get(node_id)
            .ok_or_else(|| GraphIntegrityError::NodeNotFound {
                missing_node_id: node_id.to_string(),
                referenced_by: referenced_by.to_string(),
            })
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Serialize for FlowGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.nodes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FlowGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<FlowNode>::deserialize(deserializer)?;
        FlowGraph::from_nodes(nodes).map_err(serde::de::Error::custom)
    }
}
