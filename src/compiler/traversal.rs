use crate::canvas::{FlowGraph, FlowNode, Successors};
use crate::error::GraphIntegrityError;
use ahash::AHashSet;
use std::collections::VecDeque;
use std::fmt;

/// One step of the breadth-first walk, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalEvent<'a> {
    /// The node should be rendered as a fragment.
    Fragment(&'a FlowNode),
    /// A conditional branch leaving `source`.
    Conditional {
        source: &'a str,
        condition: &'a str,
        target: &'a str,
    },
    /// The fallback branch of a conditional node.
    Else { source: &'a str, target: &'a str },
    /// An unconditional transition.
    Sequence { source: &'a str, target: &'a str },
    /// A node without successors flows into the end marker.
    Terminal { source: &'a str },
}

/// The complete, ordered result of walking a graph from its root.
#[derive(Debug, Clone)]
pub struct TraversalPlan<'a> {
    root: &'a str,
    events: Vec<TraversalEvent<'a>>,
}

impl<'a> TraversalPlan<'a> {
    pub fn root(&self) -> &'a str {
        self.root
    }

    pub fn events(&self) -> &[TraversalEvent<'a>] {
        &self.events
    }

    /// Visited nodes in breadth-first order.
    pub fn visited(&self) -> impl Iterator<Item = &'a FlowNode> + '_ {
        self.events.iter().filter_map(|event| match event {
            TraversalEvent::Fragment(node) => Some(*node),
            _ => None,
        })
    }

    /// Number of transitions, excluding the edge from the start marker.
    pub fn edge_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| !matches!(e, TraversalEvent::Fragment(_)))
            .count()
    }
}

impl fmt::Display for TraversalPlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start -> {}", self.root)?;
        for event in &self.events {
            match event {
                TraversalEvent::Fragment(node) => writeln!(f, "[{}] ({})", node.id, node.kind)?,
                TraversalEvent::Conditional {
                    source,
                    condition,
                    target,
                } => writeln!(f, "  {} -> {} when {}", source, target, condition)?,
                TraversalEvent::Else { source, target } => {
                    writeln!(f, "  {} -> {} otherwise", source, target)?
                }
                TraversalEvent::Sequence { source, target } => {
                    writeln!(f, "  {} -> {}", source, target)?
                }
                TraversalEvent::Terminal { source } => writeln!(f, "  {} -> end", source)?,
            }
        }
        Ok(())
    }
}

/// Breadth-first walk that visits every node reachable from `root` exactly once.
///
/// Nodes are admitted to the queue through the visited set at enqueue time,
/// so every node is queued at most once and cycles (self-loops, back-edges)
/// cannot cause repeated visits. Edges are emitted for every live link of a
/// visited node, including links back to nodes that were already visited.
pub fn traverse<'a>(
    graph: &'a FlowGraph,
    root: &'a str,
) -> Result<TraversalPlan<'a>, GraphIntegrityError> {
    let root_node = graph.resolve(root, "canvas root")?;

    let mut queue: VecDeque<&'a FlowNode> = VecDeque::from([root_node]);
    let mut visited: AHashSet<&'a str> = AHashSet::from_iter([root_node.id.as_str()]);
    let mut events = Vec::with_capacity(graph.len() * 2);

    let mut admit = |target: &'a str,
                     source: &'a str,
                     queue: &mut VecDeque<&'a FlowNode>|
     -> Result<(), GraphIntegrityError> {
        let node = graph.resolve(target, source)?;
        if visited.insert(node.id.as_str()) {
            queue.push_back(node);
        }
        Ok(())
    };

    while let Some(node) = queue.pop_front() {
        events.push(TraversalEvent::Fragment(node));
        let source = node.id.as_str();

        match node.successors() {
            Successors::Branches {
                conditions,
                else_target,
            } => {
                for branch in conditions {
                    events.push(TraversalEvent::Conditional {
                        source,
                        condition: &branch.condition,
                        target: &branch.target,
                    });
                    admit(&branch.target, source, &mut queue)?;
                }
                if let Some(target) = else_target {
                    events.push(TraversalEvent::Else { source, target });
                    admit(target, source, &mut queue)?;
                }
            }
            Successors::Next(target) => {
                events.push(TraversalEvent::Sequence { source, target });
                admit(target, source, &mut queue)?;
            }
            Successors::Terminal => events.push(TraversalEvent::Terminal { source }),
        }
    }

    Ok(TraversalPlan { root, events })
}
