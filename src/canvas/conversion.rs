use super::graph::FlowGraph;
use crate::error::CanvasConversionError;

/// A user-defined workflow format that can be lowered into a `FlowGraph`.
///
/// This is the extension point that keeps the compiler format-agnostic:
/// parse your own representation (JSON, YAML, a database row...) into your
/// own structs, then implement this trait to hand the compiler a graph and
/// the identifier of its root node.
///
/// # Example
///
/// ```rust,no_run
/// use flowcanvas::prelude::*;
/// use flowcanvas::error::CanvasConversionError;
///
/// struct Step { id: String, then: Option<String> }
/// struct Pipeline { steps: Vec<Step> }
///
/// impl IntoCanvas for Pipeline {
///     fn into_canvas(self) -> std::result::Result<(FlowGraph, String), CanvasConversionError> {
///         let root = self
///             .steps
///             .first()
///             .map(|s| s.id.clone())
///             .ok_or_else(|| CanvasConversionError::ValidationError("no steps".into()))?;
///
///         let nodes = self.steps.into_iter().map(|s| {
///             let node = FlowNode::new(s.id, "serviceTask");
///             match s.then {
///                 Some(next) => node.with_next(next),
///                 None => node,
///             }
///         });
///         Ok((FlowGraph::from_nodes(nodes)?, root))
///     }
/// }
/// ```
pub trait IntoCanvas {
    /// Consumes the object and returns the graph together with its root node identifier.
    fn into_canvas(self) -> Result<(FlowGraph, String), CanvasConversionError>;
}
