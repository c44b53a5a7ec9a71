pub mod conversion;
pub mod definition;
pub mod flow_canvas;
pub mod graph;
pub mod node;

pub use conversion::*;
pub use definition::*;
pub use flow_canvas::*;
pub use graph::*;
pub use node::*;
