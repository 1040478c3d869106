mod graph;
mod load;
mod parse;

pub use graph::{Graph, Node, NodeKind, merge, validate};
pub use load::load_snapshot;
#[cfg(test)]
pub(crate) use graph::tests as fixtures;
