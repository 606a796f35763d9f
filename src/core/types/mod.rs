pub mod graph;

pub use graph::{EdgeDirection, OverClause};
