pub mod error;
pub mod types;
pub mod value;
pub mod vertex_edge_path;

// 错误和结果类型
pub use error::{DBError, DBResult, ErrorKind, QueryError, StorageError};

// 核心数据类型
pub use types::{EdgeDirection, OverClause};
pub use value::*;
pub use vertex_edge_path::{Edge, EdgeKey, Path, Step, TraversalDirection, Vertex};
