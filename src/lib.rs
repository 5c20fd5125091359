//! Read and write cell-tracking graphs in the Graph Exchange File Format
//! (GEFF): nodes and directed edges projected onto chunked, typed array
//! datasets in a Zarr v2 / N5 style block store.

pub mod axis;
pub mod chunked;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod model;
pub mod store;
pub mod version;

pub use crate::axis::{Axis, AxisKind};
pub use crate::error::{GeffError, Result};
pub use crate::graph::{read_graph, write_graph, Geff, WriteOptions, DEFAULT_CHUNK_SIZE};
pub use crate::metadata::{read_metadata, write_metadata, Metadata};
pub use crate::model::{edge_stats, Edge, EdgeStats, Node};
pub use crate::store::{
    Block, BlockStore, Compression, DatasetAttributes, ElementType, MemoryStore,
};
pub use crate::version::{is_supported, major_minor, DEFAULT_VERSION, SUPPORTED_VERSIONS};
