//! The orchestrator: an in-memory snapshot of one GEFF group and the
//! read/write passes that move it through the metadata, node, and edge
//! codecs.

mod columns;
mod edges;
mod nodes;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{GeffError, Result};
use crate::metadata::{read_metadata, write_metadata, Metadata};
use crate::model::{Edge, Node};
use crate::store::BlockStore;
use crate::version;

pub use edges::{read_edges, write_edges};
pub use nodes::{read_nodes, write_nodes};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Snapshot of one group: metadata plus the ordered node and edge lists.
/// The i-th record of each list is the i-th entry of every on-disk column.
/// Constructed in one read pass or by the caller, written in one pass;
/// never mutated during I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct Geff {
    pub metadata: Metadata,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Geff {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Index from node id to list position, built on demand. Edges refer to
    /// nodes by identifier; callers that traverse repeatedly should hold on
    /// to this map instead of scanning per lookup. With duplicate ids the
    /// last occurrence wins.
    pub fn node_index(&self) -> HashMap<i32, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(row, node)| (node.id, row))
            .collect()
    }
}

/// Knobs for a write pass. `version` overrides the snapshot's own version
/// string; when neither is set the library default is written.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub chunk_size: usize,
    pub version: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            version: None,
        }
    }
}

impl WriteOptions {
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Reads a complete graph snapshot from a group: metadata first (the
/// version gate decides the layout), then nodes, then edges.
pub fn read_graph<S: BlockStore + ?Sized>(store: &S, group: &str) -> Result<Geff> {
    let metadata = read_metadata(store, group)?;
    let version = version::major_minor(&metadata.geff_version)?;
    let nodes = nodes::read_nodes(store, group, version)?;
    let edges = edges::read_edges(store, group)?;
    debug!(
        group,
        nodes = nodes.len(),
        edges = edges.len(),
        "graph read"
    );
    Ok(Geff {
        metadata,
        nodes,
        edges,
    })
}

/// Writes a complete graph snapshot into a group. Metadata is validated
/// up front but written last, so a reader that observes the version marker
/// can assume the datasets are present. The write is not transactional; a
/// failure leaves a partially populated group behind.
pub fn write_graph<S: BlockStore + ?Sized>(
    store: &mut S,
    group: &str,
    graph: &Geff,
    options: &WriteOptions,
) -> Result<()> {
    if options.chunk_size == 0 {
        return Err(GeffError::InvalidArgument(
            "chunk size must be strictly positive".to_string(),
        ));
    }

    let geff_version = options
        .version
        .clone()
        .or_else(|| {
            let v = &graph.metadata.geff_version;
            (!v.is_empty()).then(|| v.clone())
        })
        .unwrap_or_else(|| version::DEFAULT_VERSION.to_string());
    let version = version::check_supported(&geff_version)?;

    let metadata = Metadata {
        geff_version,
        ..graph.metadata.clone()
    };
    metadata.validate()?;

    nodes::write_nodes(store, group, &graph.nodes, options.chunk_size, version)?;
    edges::write_edges(store, group, &graph.edges, options.chunk_size)?;
    write_metadata(store, group, &metadata)?;
    debug!(
        group,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{self, Axis};
    use crate::store::MemoryStore;

    #[test]
    fn write_fills_in_the_default_version() {
        let mut store = MemoryStore::new();
        let graph = Geff::new(Metadata::new("", true));
        write_graph(&mut store, "g", &graph, &WriteOptions::default()).expect("write");
        let back = read_graph(&store, "g").expect("read");
        assert_eq!(back.metadata.geff_version, version::DEFAULT_VERSION);
    }

    #[test]
    fn options_version_overrides_the_snapshot() {
        let mut store = MemoryStore::new();
        let graph = Geff::new(
            Metadata::new("0.3.0", false)
                .with_axes(vec![Axis::time(axis::NAME_TIME, axis::UNIT_SECONDS)]),
        );
        let options = WriteOptions::default().version("0.2");
        write_graph(&mut store, "g", &graph, &options).expect("write");
        let back = read_graph(&store, "g").expect("read");
        assert_eq!(back.metadata.geff_version, "0.2");
    }

    #[test]
    fn unsupported_requested_version_fails_before_writing() {
        let mut store = MemoryStore::new();
        let graph = Geff::new(Metadata::new("1.0", true));
        assert!(matches!(
            write_graph(&mut store, "g", &graph, &WriteOptions::default()),
            Err(GeffError::UnsupportedVersion(_))
        ));
        assert!(!store.dataset_exists("g/nodes/ids"));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let mut store = MemoryStore::new();
        let graph = Geff::new(Metadata::new("0.3.0", true));
        let options = WriteOptions::default().chunk_size(0);
        assert!(matches!(
            write_graph(&mut store, "g", &graph, &options),
            Err(GeffError::InvalidArgument(_))
        ));
    }
}
