use tracing::debug;

use crate::error::{GeffError, Result};
use crate::graph::columns::{
    read_f64_array, read_i32_matrix, verify_len, write_f64_array, write_i32_columns,
};
use crate::model::{Edge, DEFAULT_DISTANCE, DEFAULT_SCORE};
use crate::store::{join_path, BlockStore};

const IDS: &str = "edges/ids";
const DISTANCE: &str = "edges/props/distance/values";
const SCORE: &str = "edges/props/score/values";

/// Reads the edge record collection. `edges/ids` is required and its
/// trailing extent defines the edge count; scores and distances are
/// optional columns under the usual length invariant. Edge ids are the
/// sequential record indices.
pub fn read_edges<S: BlockStore + ?Sized>(store: &S, group: &str) -> Result<Vec<Edge>> {
    let at = |rest: &str| join_path(group, rest);

    let ids_path = at(IDS);
    let ids = read_i32_matrix(store, &ids_path)?
        .ok_or_else(|| GeffError::MissingDataset(ids_path.clone()))?;
    if ids.shape()[0] != 2 {
        return Err(GeffError::InvalidArgument(format!(
            "{ids_path}: expected two rows (source, target), found {}",
            ids.shape()[0]
        )));
    }
    let count = ids.shape()[1];

    let distances = optional_f64_column(store, &at(DISTANCE), count)?;
    let scores = optional_f64_column(store, &at(SCORE), count)?;

    let mut edges = Vec::with_capacity(count);
    for i in 0..count {
        edges.push(Edge {
            id: i as i32,
            source_node_id: ids.at(&[0, i]),
            target_node_id: ids.at(&[1, i]),
            score: scores.as_ref().map_or(DEFAULT_SCORE, |v| v[i]),
            distance: distances.as_ref().map_or(DEFAULT_DISTANCE, |v| v[i]),
        });
    }
    debug!(group, count, "edges read");
    Ok(edges)
}

/// Writes the edge record collection: the `[2, E]` endpoint matrix plus
/// the distance and score columns.
pub fn write_edges<S: BlockStore + ?Sized>(
    store: &mut S,
    group: &str,
    edges: &[Edge],
    chunk_size: usize,
) -> Result<()> {
    let at = |rest: &str| join_path(group, rest);

    write_i32_columns(store, &at(IDS), edges, 2, chunk_size, |e| {
        vec![e.source_node_id, e.target_node_id]
    })?;
    write_f64_array(store, &at(DISTANCE), edges, chunk_size, |e| e.distance)?;
    write_f64_array(store, &at(SCORE), edges, chunk_size, |e| e.score)?;
    debug!(group, count = edges.len(), chunk_size, "edges written");
    Ok(())
}

fn optional_f64_column<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
    count: usize,
) -> Result<Option<Vec<f64>>> {
    match read_f64_array(store, path)? {
        Some(values) => {
            verify_len(path, count, values.len())?;
            Ok(Some(values))
        }
        None => Ok(None),
    }
}
