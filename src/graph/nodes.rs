use tracing::debug;

use crate::chunked::Flattened;
use crate::error::{GeffError, Result};
use crate::graph::columns::{
    read_f64_array, read_f64_matrix, read_i32_array, read_i32_matrix, verify_len,
    write_f64_array, write_f64_columns, write_f64_pairs, write_i32_array, write_i32_pairs,
};
use crate::model::{Node, DEFAULT_COLOR, DEFAULT_COVARIANCE_2D, DEFAULT_COVARIANCE_3D,
    DEFAULT_RADIUS, UNSET_SEGMENT_ID, UNSET_TIMEPOINT};
use crate::store::{join_path, BlockStore};

const IDS: &str = "nodes/ids";
const T: &str = "nodes/props/t/values";
const X: &str = "nodes/props/x/values";
const Y: &str = "nodes/props/y/values";
const Z: &str = "nodes/props/z/values";
const COLOR: &str = "nodes/props/color/values";
const TRACK_ID: &str = "nodes/props/track_id/values";
const RADIUS: &str = "nodes/props/radius/values";
const COVARIANCE_2D: &str = "nodes/props/covariance2d/values";
const COVARIANCE_3D: &str = "nodes/props/covariance3d/values";
const POLYGON_SLICES: &str = "nodes/props/polygon/slices";
const POLYGON_VALUES: &str = "nodes/props/polygon/values";

/// Reads the node record collection of a group. `nodes/ids` defines the
/// record count; every property column is optional and substitutes its
/// per-field default when the dataset is entirely absent. A column that is
/// present with the wrong length is a hard failure.
pub fn read_nodes<S: BlockStore + ?Sized>(
    store: &S,
    group: &str,
    version: (u32, u32),
) -> Result<Vec<Node>> {
    let at = |rest: &str| join_path(group, rest);

    let ids_path = at(IDS);
    let ids = read_i32_array(store, &ids_path)?
        .ok_or_else(|| GeffError::MissingDataset(ids_path.clone()))?;
    let count = ids.len();

    let timepoints = optional_i32_column(store, &at(T), count)?;
    let xs = optional_f64_column(store, &at(X), count)?;
    let ys = optional_f64_column(store, &at(Y), count)?;
    let zs = optional_f64_column(store, &at(Z), count)?;
    let colors = optional_f64_matrix(store, &at(COLOR), 4, count)?;
    let track_ids = optional_i32_column(store, &at(TRACK_ID), count)?;
    let radii = optional_f64_column(store, &at(RADIUS), count)?;
    let covariance2d = optional_f64_matrix(store, &at(COVARIANCE_2D), 4, count)?;
    let covariance3d = optional_f64_matrix(store, &at(COVARIANCE_3D), 6, count)?;
    let polygons = if version >= (0, 4) {
        read_polygons(store, &at(POLYGON_SLICES), &at(POLYGON_VALUES), count)?
    } else {
        None
    };

    let mut nodes = Vec::with_capacity(count);
    for (i, &id) in ids.iter().enumerate() {
        let (polygon_x, polygon_y) = match &polygons {
            Some(polygons) => polygons[i].clone(),
            None => (Vec::new(), Vec::new()),
        };
        nodes.push(Node {
            id,
            t: timepoints.as_ref().map_or(UNSET_TIMEPOINT, |v| v[i]),
            x: xs.as_ref().map_or(f64::NAN, |v| v[i]),
            y: ys.as_ref().map_or(f64::NAN, |v| v[i]),
            z: zs.as_ref().map_or(f64::NAN, |v| v[i]),
            color: matrix_row(&colors, i, DEFAULT_COLOR),
            segment_id: track_ids.as_ref().map_or(UNSET_SEGMENT_ID, |v| v[i]),
            radius: radii.as_ref().map_or(DEFAULT_RADIUS, |v| v[i]),
            covariance2d: matrix_row(&covariance2d, i, DEFAULT_COVARIANCE_2D),
            covariance3d: matrix_row(&covariance3d, i, DEFAULT_COVARIANCE_3D),
            polygon_x,
            polygon_y,
        });
    }
    debug!(group, count, "nodes read");
    Ok(nodes)
}

/// Writes the node record collection: ids plus one dataset per property
/// column, all derived from the same record order. For schema 0.4 the
/// polygon tables are emitted from a local prefix sum over the per-node
/// vertex counts; the records themselves are never touched.
pub fn write_nodes<S: BlockStore + ?Sized>(
    store: &mut S,
    group: &str,
    nodes: &[Node],
    chunk_size: usize,
    version: (u32, u32),
) -> Result<()> {
    let at = |rest: &str| join_path(group, rest);

    write_i32_array(store, &at(IDS), nodes, chunk_size, |n| n.id)?;
    write_i32_array(store, &at(T), nodes, chunk_size, |n| n.t)?;
    write_f64_array(store, &at(X), nodes, chunk_size, |n| n.x)?;
    write_f64_array(store, &at(Y), nodes, chunk_size, |n| n.y)?;
    write_f64_array(store, &at(Z), nodes, chunk_size, |n| n.z)?;
    write_f64_columns(store, &at(COLOR), nodes, 4, chunk_size, |n| n.color.to_vec())?;
    write_i32_array(store, &at(TRACK_ID), nodes, chunk_size, |n| n.segment_id)?;
    write_f64_array(store, &at(RADIUS), nodes, chunk_size, |n| n.radius)?;
    write_f64_columns(store, &at(COVARIANCE_2D), nodes, 4, chunk_size, |n| {
        n.covariance2d.to_vec()
    })?;
    write_f64_columns(store, &at(COVARIANCE_3D), nodes, 6, chunk_size, |n| {
        n.covariance3d.to_vec()
    })?;

    if version >= (0, 4) {
        write_polygons(store, &at(POLYGON_SLICES), &at(POLYGON_VALUES), nodes, chunk_size)?;
    }
    debug!(group, count = nodes.len(), chunk_size, "nodes written");
    Ok(())
}

fn optional_i32_column<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
    count: usize,
) -> Result<Option<Vec<i32>>> {
    match read_i32_array(store, path)? {
        Some(values) => {
            verify_len(path, count, values.len())?;
            Ok(Some(values))
        }
        None => Ok(None),
    }
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

// A `[components, N]` property matrix; the component count is part of the
// schema, so a dataset with a different leading extent is malformed.
fn optional_f64_matrix<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
    components: usize,
    count: usize,
) -> Result<Option<Flattened<f64>>> {
    match read_f64_matrix(store, path)? {
        Some(matrix) => {
            if matrix.shape()[0] != components {
                return Err(GeffError::InvalidArgument(format!(
                    "{path}: expected {components} components per record, found {}",
                    matrix.shape()[0]
                )));
            }
            verify_len(path, count, matrix.shape()[1])?;
            Ok(Some(matrix))
        }
        None => Ok(None),
    }
}

fn matrix_row<const N: usize>(
    matrix: &Option<Flattened<f64>>,
    index: usize,
    default: [f64; N],
) -> [f64; N] {
    match matrix {
        Some(matrix) => {
            let mut row = default;
            for (c, slot) in row.iter_mut().enumerate() {
                *slot = matrix.at(&[c, index]);
            }
            row
        }
        None => default,
    }
}

type PolygonList = Vec<(Vec<f64>, Vec<f64>)>;

fn read_polygons<S: BlockStore + ?Sized>(
    store: &S,
    slices_path: &str,
    values_path: &str,
    count: usize,
) -> Result<Option<PolygonList>> {
    let slices = match read_i32_matrix(store, slices_path)? {
        Some(slices) => slices,
        None => return Ok(None),
    };
    let values = read_f64_matrix(store, values_path)?
        .ok_or_else(|| GeffError::MissingDataset(values_path.to_string()))?;

    if slices.shape()[1] != 2 {
        return Err(GeffError::InvalidArgument(format!(
            "{slices_path}: slice rows must be [start, end) pairs, found {} columns",
            slices.shape()[1]
        )));
    }
    verify_len(slices_path, count, slices.shape()[0])?;
    if values.shape()[1] != 2 {
        return Err(GeffError::InvalidArgument(format!(
            "{values_path}: vertex rows must be (x, y) pairs, found {} columns",
            values.shape()[1]
        )));
    }
    let num_vertices = values.shape()[0];

    let mut polygons = Vec::with_capacity(count);
    for i in 0..count {
        let start = slices.at(&[i, 0]);
        let end = slices.at(&[i, 1]);
        if start < 0 || end < start || end as usize > num_vertices {
            return Err(GeffError::InvalidArgument(format!(
                "{slices_path}: slice [{start}, {end}) of record {i} is out of range for {num_vertices} vertices"
            )));
        }
        let (start, end) = (start as usize, end as usize);
        let mut xs = Vec::with_capacity(end - start);
        let mut ys = Vec::with_capacity(end - start);
        for v in start..end {
            xs.push(values.at(&[v, 0]));
            ys.push(values.at(&[v, 1]));
        }
        polygons.push((xs, ys));
    }
    Ok(Some(polygons))
}

fn write_polygons<S: BlockStore + ?Sized>(
    store: &mut S,
    slices_path: &str,
    values_path: &str,
    nodes: &[Node],
    chunk_size: usize,
) -> Result<()> {
    let mut slices = Vec::with_capacity(nodes.len());
    let mut vertices = Vec::new();
    let mut offset = 0usize;
    for node in nodes {
        if node.polygon_x.len() != node.polygon_y.len() {
            return Err(GeffError::InvalidArgument(format!(
                "node {} has {} polygon x coordinates but {} y coordinates",
                node.id,
                node.polygon_x.len(),
                node.polygon_y.len()
            )));
        }
        let len = node.polygon_len();
        slices.push([offset as i32, (offset + len) as i32]);
        vertices.extend(node.polygon_x.iter().copied().zip(node.polygon_y.iter().copied()));
        offset += len;
    }
    write_i32_pairs(store, slices_path, &slices, chunk_size)?;
    write_f64_pairs(store, values_path, &vertices, chunk_size)
}
