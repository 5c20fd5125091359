//! Typed column accessors shared by the node and edge codecs: each helper
//! projects a record list into one dataset (or one dataset into a column)
//! through the chunked codec, with the GEFF blocking conventions baked in.
//! One-dimensional columns are blocked by `chunk_size`; matrices keep their
//! small dimension whole and block the record dimension.

use tracing::debug;

use crate::chunked::{read_dataset, write_dataset, ElementBuffer, Flattened};
use crate::error::{GeffError, Result};
use crate::store::{BlockStore, Compression, DatasetAttributes, ElementType};

pub(crate) fn verify_len(path: &str, expected: usize, actual: usize) -> Result<()> {
    if actual != expected {
        return Err(GeffError::LengthMismatch {
            path: path.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn expect_rank(path: &str, dimensions: &[u64], expected: usize) -> Result<()> {
    if dimensions.len() != expected {
        return Err(GeffError::RankMismatch {
            path: path.to_string(),
            expected,
            actual: dimensions.len(),
        });
    }
    Ok(())
}

fn chunk_extent(path: &str, chunk_size: usize) -> Result<u32> {
    if chunk_size == 0 {
        return Err(GeffError::InvalidArgument(format!(
            "{path}: chunk size must be strictly positive"
        )));
    }
    u32::try_from(chunk_size)
        .map_err(|_| GeffError::InvalidArgument(format!("{path}: chunk size {chunk_size} too large")))
}

pub(crate) fn read_i32_array<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Option<Vec<i32>>> {
    if !store.dataset_exists(path) {
        debug!(path, "dataset absent");
        return Ok(None);
    }
    let (buffer, dimensions) = read_dataset(store, path)?;
    expect_rank(path, &dimensions, 1)?;
    Ok(Some(buffer.into_i32(path)?))
}

pub(crate) fn read_f64_array<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Option<Vec<f64>>> {
    if !store.dataset_exists(path) {
        debug!(path, "dataset absent");
        return Ok(None);
    }
    let (buffer, dimensions) = read_dataset(store, path)?;
    expect_rank(path, &dimensions, 1)?;
    Ok(Some(buffer.into_f64(path)?))
}

pub(crate) fn read_i32_matrix<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Option<Flattened<i32>>> {
    if !store.dataset_exists(path) {
        debug!(path, "dataset absent");
        return Ok(None);
    }
    let (buffer, dimensions) = read_dataset(store, path)?;
    expect_rank(path, &dimensions, 2)?;
    let shape: Vec<usize> = dimensions.iter().map(|&d| d as usize).collect();
    Ok(Some(Flattened::new(buffer.into_i32(path)?, shape)?))
}

pub(crate) fn read_f64_matrix<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Option<Flattened<f64>>> {
    if !store.dataset_exists(path) {
        debug!(path, "dataset absent");
        return Ok(None);
    }
    let (buffer, dimensions) = read_dataset(store, path)?;
    expect_rank(path, &dimensions, 2)?;
    let shape: Vec<usize> = dimensions.iter().map(|&d| d as usize).collect();
    Ok(Some(Flattened::new(buffer.into_f64(path)?, shape)?))
}

pub(crate) fn write_i32_array<S, T>(
    store: &mut S,
    path: &str,
    items: &[T],
    chunk_size: usize,
    extract: impl Fn(&T) -> i32,
) -> Result<()>
where
    S: BlockStore + ?Sized,
{
    let data: Vec<i32> = items.iter().map(extract).collect();
    let attributes = DatasetAttributes::new(
        vec![items.len() as u64],
        vec![chunk_extent(path, chunk_size)?],
        ElementType::Int32,
        Compression::Blosc,
    );
    write_dataset(store, path, &ElementBuffer::Int32(data), &attributes)
}

pub(crate) fn write_f64_array<S, T>(
    store: &mut S,
    path: &str,
    items: &[T],
    chunk_size: usize,
    extract: impl Fn(&T) -> f64,
) -> Result<()>
where
    S: BlockStore + ?Sized,
{
    let data: Vec<f64> = items.iter().map(extract).collect();
    let attributes = DatasetAttributes::new(
        vec![items.len() as u64],
        vec![chunk_extent(path, chunk_size)?],
        ElementType::Float64,
        Compression::Blosc,
    );
    write_dataset(store, path, &ElementBuffer::Float64(data), &attributes)
}

/// Writes one fixed-width row per record as a `[columns, N]` column-major
/// matrix, so each record's components are contiguous on disk.
pub(crate) fn write_i32_columns<S, T>(
    store: &mut S,
    path: &str,
    items: &[T],
    columns: usize,
    chunk_size: usize,
    extract: impl Fn(&T) -> Vec<i32>,
) -> Result<()>
where
    S: BlockStore + ?Sized,
{
    let mut data = Vec::with_capacity(columns * items.len());
    for item in items {
        let row = extract(item);
        if row.len() != columns {
            return Err(GeffError::InvalidArgument(format!(
                "{path}: expected {columns} components per record, got {}",
                row.len()
            )));
        }
        data.extend_from_slice(&row);
    }
    let attributes = DatasetAttributes::new(
        vec![columns as u64, items.len() as u64],
        vec![columns as u32, chunk_extent(path, chunk_size)?],
        ElementType::Int32,
        Compression::Blosc,
    );
    write_dataset(store, path, &ElementBuffer::Int32(data), &attributes)
}

/// See [`write_i32_columns`].
pub(crate) fn write_f64_columns<S, T>(
    store: &mut S,
    path: &str,
    items: &[T],
    columns: usize,
    chunk_size: usize,
    extract: impl Fn(&T) -> Vec<f64>,
) -> Result<()>
where
    S: BlockStore + ?Sized,
{
    let mut data = Vec::with_capacity(columns * items.len());
    for item in items {
        let row = extract(item);
        if row.len() != columns {
            return Err(GeffError::InvalidArgument(format!(
                "{path}: expected {columns} components per record, got {}",
                row.len()
            )));
        }
        data.extend_from_slice(&row);
    }
    let attributes = DatasetAttributes::new(
        vec![columns as u64, items.len() as u64],
        vec![columns as u32, chunk_extent(path, chunk_size)?],
        ElementType::Float64,
        Compression::Blosc,
    );
    write_dataset(store, path, &ElementBuffer::Float64(data), &attributes)
}

/// Writes `[start, end)` index pairs as an `[N, 2]` column-major matrix
/// (record dimension leading, blocked by `chunk_size`).
pub(crate) fn write_i32_pairs<S: BlockStore + ?Sized>(
    store: &mut S,
    path: &str,
    rows: &[[i32; 2]],
    chunk_size: usize,
) -> Result<()> {
    let n = rows.len();
    let mut data = vec![0; 2 * n];
    for (i, row) in rows.iter().enumerate() {
        data[i] = row[0];
        data[n + i] = row[1];
    }
    let attributes = DatasetAttributes::new(
        vec![n as u64, 2],
        vec![chunk_extent(path, chunk_size)?, 2],
        ElementType::Int32,
        Compression::Blosc,
    );
    write_dataset(store, path, &ElementBuffer::Int32(data), &attributes)
}

/// Writes `(x, y)` vertex pairs as a `[V, 2]` column-major matrix.
pub(crate) fn write_f64_pairs<S: BlockStore + ?Sized>(
    store: &mut S,
    path: &str,
    rows: &[(f64, f64)],
    chunk_size: usize,
) -> Result<()> {
    let n = rows.len();
    let mut data = vec![0.0; 2 * n];
    for (i, &(x, y)) in rows.iter().enumerate() {
        data[i] = x;
        data[n + i] = y;
    }
    let attributes = DatasetAttributes::new(
        vec![n as u64, 2],
        vec![chunk_extent(path, chunk_size)?, 2],
        ElementType::Float64,
        Compression::Blosc,
    );
    write_dataset(store, path, &ElementBuffer::Float64(data), &attributes)
}
