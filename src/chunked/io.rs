use tracing::debug;

use crate::chunked::{BlockGrid, ElementBuffer};
use crate::error::{GeffError, Result};
use crate::store::{Block, BlockStore, DatasetAttributes};

/// Writes a dense column-major buffer as a complete dataset. The dataset is
/// created (replacing any previous one) and every block of the grid is
/// emitted in lexicographic order, boundary blocks carrying their short
/// extent.
pub fn write_dataset<S: BlockStore + ?Sized>(
    store: &mut S,
    path: &str,
    data: &ElementBuffer,
    attributes: &DatasetAttributes,
) -> Result<()> {
    attributes.validate(path)?;
    if data.element_type() != attributes.element_type {
        return Err(GeffError::TypeMismatch {
            path: path.to_string(),
            requested: attributes.element_type,
            actual: data.element_type(),
        });
    }
    let num_elements = usize::try_from(attributes.num_elements())
        .map_err(|_| GeffError::InvalidArgument(format!("{path}: dataset too large")))?;
    if data.len() != num_elements {
        return Err(GeffError::LengthMismatch {
            path: path.to_string(),
            expected: num_elements,
            actual: data.len(),
        });
    }

    store.create_dataset(path, attributes)?;

    let grid = BlockGrid::new(&attributes.dimensions, &attributes.block_size)?;
    let src_shape = to_usize(&attributes.dimensions);
    let rank = grid.rank();
    let mut blocks_written = 0u64;
    for grid_position in grid.blocks() {
        let extent = grid.block_extent(&grid_position);
        let block_shape: Vec<usize> = extent.iter().map(|&e| e as usize).collect();
        let block_min = to_usize(&grid.block_min(&grid_position));

        let mut block_data =
            ElementBuffer::allocate(attributes.element_type, block_shape.iter().product())?;
        data.copy_region(
            &src_shape,
            &block_min,
            &mut block_data,
            &block_shape,
            &vec![0; rank],
            &block_shape,
        )?;

        let block = Block {
            grid_position: grid_position.clone(),
            size: extent,
            data: block_data,
        };
        store
            .write_block(path, attributes, block)
            .map_err(|err| err.into_block_io(path, &grid_position))?;
        blocks_written += 1;
    }
    debug!(path, blocks = blocks_written, "dataset written");
    Ok(())
}

/// Reads a complete dataset into one dense buffer, returning the buffer and
/// the dataset dimensions.
pub fn read_dataset<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<(ElementBuffer, Vec<u64>)> {
    if !store.dataset_exists(path) {
        return Err(GeffError::MissingDataset(path.to_string()));
    }
    let attributes = store.dataset_attributes(path)?;
    let dimensions = attributes.dimensions.clone();
    let min = vec![0; dimensions.len()];
    let buffer = read_region(store, path, &attributes, &min, &dimensions)?;
    Ok((buffer, dimensions))
}

/// Reads the rectangular region `[min, min + size)` of a dataset into a
/// dense buffer of shape `size`. Every intersecting block is fetched and
/// its overlap with the request is copied into place, so boundary blocks
/// and interior subregions follow the same path.
pub fn read_region<S: BlockStore + ?Sized>(
    store: &S,
    path: &str,
    attributes: &DatasetAttributes,
    min: &[u64],
    size: &[u64],
) -> Result<ElementBuffer> {
    let rank = attributes.rank();
    if min.len() != rank || size.len() != rank {
        return Err(GeffError::RankMismatch {
            path: path.to_string(),
            expected: rank,
            actual: min.len(),
        });
    }

    let num_elements = usize::try_from(size.iter().product::<u64>())
        .map_err(|_| GeffError::InvalidArgument(format!("{path}: region too large")))?;
    let mut dest = ElementBuffer::allocate(attributes.element_type, num_elements)?;
    let dest_shape = to_usize(size);

    let grid = BlockGrid::new(&attributes.dimensions, &attributes.block_size)?;
    for grid_position in grid.blocks_intersecting(min, size) {
        let block = store
            .read_block(path, attributes, &grid_position)
            .map_err(|err| err.into_block_io(path, &grid_position))?;
        let block_min = grid.block_min(&grid_position);
        let block_shape: Vec<usize> = block.size.iter().map(|&s| s as usize).collect();

        // Intersection of the block's covered interval with the request.
        let mut src_pos = Vec::with_capacity(rank);
        let mut dest_pos = Vec::with_capacity(rank);
        let mut span = Vec::with_capacity(rank);
        for d in 0..rank {
            let lo = block_min[d].max(min[d]);
            let hi = (block_min[d] + block.size[d] as u64).min(min[d] + size[d]);
            src_pos.push((lo - block_min[d]) as usize);
            dest_pos.push((lo - min[d]) as usize);
            span.push(hi.saturating_sub(lo) as usize);
        }

        block.data.copy_region(
            &block_shape,
            &src_pos,
            &mut dest,
            &dest_shape,
            &dest_pos,
            &span,
        )?;
    }
    Ok(dest)
}

fn to_usize(values: &[u64]) -> Vec<usize> {
    values.iter().map(|&v| v as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Compression, ElementType, MemoryStore};

    fn int_attrs(dimensions: Vec<u64>, block_size: Vec<u32>) -> DatasetAttributes {
        DatasetAttributes::new(dimensions, block_size, ElementType::Int32, Compression::Blosc)
    }

    #[test]
    fn one_dimensional_round_trip_across_block_boundaries() {
        let mut store = MemoryStore::new();
        let data: Vec<i32> = (0..15).collect();
        let attributes = int_attrs(vec![15], vec![4]);
        write_dataset(&mut store, "d", &ElementBuffer::Int32(data.clone()), &attributes)
            .expect("write");

        // 15 elements at block size 4 make blocks of 4, 4, 4, 3.
        for (position, expected) in [(0u64, 4u32), (1, 4), (2, 4), (3, 3)] {
            let block = store.read_block("d", &attributes, &[position]).expect("block");
            assert_eq!(block.size, vec![expected]);
        }

        let (buffer, dimensions) = read_dataset(&store, "d").expect("read");
        assert_eq!(dimensions, vec![15]);
        assert_eq!(buffer.into_i32("d").expect("convert"), data);
    }

    #[test]
    fn two_dimensional_round_trip_with_short_edge_blocks() {
        let mut store = MemoryStore::new();
        let data: Vec<i32> = (0..4 * 7).collect();
        let attributes = int_attrs(vec![4, 7], vec![4, 3]);
        write_dataset(&mut store, "m", &ElementBuffer::Int32(data.clone()), &attributes)
            .expect("write");

        let (buffer, dimensions) = read_dataset(&store, "m").expect("read");
        assert_eq!(dimensions, vec![4, 7]);
        assert_eq!(buffer.into_i32("m").expect("convert"), data);
    }

    #[test]
    fn partial_reads_use_the_intersection() {
        let mut store = MemoryStore::new();
        let data: Vec<i32> = (0..20).collect();
        let attributes = int_attrs(vec![20], vec![6]);
        write_dataset(&mut store, "d", &ElementBuffer::Int32(data), &attributes).expect("write");

        let region =
            read_region(&store, "d", &attributes, &[5], &[7]).expect("read region");
        assert_eq!(
            region.into_i32("d").expect("convert"),
            (5..12).collect::<Vec<i32>>()
        );
    }

    #[test]
    fn empty_dataset_round_trips_without_blocks() {
        let mut store = MemoryStore::new();
        let attributes = int_attrs(vec![0], vec![1000]);
        write_dataset(&mut store, "d", &ElementBuffer::Int32(Vec::new()), &attributes)
            .expect("write");
        let (buffer, dimensions) = read_dataset(&store, "d").expect("read");
        assert_eq!(dimensions, vec![0]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn missing_dataset_is_reported() {
        let store = MemoryStore::new();
        assert!(matches!(
            read_dataset(&store, "absent"),
            Err(GeffError::MissingDataset(path)) if path == "absent"
        ));
    }

    #[test]
    fn length_disagreement_fails_before_touching_the_store() {
        let mut store = MemoryStore::new();
        let attributes = int_attrs(vec![10], vec![4]);
        let err = write_dataset(
            &mut store,
            "d",
            &ElementBuffer::Int32(vec![1, 2, 3]),
            &attributes,
        )
        .unwrap_err();
        assert!(matches!(err, GeffError::LengthMismatch { expected: 10, actual: 3, .. }));
        assert!(!store.dataset_exists("d"));
    }
}
