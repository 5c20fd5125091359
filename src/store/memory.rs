use std::collections::{HashMap, HashSet};
use std::io;

use serde_json::Value;

use crate::error::{GeffError, Result};
use crate::store::{normalize_path, Block, BlockStore, DatasetAttributes};

/// Heap-backed [`BlockStore`] with the same group/dataset/attribute
/// semantics as the filesystem drivers. The reference backing for the test
/// suite; also usable to stage a graph before copying it elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: HashSet<String>,
    datasets: HashMap<String, MemoryDataset>,
    attributes: HashMap<String, serde_json::Map<String, Value>>,
}

#[derive(Debug)]
struct MemoryDataset {
    attributes: DatasetAttributes,
    blocks: HashMap<Vec<u64>, Block>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Registers every ancestor so that group_exists answers for
    // intermediate paths the same way a directory hierarchy would.
    fn register_parents(&mut self, path: &str) {
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            self.groups.insert(current.clone());
        }
        self.groups.insert(String::new());
    }

    fn dataset(&self, path: &str) -> Result<&MemoryDataset> {
        let path = normalize_path(path);
        self.datasets
            .get(&path)
            .ok_or(GeffError::MissingDataset(path))
    }
}

impl BlockStore for MemoryStore {
    fn group_exists(&self, path: &str) -> bool {
        self.groups.contains(&normalize_path(path))
    }

    fn dataset_exists(&self, path: &str) -> bool {
        self.datasets.contains_key(&normalize_path(path))
    }

    fn dataset_attributes(&self, path: &str) -> Result<DatasetAttributes> {
        Ok(self.dataset(path)?.attributes.clone())
    }

    fn get_attribute(&self, path: &str, key: &str) -> Result<Option<Value>> {
        Ok(self
            .attributes
            .get(&normalize_path(path))
            .and_then(|doc| doc.get(key))
            .cloned())
    }

    fn set_attribute(&mut self, path: &str, key: &str, value: Value) -> Result<()> {
        let path = normalize_path(path);
        self.register_parents(&path);
        self.attributes
            .entry(path)
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn create_dataset(&mut self, path: &str, attributes: &DatasetAttributes) -> Result<()> {
        let path = normalize_path(path);
        attributes.validate(&path)?;
        self.register_parents(&path);
        self.datasets.insert(
            path,
            MemoryDataset {
                attributes: attributes.clone(),
                blocks: HashMap::new(),
            },
        );
        Ok(())
    }

    fn read_block(
        &self,
        path: &str,
        _attributes: &DatasetAttributes,
        grid_position: &[u64],
    ) -> Result<Block> {
        let dataset = self.dataset(path)?;
        dataset
            .blocks
            .get(grid_position)
            .cloned()
            .ok_or_else(|| GeffError::BlockIo {
                path: normalize_path(path),
                grid_position: grid_position.to_vec(),
                source: Box::new(GeffError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    "block not present",
                ))),
            })
    }

    fn write_block(
        &mut self,
        path: &str,
        _attributes: &DatasetAttributes,
        block: Block,
    ) -> Result<()> {
        let path = normalize_path(path);
        let dataset = self
            .datasets
            .get_mut(&path)
            .ok_or(GeffError::MissingDataset(path))?;
        dataset.blocks.insert(block.grid_position.clone(), block);
        Ok(())
    }
}
