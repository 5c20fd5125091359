//! The block-store seam: a GEFF group lives in a hierarchical store (Zarr v2
//! or N5 on disk, or [`MemoryStore`] in tests) that the codecs drive through
//! the [`BlockStore`] trait. The store owns block encoding, compression, and
//! the attribute files; the codecs only see typed blocks and JSON attribute
//! values.

mod memory;

use std::fmt;

use serde_json::Value;

use crate::chunked::ElementBuffer;
use crate::error::{GeffError, Result};

pub use memory::MemoryStore;

/// On-disk element type of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    Object,
}

impl ElementType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ElementType::String | ElementType::Object)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Int8 => "int8",
            ElementType::UInt8 => "uint8",
            ElementType::Int16 => "int16",
            ElementType::UInt16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::UInt32 => "uint32",
            ElementType::Int64 => "int64",
            ElementType::UInt64 => "uint64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::String => "string",
            ElementType::Object => "object",
        };
        f.write_str(name)
    }
}

/// Compression applied to dataset blocks. Consumed verbatim by the store;
/// the codec never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    Raw,
    #[default]
    Blosc,
}

/// Shape, blocking, and typing of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetAttributes {
    pub dimensions: Vec<u64>,
    pub block_size: Vec<u32>,
    pub element_type: ElementType,
    pub compression: Compression,
}

impl DatasetAttributes {
    pub fn new(
        dimensions: Vec<u64>,
        block_size: Vec<u32>,
        element_type: ElementType,
        compression: Compression,
    ) -> Self {
        Self {
            dimensions,
            block_size,
            element_type,
            compression,
        }
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn num_elements(&self) -> u64 {
        self.dimensions.iter().product()
    }

    pub(crate) fn validate(&self, path: &str) -> Result<()> {
        if self.block_size.len() != self.dimensions.len() {
            return Err(GeffError::InvalidArgument(format!(
                "{path}: block size rank {} does not match dataset rank {}",
                self.block_size.len(),
                self.dimensions.len()
            )));
        }
        if self.block_size.iter().any(|&b| b == 0) {
            return Err(GeffError::InvalidArgument(format!(
                "{path}: block extents must be strictly positive, got {:?}",
                self.block_size
            )));
        }
        Ok(())
    }
}

/// One rectangular tile of a dataset. Blocks at the dataset boundary carry
/// their short extent in `size`, never a padded full-size extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub grid_position: Vec<u64>,
    pub size: Vec<u32>,
    pub data: ElementBuffer,
}

impl Block {
    pub fn num_elements(&self) -> usize {
        self.size.iter().map(|&s| s as usize).product()
    }
}

/// Interface to the underlying chunked-array store. The two supported
/// backings (Zarr v2 and N5) differ only below this seam; attribute-file
/// format and block encoding are the implementation's concern.
///
/// A store handle is scoped: it is acquired at the start of a public
/// operation and dropped on return, including failure paths.
pub trait BlockStore {
    fn group_exists(&self, path: &str) -> bool;

    fn dataset_exists(&self, path: &str) -> bool;

    fn dataset_attributes(&self, path: &str) -> Result<DatasetAttributes>;

    fn get_attribute(&self, path: &str, key: &str) -> Result<Option<Value>>;

    fn set_attribute(&mut self, path: &str, key: &str, value: Value) -> Result<()>;

    /// Creates (or replaces) a dataset. Replacement drops all existing
    /// blocks; in-place mutation of stored data is not supported.
    fn create_dataset(&mut self, path: &str, attributes: &DatasetAttributes) -> Result<()>;

    fn read_block(
        &self,
        path: &str,
        attributes: &DatasetAttributes,
        grid_position: &[u64],
    ) -> Result<Block>;

    fn write_block(
        &mut self,
        path: &str,
        attributes: &DatasetAttributes,
        block: Block,
    ) -> Result<()>;
}

/// Normalizes a group or dataset path to `/`-separated segments with no
/// leading, trailing, or repeated separators.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

pub(crate) fn join_path(group: &str, rest: &str) -> String {
    let group = normalize_path(group);
    if group.is_empty() {
        normalize_path(rest)
    } else {
        format!("{group}/{}", normalize_path(rest))
    }
}
