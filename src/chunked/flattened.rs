use crate::error::{GeffError, Result};

/// View over a fully-read N-dimensional dataset: the dense buffer plus its
/// shape, with column-major index arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T: Copy> Flattened<T> {
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(GeffError::InvalidArgument(format!(
                "buffer of {} elements cannot have shape {shape:?}",
                data.len()
            )));
        }
        Ok(Self { data, shape })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Element at the given multi-index: offset
    /// `i0 + D0*i1 + D0*D1*i2 + ...`.
    pub fn at(&self, index: &[usize]) -> T {
        assert_eq!(index.len(), self.shape.len(), "index rank mismatch");
        let mut offset = 0;
        let mut stride = 1;
        for (i, d) in index.iter().zip(&self.shape) {
            debug_assert!(i < d, "index {index:?} out of bounds for shape {:?}", self.shape);
            offset += i * stride;
            stride *= d;
        }
        self.data[offset]
    }

    /// Copies out `[at(0, j), at(1, j), .., at(shape[0]-1, j)]` of a
    /// two-dimensional view.
    pub fn row(&self, j: usize) -> Vec<T> {
        assert_eq!(self.shape.len(), 2, "row access requires a 2-D view");
        (0..self.shape[0]).map(|i| self.at(&[i, j])).collect()
    }
}
