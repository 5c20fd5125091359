use crate::error::{GeffError, Result};
use crate::store::ElementType;

/// Dense column-major storage for one dataset region, tagged with its
/// element type. Blocks and whole-dataset buffers share this representation,
/// so block assembly is a plain sub-array copy in the on-disk type; element
/// coercion happens afterwards on the assembled buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementBuffer {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Str(Vec<String>),
}

impl ElementBuffer {
    /// Allocates a zeroed buffer of `len` elements of the given type.
    pub fn allocate(element_type: ElementType, len: usize) -> Result<Self> {
        Ok(match element_type {
            ElementType::Int8 => ElementBuffer::Int8(vec![0; len]),
            ElementType::UInt8 => ElementBuffer::UInt8(vec![0; len]),
            ElementType::Int16 => ElementBuffer::Int16(vec![0; len]),
            ElementType::UInt16 => ElementBuffer::UInt16(vec![0; len]),
            ElementType::Int32 => ElementBuffer::Int32(vec![0; len]),
            ElementType::UInt32 => ElementBuffer::UInt32(vec![0; len]),
            ElementType::Int64 => ElementBuffer::Int64(vec![0; len]),
            ElementType::UInt64 => ElementBuffer::UInt64(vec![0; len]),
            ElementType::Float32 => ElementBuffer::Float32(vec![0.0; len]),
            ElementType::Float64 => ElementBuffer::Float64(vec![0.0; len]),
            ElementType::String => ElementBuffer::Str(vec![String::new(); len]),
            ElementType::Object => {
                return Err(GeffError::InvalidArgument(
                    "object datasets are not supported".to_string(),
                ))
            }
        })
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementBuffer::Int8(_) => ElementType::Int8,
            ElementBuffer::UInt8(_) => ElementType::UInt8,
            ElementBuffer::Int16(_) => ElementType::Int16,
            ElementBuffer::UInt16(_) => ElementType::UInt16,
            ElementBuffer::Int32(_) => ElementType::Int32,
            ElementBuffer::UInt32(_) => ElementType::UInt32,
            ElementBuffer::Int64(_) => ElementType::Int64,
            ElementBuffer::UInt64(_) => ElementType::UInt64,
            ElementBuffer::Float32(_) => ElementType::Float32,
            ElementBuffer::Float64(_) => ElementType::Float64,
            ElementBuffer::Str(_) => ElementType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ElementBuffer::Int8(data) => data.len(),
            ElementBuffer::UInt8(data) => data.len(),
            ElementBuffer::Int16(data) => data.len(),
            ElementBuffer::UInt16(data) => data.len(),
            ElementBuffer::Int32(data) => data.len(),
            ElementBuffer::UInt32(data) => data.len(),
            ElementBuffer::Int64(data) => data.len(),
            ElementBuffer::UInt64(data) => data.len(),
            ElementBuffer::Float32(data) => data.len(),
            ElementBuffer::Float64(data) => data.len(),
            ElementBuffer::Str(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the rectangular region `size` from `self` at `src_pos` into
    /// `dst` at `dst_pos`, both interpreted as column-major arrays of the
    /// given shapes. The two buffers must carry the same element type;
    /// coercion is a separate, whole-buffer step.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_region(
        &self,
        src_shape: &[usize],
        src_pos: &[usize],
        dst: &mut ElementBuffer,
        dst_shape: &[usize],
        dst_pos: &[usize],
        size: &[usize],
    ) -> Result<()> {
        use ElementBuffer::*;
        match (self, dst) {
            (Int8(s), Int8(d)) => copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size),
            (UInt8(s), UInt8(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (Int16(s), Int16(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (UInt16(s), UInt16(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (Int32(s), Int32(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (UInt32(s), UInt32(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (Int64(s), Int64(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (UInt64(s), UInt64(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (Float32(s), Float32(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (Float64(s), Float64(d)) => {
                copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size)
            }
            (Str(s), Str(d)) => copy_subarray(s, src_shape, src_pos, d, dst_shape, dst_pos, size),
            (src, dst) => {
                return Err(GeffError::InvalidArgument(format!(
                    "cannot copy between {} and {} buffers",
                    src.element_type(),
                    dst.element_type()
                )))
            }
        }
        Ok(())
    }

    /// Converts the whole buffer to `i32` elements. Narrowing follows
    /// C-style truncation; overflow is the caller's contract. Non-numeric
    /// sources fail with `TypeMismatch`.
    pub fn into_i32(self, path: &str) -> Result<Vec<i32>> {
        use ElementBuffer::*;
        Ok(match self {
            Int32(data) => data,
            Int8(data) => data.into_iter().map(|v| v as i32).collect(),
            UInt8(data) => data.into_iter().map(|v| v as i32).collect(),
            Int16(data) => data.into_iter().map(|v| v as i32).collect(),
            UInt16(data) => data.into_iter().map(|v| v as i32).collect(),
            UInt32(data) => data.into_iter().map(|v| v as i32).collect(),
            Int64(data) => data.into_iter().map(|v| v as i32).collect(),
            UInt64(data) => data.into_iter().map(|v| v as i32).collect(),
            Float32(data) => data.into_iter().map(|v| v as i32).collect(),
            Float64(data) => data.into_iter().map(|v| v as i32).collect(),
            Str(_) => {
                return Err(GeffError::TypeMismatch {
                    path: path.to_string(),
                    requested: ElementType::Int32,
                    actual: ElementType::String,
                })
            }
        })
    }

    /// Converts the whole buffer to `f64` elements; all numeric widenings
    /// are exact except `u64`/`i64` values beyond 2^53.
    pub fn into_f64(self, path: &str) -> Result<Vec<f64>> {
        use ElementBuffer::*;
        Ok(match self {
            Float64(data) => data,
            Int8(data) => data.into_iter().map(f64::from).collect(),
            UInt8(data) => data.into_iter().map(f64::from).collect(),
            Int16(data) => data.into_iter().map(f64::from).collect(),
            UInt16(data) => data.into_iter().map(f64::from).collect(),
            Int32(data) => data.into_iter().map(f64::from).collect(),
            UInt32(data) => data.into_iter().map(f64::from).collect(),
            Int64(data) => data.into_iter().map(|v| v as f64).collect(),
            UInt64(data) => data.into_iter().map(|v| v as f64).collect(),
            Float32(data) => data.into_iter().map(f64::from).collect(),
            Str(_) => {
                return Err(GeffError::TypeMismatch {
                    path: path.to_string(),
                    requested: ElementType::Float64,
                    actual: ElementType::String,
                })
            }
        })
    }
}

// Column-major strides: element (i0, .., i_{n-1}) of shape (D0, .., D_{n-1})
// lives at offset i0 + D0*i1 + D0*D1*i2 + ...
fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut acc = 1;
    for &d in shape {
        strides.push(acc);
        acc *= d;
    }
    strides
}

fn copy_subarray<T: Clone>(
    src: &[T],
    src_shape: &[usize],
    src_pos: &[usize],
    dst: &mut [T],
    dst_shape: &[usize],
    dst_pos: &[usize],
    size: &[usize],
) {
    let n = size.len();
    debug_assert_eq!(src_shape.len(), n);
    debug_assert_eq!(src_pos.len(), n);
    debug_assert_eq!(dst_shape.len(), n);
    debug_assert_eq!(dst_pos.len(), n);
    if n == 0 || size.iter().any(|&s| s == 0) {
        return;
    }

    let src_strides = strides(src_shape);
    let dst_strides = strides(dst_shape);
    let run = size[0];
    let mut index = vec![0usize; n];
    loop {
        let mut s = 0;
        let mut d = 0;
        for dim in 0..n {
            s += (src_pos[dim] + index[dim]) * src_strides[dim];
            d += (dst_pos[dim] + index[dim]) * dst_strides[dim];
        }
        dst[d..d + run].clone_from_slice(&src[s..s + run]);

        // Odometer over the outer dimensions; dimension 0 is the run itself.
        let mut dim = 1;
        loop {
            if dim >= n {
                return;
            }
            index[dim] += 1;
            if index[dim] < size[dim] {
                break;
            }
            index[dim] = 0;
            dim += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subarray_copy_respects_both_strides() {
        // 4x3 source, column-major.
        #[rustfmt::skip]
        let src = vec![
             0,  1,  2,  3, // column 0
            10, 11, 12, 13, // column 1
            20, 21, 22, 23, // column 2
        ];
        // Copy the 2x2 region at (1, 1) into a 3x2 destination at (0, 0).
        let mut dst = vec![0; 6];
        copy_subarray(&src, &[4, 3], &[1, 1], &mut dst, &[3, 2], &[0, 0], &[2, 2]);
        assert_eq!(dst, vec![11, 12, 0, 21, 22, 0]);
    }

    #[test]
    fn region_copy_requires_matching_types() {
        let src = ElementBuffer::Int32(vec![1, 2]);
        let mut dst = ElementBuffer::Float64(vec![0.0, 0.0]);
        let err = src
            .copy_region(&[2], &[0], &mut dst, &[2], &[0], &[2])
            .unwrap_err();
        assert!(matches!(err, GeffError::InvalidArgument(_)));
    }

    #[test]
    fn narrowing_truncates_like_a_cast() {
        let buffer = ElementBuffer::Int64(vec![1, i64::from(i32::MAX) + 1, -7]);
        assert_eq!(
            buffer.into_i32("d").expect("convert"),
            vec![1, i32::MIN, -7]
        );

        let buffer = ElementBuffer::Float64(vec![1.9, -2.9, 4.0]);
        assert_eq!(buffer.into_i32("d").expect("convert"), vec![1, -2, 4]);
    }

    #[test]
    fn widening_is_exact() {
        let buffer = ElementBuffer::Int32(vec![-3, 0, 1_000_000]);
        assert_eq!(
            buffer.into_f64("d").expect("convert"),
            vec![-3.0, 0.0, 1_000_000.0]
        );

        let buffer = ElementBuffer::Float32(vec![0.5, -1.25]);
        assert_eq!(buffer.into_f64("d").expect("convert"), vec![0.5, -1.25]);
    }

    #[test]
    fn unsigned_to_signed_assumes_non_negative_values() {
        let buffer = ElementBuffer::UInt32(vec![0, 42]);
        assert_eq!(buffer.into_i32("d").expect("convert"), vec![0, 42]);
    }

    #[test]
    fn string_buffers_do_not_coerce() {
        let buffer = ElementBuffer::Str(vec!["a".to_string()]);
        let err = buffer.into_i32("nodes/ids").unwrap_err();
        match err {
            GeffError::TypeMismatch {
                path,
                requested,
                actual,
            } => {
                assert_eq!(path, "nodes/ids");
                assert_eq!(requested, ElementType::Int32);
                assert_eq!(actual, ElementType::String);
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }
}
