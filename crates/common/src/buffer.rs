use crate::enums::ComponentType;

/// A decoded buffer slice, typed by the accessor's component type.
///
/// Holds raw component values; element grouping (vec2/vec3/...) is tracked by
/// the accessor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

impl TypedBuffer {
    /// Number of components in the buffer.
    pub fn len(&self) -> usize {
        match self {
            TypedBuffer::I8(v) => v.len(),
            TypedBuffer::U8(v) => v.len(),
            TypedBuffer::I16(v) => v.len(),
            TypedBuffer::U16(v) => v.len(),
            TypedBuffer::U32(v) => v.len(),
            TypedBuffer::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            TypedBuffer::I8(_) => ComponentType::I8,
            TypedBuffer::U8(_) => ComponentType::U8,
            TypedBuffer::I16(_) => ComponentType::I16,
            TypedBuffer::U16(_) => ComponentType::U16,
            TypedBuffer::U32(_) => ComponentType::U32,
            TypedBuffer::F32(_) => ComponentType::F32,
        }
    }

    /// Zero-filled buffer of the given component type and length.
    pub fn zeroed(component_type: ComponentType, len: usize) -> Self {
        match component_type {
            ComponentType::I8 => TypedBuffer::I8(vec![0; len]),
            ComponentType::U8 => TypedBuffer::U8(vec![0; len]),
            ComponentType::I16 => TypedBuffer::I16(vec![0; len]),
            ComponentType::U16 => TypedBuffer::U16(vec![0; len]),
            ComponentType::U32 => TypedBuffer::U32(vec![0; len]),
            ComponentType::F32 => TypedBuffer::F32(vec![0.0; len]),
        }
    }

    /// Re-gather elements of `arity` components each by index, discarding
    /// sharing: the output holds `indices.len()` elements in index order.
    pub fn gather(&self, indices: &[u32], arity: usize) -> Self {
        fn gather_in<T: Copy + Default>(src: &[T], indices: &[u32], arity: usize) -> Vec<T> {
            let mut out = vec![T::default(); indices.len() * arity];
            for (slot, &index) in indices.iter().enumerate() {
                let src_base = index as usize * arity;
                let dst_base = slot * arity;
                for k in 0..arity {
                    if let Some(&value) = src.get(src_base + k) {
                        out[dst_base + k] = value;
                    }
                }
            }
            out
        }

        match self {
            TypedBuffer::I8(v) => TypedBuffer::I8(gather_in(v, indices, arity)),
            TypedBuffer::U8(v) => TypedBuffer::U8(gather_in(v, indices, arity)),
            TypedBuffer::I16(v) => TypedBuffer::I16(gather_in(v, indices, arity)),
            TypedBuffer::U16(v) => TypedBuffer::U16(gather_in(v, indices, arity)),
            TypedBuffer::U32(v) => TypedBuffer::U32(gather_in(v, indices, arity)),
            TypedBuffer::F32(v) => TypedBuffer::F32(gather_in(v, indices, arity)),
        }
    }

    /// View the components as `f32` when the buffer holds floats.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            TypedBuffer::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Widen an integer index buffer to `u32` values. Float buffers are not
    /// valid index sources.
    pub fn to_index_vec(&self) -> Option<Vec<u32>> {
        match self {
            TypedBuffer::U8(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
            TypedBuffer::U16(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
            TypedBuffer::U32(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// All components converted to `f32`, for uniform-style consumers.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            TypedBuffer::I8(v) => v.iter().map(|&x| f32::from(x)).collect(),
            TypedBuffer::U8(v) => v.iter().map(|&x| f32::from(x)).collect(),
            TypedBuffer::I16(v) => v.iter().map(|&x| f32::from(x)).collect(),
            TypedBuffer::U16(v) => v.iter().map(|&x| f32::from(x)).collect(),
            TypedBuffer::U32(v) => v.iter().map(|&x| x as f32).collect(),
            TypedBuffer::F32(v) => v.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_duplicates_shared_elements() {
        // Two triangles sharing an edge over four vec2 elements.
        let src = TypedBuffer::F32(vec![0.0, 0.1, 1.0, 1.1, 2.0, 2.1, 3.0, 3.1]);
        let out = src.gather(&[0, 1, 2, 2, 1, 3], 2);
        assert_eq!(out.len(), 12);
        let floats = out.as_f32().unwrap();
        assert_eq!(&floats[0..2], &[0.0, 0.1]);
        assert_eq!(&floats[4..6], &[2.0, 2.1]);
        // slot 3 repeats element 2
        assert_eq!(&floats[6..8], &[2.0, 2.1]);
    }

    #[test]
    fn index_widening() {
        let idx = TypedBuffer::U16(vec![0, 1, 2]);
        assert_eq!(idx.to_index_vec().unwrap(), vec![0, 1, 2]);
        assert!(TypedBuffer::F32(vec![0.0]).to_index_vec().is_none());
    }

    #[test]
    fn zeroed_matches_type() {
        let z = TypedBuffer::zeroed(ComponentType::U16, 4);
        assert_eq!(z.component_type(), ComponentType::U16);
        assert_eq!(z.len(), 4);
    }
}
