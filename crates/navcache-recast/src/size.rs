use std::mem::size_of;

/// Approximate memory footprint used for cache budget accounting.
///
/// The result is the inline size of the value plus everything it owns on the
/// heap. Capacity slack is not counted; only `len * size_of::<T>()`.
pub trait ByteSize {
    fn byte_size(&self) -> usize;
}

#[inline]
pub(crate) fn slice_bytes<T>(values: &[T]) -> usize {
    values.len() * size_of::<T>()
}

impl ByteSize for Vec<u8> {
    fn byte_size(&self) -> usize {
        size_of::<Self>() + self.len()
    }
}
