//! Buffer layout: the metadata header and all raw offset arithmetic.
//!
//! Every unsafe address computation in the crate goes through this module so
//! the pointer math stays in one auditable place.

use std::alloc::Layout;

/// Metadata prefix at the start of every buffer allocation.
///
/// Field order and sizes are stable for the lifetime of a build; every
/// operation computes element offsets relative to this struct's size.
#[repr(C)]
pub(crate) struct Header {
    pub size: usize,
    pub capacity: usize,
    pub element_size: usize,
}

pub(crate) const HEADER_SIZE: usize = std::mem::size_of::<Header>();
pub(crate) const BUFFER_ALIGN: usize = std::mem::align_of::<Header>();

#[inline(always)]
pub(crate) unsafe fn header<'a>(ptr: *const u8) -> &'a Header {
    std::mem::transmute::<*const u8, &Header>(ptr)
}

#[inline(always)]
pub(crate) unsafe fn header_mut<'a>(ptr: *mut u8) -> &'a mut Header {
    std::mem::transmute::<*mut u8, &mut Header>(ptr)
}

/// Byte offset of element slot `index` from the start of the allocation.
#[inline(always)]
pub(crate) fn element_offset(index: usize, element_size: usize) -> usize {
    HEADER_SIZE + index * element_size
}

#[inline(always)]
pub(crate) unsafe fn element_ptr(ptr: *mut u8, index: usize, element_size: usize) -> *mut u8 {
    ptr.add(element_offset(index, element_size))
}

/// Total allocation length for a buffer with the given slot count.
///
/// Overflowing `usize` here is a fatal contract breach, the allocator could
/// never satisfy such a request anyway.
pub(crate) fn buffer_len(capacity: usize, element_size: usize) -> usize {
    capacity
        .checked_mul(element_size)
        .and_then(|bytes| bytes.checked_add(HEADER_SIZE))
        .expect("buffer byte length overflows usize")
}

pub(crate) fn buffer_layout(capacity: usize, element_size: usize) -> Layout {
    Layout::from_size_align(buffer_len(capacity, element_size), BUFFER_ALIGN)
        .expect("buffer layout")
}

#[inline(always)]
pub(crate) unsafe fn value_as_slice<T: Sized>(val: &T) -> &[u8] {
    let ptr_to_val = std::mem::transmute::<&T, *const u8>(val);
    std::slice::from_raw_parts(ptr_to_val, std::mem::size_of::<T>())
}

#[inline(always)]
pub(crate) unsafe fn slice_as_value_ref<T: Sized>(bytes: &[u8]) -> &T {
    std::mem::transmute::<*const u8, &T>(bytes.as_ptr())
}

#[inline(always)]
pub(crate) unsafe fn slice_as_value_ref_mut<T: Sized>(bytes: &mut [u8]) -> &mut T {
    std::mem::transmute::<*mut u8, &mut T>(bytes.as_mut_ptr())
}

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn header_is_three_words() {
        assert_eq!(HEADER_SIZE, 3 * std::mem::size_of::<usize>());
    }

    #[test]
    fn element_offsets_are_dense() {
        assert_eq!(element_offset(0, 4), HEADER_SIZE);
        assert_eq!(element_offset(1, 4), HEADER_SIZE + 4);
        assert_eq!(element_offset(7, 16), HEADER_SIZE + 112);
    }

    #[test]
    fn buffer_len_includes_header() {
        assert_eq!(buffer_len(0, 8), HEADER_SIZE);
        assert_eq!(buffer_len(3, 8), HEADER_SIZE + 24);
        assert_eq!(buffer_len(5, 0), HEADER_SIZE);
    }

    #[test]
    #[should_panic]
    fn buffer_len_overflow_is_fatal() {
        buffer_len(usize::MAX / 2, 4);
    }
}
