use crate::layout;
use std::alloc::{alloc, dealloc, handle_alloc_error, realloc};

/// Handle to one type-erased buffer: a header followed by `capacity` element
/// slots of `element_size` bytes each, all in a single allocation.
///
/// The handle is a plain pointer to the start of the allocation. A null
/// handle (`RawVec::null()`) means "no buffer"; it is a valid argument only
/// where an operation documents it, everywhere else it is a contract breach
/// and the operation panics.
///
/// Elements are opaque byte ranges. The buffer never runs constructors or
/// destructors for them; callers that store values with drop obligations are
/// responsible for those themselves. References returned by [`get`],
/// [`front`] and [`back`] alias the buffer and are invalidated by any call
/// that reallocates or changes size, which the borrow checker enforces here.
///
/// [`get`]: RawVec::get
/// [`front`]: RawVec::front
/// [`back`]: RawVec::back
pub struct RawVec {
    ptr: *mut u8,
}

impl RawVec {
    /// The absent handle, used as a clone destination and swap partner.
    pub const fn null() -> RawVec {
        RawVec { ptr: std::ptr::null_mut() }
    }

    /// Allocates a fresh buffer holding zero elements of `element_size`
    /// bytes each. Capacity starts at zero; the first append allocates one
    /// slot and doubles from there.
    pub fn init(element_size: usize) -> RawVec {
        let layout = layout::buffer_layout(0, element_size);
        let ptr = unsafe { alloc(layout) };
        if ptr.is_null() {
            handle_alloc_error(layout);
        }
        unsafe {
            let header = layout::header_mut(ptr);
            header.size = 0;
            header.capacity = 0;
            header.element_size = element_size;
        }
        debug!("init buffer, element size {}", element_size);
        RawVec { ptr }
    }

    #[inline(always)]
    fn header(&self) -> &layout::Header {
        assert!(!self.ptr.is_null(), "null buffer handle");
        unsafe { layout::header(self.ptr) }
    }

    #[inline(always)]
    fn header_mut(&mut self) -> &mut layout::Header {
        assert!(!self.ptr.is_null(), "null buffer handle");
        unsafe { layout::header_mut(self.ptr) }
    }

    /// Returns `true` when this handle refers to no buffer.
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Number of logically present elements.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.header().size
    }

    /// Number of element slots currently allocated.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.header().capacity
    }

    /// Byte width of one element, fixed at [`init`](RawVec::init).
    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.header().element_size
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline(always)]
    fn set_size(&mut self, new_size: usize) {
        self.header_mut().size = new_size;
    }

    #[inline(always)]
    fn set_capacity(&mut self, new_capacity: usize) {
        self.header_mut().capacity = new_capacity;
    }

    /// Pointer to the first element slot. Valid even at capacity zero, where
    /// it is one-past-the-end of the header.
    #[inline(always)]
    pub(crate) fn element_region(&self) -> *mut u8 {
        assert!(!self.ptr.is_null(), "null buffer handle");
        unsafe { self.ptr.add(layout::HEADER_SIZE) }
    }

    fn compute_next_grow(capacity: usize) -> usize {
        if capacity != 0 {
            capacity << 1
        } else {
            1
        }
    }

    /// Reallocates so the element region holds exactly `new_capacity` slots,
    /// keeping the header and all stored bytes at their relative offsets.
    ///
    /// Allocation failure aborts via `handle_alloc_error`; there is no
    /// recoverable out-of-memory path.
    fn grow(&mut self, new_capacity: usize) {
        let element_size = self.element_size();
        let old_layout = layout::buffer_layout(self.capacity(), element_size);
        let new_len = layout::buffer_len(new_capacity, element_size);
        trace!("grow buffer {} -> {} slots", self.capacity(), new_capacity);
        let grown = unsafe { realloc(self.ptr, old_layout, new_len) };
        if grown.is_null() {
            handle_alloc_error(layout::buffer_layout(new_capacity, element_size));
        }
        self.ptr = grown;
        self.set_capacity(new_capacity);
    }

    /// Ensures capacity for at least `new_capacity` elements. Never shrinks.
    pub fn reserve(&mut self, new_capacity: usize) {
        if self.capacity() < new_capacity {
            self.grow(new_capacity);
        }
    }

    /// Reallocates capacity down to exactly the current size.
    ///
    /// The reallocation is issued even when capacity already equals size.
    pub fn shrink_to_fit(&mut self) {
        let size = self.size();
        debug!("shrink buffer to {} slots", size);
        self.grow(size);
    }

    /// Returns the element bytes at `index`, or `None` when `index >= size`.
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let header = self.header();
        if index >= header.size {
            return None;
        }
        unsafe {
            let first = layout::element_ptr(self.ptr, index, header.element_size);
            Some(std::slice::from_raw_parts(first, header.element_size))
        }
    }

    /// Mutable variant of [`get`](RawVec::get).
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let header = self.header();
        if index >= header.size {
            return None;
        }
        let element_size = header.element_size;
        unsafe {
            let first = layout::element_ptr(self.ptr, index, element_size);
            Some(std::slice::from_raw_parts_mut(first, element_size))
        }
    }

    /// Overwrites the element slot at `index` with `value`.
    ///
    /// Unlike [`get`](RawVec::get), this performs no bounds check on `index`
    /// in release builds; the checking asymmetry is part of the contract and
    /// callers may rely on the unchecked fast path.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`size`](RawVec::size).
    pub unsafe fn set(&mut self, index: usize, value: &[u8]) {
        let element_size = self.element_size();
        debug_assert!(index < self.size(), "set at index {} past size {}", index, self.size());
        assert_eq!(value.len(), element_size, "element byte width mismatch");
        let slot = layout::element_ptr(self.ptr, index, element_size);
        std::ptr::copy_nonoverlapping(value.as_ptr(), slot, element_size);
    }

    /// First element, or `None` when empty.
    pub fn front(&self) -> Option<&[u8]> {
        if self.size() > 0 {
            self.get(0)
        } else {
            None
        }
    }

    /// Last element, or `None` when empty.
    pub fn back(&self) -> Option<&[u8]> {
        let size = self.size();
        if size > 0 {
            self.get(size - 1)
        } else {
            None
        }
    }

    /// Appends a copy of `value`, doubling capacity when full. Amortized O(1).
    pub fn push_back(&mut self, value: &[u8]) {
        let capacity = self.capacity();
        if capacity <= self.size() {
            self.grow(Self::compute_next_grow(capacity));
        }
        let size = self.size();
        let element_size = self.element_size();
        assert_eq!(value.len(), element_size, "element byte width mismatch");
        unsafe {
            let slot = layout::element_ptr(self.ptr, size, element_size);
            std::ptr::copy_nonoverlapping(value.as_ptr(), slot, element_size);
        }
        self.set_size(size + 1);
    }

    /// Removes the last element by decrementing size.
    ///
    /// The vacated slot's bytes are left in place as trailing garbage until
    /// overwritten; no destructor runs. Panics when the buffer is empty.
    pub fn pop_back(&mut self) {
        let size = self.size();
        assert!(size > 0, "pop_back on empty buffer");
        self.set_size(size - 1);
    }

    /// Inserts a copy of `value` at `index`, shifting `[index, size)` one
    /// slot forward. `index == size` appends. O(size - index).
    ///
    /// # Safety
    ///
    /// `index` must be at most [`size`](RawVec::size). The insertion point is
    /// not bounds-checked in release builds.
    pub unsafe fn insert(&mut self, index: usize, value: &[u8]) {
        let capacity = self.capacity();
        if capacity <= self.size() {
            self.grow(Self::compute_next_grow(capacity));
        }
        let size = self.size();
        let element_size = self.element_size();
        debug_assert!(index <= size, "insert at index {} past size {}", index, size);
        assert_eq!(value.len(), element_size, "element byte width mismatch");
        if index < size {
            let first = layout::element_ptr(self.ptr, index, element_size);
            std::ptr::copy(first, first.add(element_size), (size - index) * element_size);
        }
        let slot = layout::element_ptr(self.ptr, index, element_size);
        std::ptr::copy_nonoverlapping(value.as_ptr(), slot, element_size);
        self.set_size(size + 1);
    }

    /// Removes the element at `index`, shifting later elements back one slot.
    ///
    /// A null handle or an out-of-range index is silently ignored; unlike
    /// [`insert`](RawVec::insert), this operation checks its bounds.
    pub fn remove(&mut self, index: usize) {
        if self.ptr.is_null() {
            return;
        }
        let size = self.size();
        if index >= size {
            return;
        }
        let new_size = size - 1;
        self.set_size(new_size);
        let element_size = self.element_size();
        unsafe {
            let hole = layout::element_ptr(self.ptr, index, element_size);
            std::ptr::copy(hole.add(element_size), hole, (new_size - index) * element_size);
        }
    }

    /// Drops all elements logically; capacity and allocation are kept.
    pub fn clear(&mut self) {
        self.set_size(0);
    }

    /// Resizes to `new_size` elements.
    ///
    /// Growing reserves capacity, resets size to zero and appends independent
    /// copies of `fill` until `new_size` is reached, so previously stored
    /// element bytes are overwritten by the fill value. Shrinking pops from
    /// the back until `new_size` is reached.
    pub fn resize(&mut self, new_size: usize, fill: &[u8]) {
        let old_size = self.size();
        if new_size > old_size {
            self.reserve(new_size);
            self.set_size(0);
            while self.size() < new_size {
                self.push_back(fill);
            }
        } else {
            while self.size() > new_size {
                self.pop_back();
            }
        }
    }

    /// Copies this buffer byte-for-byte into `dest`, unused capacity
    /// included. The result is fully independent of the source.
    ///
    /// Panics when `dest` already holds a buffer; cloning over a live handle
    /// would leak its allocation.
    pub fn clone_into(&self, dest: &mut RawVec) {
        assert!(dest.is_null(), "clone destination already holds a buffer");
        let capacity = self.capacity();
        let element_size = self.element_size();
        let len = layout::buffer_len(capacity, element_size);
        let layout = layout::buffer_layout(capacity, element_size);
        let ptr = unsafe { alloc(layout) };
        if ptr.is_null() {
            handle_alloc_error(layout);
        }
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr, ptr, len);
        }
        debug!("clone buffer, {} bytes", len);
        dest.ptr = ptr;
    }

    /// Exchanges which buffer each handle refers to. O(1), no element bytes
    /// move. A `None` partner degrades to a no-op.
    pub fn swap(&mut self, other: Option<&mut RawVec>) {
        assert!(!self.ptr.is_null(), "null buffer handle");
        if let Some(other) = other {
            std::mem::swap(&mut self.ptr, &mut other.ptr);
        }
    }

    /// Releases the whole allocation at once.
    ///
    /// # Safety
    ///
    /// The handle is left dangling, not nulled; the caller must not use it
    /// again for anything, including a second `free`.
    pub unsafe fn free(&mut self) {
        let layout = layout::buffer_layout(self.capacity(), self.element_size());
        debug!("free buffer, {} bytes", layout.size());
        dealloc(self.ptr, layout);
    }
}

impl std::fmt::Debug for RawVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return f.write_str("RawVec(null)");
        }
        f.debug_struct("RawVec")
            .field("size", &self.size())
            .field("capacity", &self.capacity())
            .field("element_size", &self.element_size())
            .finish()
    }
}
