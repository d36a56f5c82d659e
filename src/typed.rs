use crate::layout;
use crate::raw::RawVec;
use std::marker::PhantomData;

/// Monomorphized view over a [`RawVec`] for callers that know their element
/// type at compile time.
///
/// The buffer layout is the same one the type-erased handle uses; this
/// wrapper only fixes `element_size` to `size_of::<T>()` and converts byte
/// ranges to `T` references at the boundary. `T: Copy` keeps the underlying
/// move-as-opaque-bytes model sound: nothing stored in the buffer ever needs
/// a destructor.
///
/// Because elements start right after the header, `T` must not need stricter
/// alignment than the header itself; [`new`](TypedVec::new) checks this once.
pub struct TypedVec<T> where T: Copy {
    raw: RawVec,
    _items: PhantomData<T>,
}

impl<T> TypedVec<T> where T: Copy {
    pub fn new() -> TypedVec<T> {
        assert!(
            std::mem::align_of::<T>() <= layout::BUFFER_ALIGN,
            "element alignment exceeds buffer alignment"
        );
        TypedVec {
            raw: RawVec::init(std::mem::size_of::<T>()),
            _items: PhantomData,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.raw.size()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn reserve(&mut self, new_capacity: usize) {
        self.raw.reserve(new_capacity);
    }

    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink_to_fit();
    }

    pub fn push(&mut self, value: T) {
        self.raw.push_back(unsafe { layout::value_as_slice(&value) });
    }

    /// Removes and returns the last element, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        let value = *self.back()?;
        self.raw.pop_back();
        Some(value)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.raw.get(index).map(|bytes| unsafe { layout::slice_as_value_ref::<T>(bytes) })
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.raw
            .get_mut(index)
            .map(|bytes| unsafe { layout::slice_as_value_ref_mut::<T>(bytes) })
    }

    /// Overwrites the element at `index`. Unlike the type-erased handle, the
    /// typed surface checks the index and panics when out of range.
    pub fn set(&mut self, index: usize, value: T) {
        assert!(index < self.len(), "set at index {} past length {}", index, self.len());
        unsafe { self.raw.set(index, layout::value_as_slice(&value)) };
    }

    pub fn front(&self) -> Option<&T> {
        self.raw.front().map(|bytes| unsafe { layout::slice_as_value_ref::<T>(bytes) })
    }

    pub fn back(&self) -> Option<&T> {
        self.raw.back().map(|bytes| unsafe { layout::slice_as_value_ref::<T>(bytes) })
    }

    /// Inserts at `index`, shifting later elements forward. The typed surface
    /// checks the insertion point and panics past the end.
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(index <= self.len(), "insert at index {} past length {}", index, self.len());
        unsafe { self.raw.insert(index, layout::value_as_slice(&value)) };
    }

    /// Removes the element at `index`; out-of-range indexes are ignored, as
    /// on the type-erased handle.
    pub fn remove(&mut self, index: usize) {
        self.raw.remove(index);
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Grows with independent copies of `fill` or truncates from the back.
    /// Growing rebuilds the whole content from `fill`, see [`RawVec::resize`].
    pub fn resize(&mut self, new_size: usize, fill: T) {
        self.raw.resize(new_size, unsafe { layout::value_as_slice(&fill) });
    }

    /// Exchanges the underlying buffers of two vectors. O(1).
    pub fn swap(&mut self, other: &mut TypedVec<T>) {
        self.raw.swap(Some(&mut other.raw));
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe {
            std::slice::from_raw_parts(self.raw.element_region() as *const T, self.len())
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        unsafe { std::slice::from_raw_parts_mut(self.raw.element_region() as *mut T, len) }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> Default for TypedVec<T> where T: Copy {
    fn default() -> TypedVec<T> {
        TypedVec::new()
    }
}

impl<T> Clone for TypedVec<T> where T: Copy {
    fn clone(&self) -> TypedVec<T> {
        let mut raw = RawVec::null();
        self.raw.clone_into(&mut raw);
        TypedVec { raw, _items: PhantomData }
    }
}

impl<T> Drop for TypedVec<T> where T: Copy {
    fn drop(&mut self) {
        // The raw handle is never null inside a live wrapper.
        unsafe { self.raw.free() };
    }
}

impl<T> std::fmt::Debug for TypedVec<T> where T: Copy + std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> PartialEq for TypedVec<T> where T: Copy + PartialEq {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> Eq for TypedVec<T> where T: Copy + Eq {}
