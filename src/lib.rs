//! Growable contiguous array storage for elements of a runtime-chosen byte width.
//!
//! [`RawVec`] is the type-erased core: one heap allocation holding a small
//! metadata header followed by densely packed element bytes, every element
//! exactly `element_size` bytes wide. It is meant for callers that cannot pick
//! an element type at compile time (foreign interfaces, interpreters, column
//! stores). [`TypedVec`] is a thin monomorphized view over the same buffer
//! for callers that can.

#[macro_use]
mod logging;
mod layout;
mod raw;
mod typed;

pub use raw::RawVec;
pub use typed::TypedVec;
