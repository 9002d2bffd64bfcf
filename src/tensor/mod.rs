//! Array types
//!
//! [`Array`] is the dense container every transform and decomposition
//! operates on; [`Dim4`] carries its four logical axis lengths.

mod array;
mod dims;

pub use array::Array;
pub use dims::{Dim4, MAX_DIMS};
