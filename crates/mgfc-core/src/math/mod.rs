//! Mathematical utilities
//!
//! SO(3) rotation conversions, hat/vee maps, and the manifold error
//! computations used by the geometric controllers.

pub mod rotation;

pub use rotation::*;
