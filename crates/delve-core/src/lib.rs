//! **delve-core**: geometry primitives and grid storage shared by the
//! *delve* crates.
//!
//! [`Point`] and [`Range`] describe cells and rectangles in screen
//! coordinates (X grows right, Y grows down). [`Grid`] is a dense,
//! row-major arena of arbitrary cell values indexed by [`Point`].

pub mod geom;
pub mod grid;

pub use geom::{Point, Range, RangeIter};
pub use grid::Grid;
