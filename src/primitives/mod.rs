//! Low-level text primitives shared by the searchers and the viewer.
//!
//! Everything here is a pure function or a small value type: line-offset
//! tables, offset/position conversion, incremental line-break counting,
//! and word boundary detection.

pub mod line_table;
pub mod word_boundary;
