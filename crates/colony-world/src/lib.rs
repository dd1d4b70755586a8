//! Colony engine.
//!
//! A square grid of bacteria that divide onto neighboring slots, pass a
//! mutating resistance trait to their daughters, and are culled by
//! antibiotic doses.

pub mod grid;
pub mod mutation;
pub mod colony;
pub mod stats;

pub use grid::Grid;
pub use mutation::Mutation;
pub use colony::Colony;
pub use stats::{ColonyStats, DoseReport, Snapshot};
