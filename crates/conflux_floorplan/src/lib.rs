//! Floorplan partitioning for conflux.
//!
//! A task's instances are placed into regions, either by a hand-authored
//! override or by an external solver fed a [`ConstraintList`]. Given that
//! placement and the directional hop chains between regions, [`partition`]
//! decides how many chained stages every FIFO needs and which region each
//! stage sits in. The longest chain bounds the task's register level from
//! below.

#![warn(missing_docs)]

pub mod assignment;
pub mod constraints;
pub mod plan;
pub mod region;
pub mod script;
pub mod solver;

pub use assignment::{Assignment, Placement};
pub use constraints::{check_colocation, ConstraintList, Edge, Vertex};
pub use plan::{partition, FifoPlan, Floorplan, PartitionPolicy};
pub use region::{Region, Topology};
pub use script::region_script;
pub use solver::{
    solve_or_fallback, OverrideSolver, ProcessSolver, RegionSolver, Solution, FALLBACK_REGION,
};
