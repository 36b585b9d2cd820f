//! Leaf-task synthesis and resource reporting.
//!
//! The behavioral synthesizer is an external collaborator behind the
//! [`Synthesizer`] trait; [`ProcessSynthesizer`] runs it as a child process.
//! [`synthesize_all`] fans independent leaf jobs out over a bounded worker
//! pool and retries the one recognized flaky failure once. Leaf reports are
//! rolled up the hierarchy by [`aggregate_reports`].

#![warn(missing_docs)]

pub mod area;
pub mod error;
pub mod pool;
pub mod report;
pub mod synthesizer;

pub use area::{arbiter_area, async_mmap_area, estimate_overhead, fifo_area, relay_area, Area};
pub use error::{ExternalToolError, TRANSIENT_SIGNATURE};
pub use pool::{synthesize_all, synthesize_with_retry};
pub use report::{aggregate_reports, AreaReport, ChildUsage, Performance, TaskReport, REPORT_SCHEMA};
pub use synthesizer::{LeafArtifact, ProcessSynthesizer, SynthJob, Synthesizer};
