//! Structural assembly of upper tasks.
//!
//! Given the interfaces of its children, an upper task is rebuilt from
//! scratch: buffered interconnects become FIFOs (or relay chains when the
//! floorplan splits them), scalars and memory offsets are delayed by the
//! register level, memories get M-AXI plumbing with demultiplexers and
//! arbiters, and every child gets a handshake controller feeding the task's
//! own state machine.
//!
//! [`link`] drives this over the whole graph, leaves first, memoizing each
//! finished interface in an [`InterfaceTable`].

#![warn(missing_docs)]

pub mod error;
pub mod fifo;
pub mod interface;
pub mod link;
pub mod mmap;
pub mod naming;
pub mod upper;

pub use error::AssembleError;
pub use fifo::{emit_interconnect, FIFO_MODULE, RELAY_MODULE};
pub use interface::{handshake_ports, leaf_interface, ports_for};
pub use link::{link, InterfaceTable, LinkOptions, Linked};
pub use mmap::{arbiter_id_width, arbiter_module, ASYNC_MMAP_MODULE};
pub use naming::AsyncTag;
pub use upper::{assemble_upper, AssembleOptions};
