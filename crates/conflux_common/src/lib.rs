//! Shared foundational types used across the conflux dataflow compiler.
//!
//! Content hashing, clock periods and bit-width arithmetic.

#![warn(missing_docs)]

pub mod bits;
pub mod clock;
pub mod hash;

pub use bits::{addr_width, bit_length, clog2};
pub use clock::{ClockPeriod, ParseClockPeriodError};
pub use hash::ContentHash;
