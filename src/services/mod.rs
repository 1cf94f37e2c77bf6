//! Core logic shared by the tools.
//!
//! Everything here is a pure transformation over data fetched per call,
//! except the fan-out helpers in `aggregation`, which only read.

pub mod aggregation;
pub mod currency;
pub mod dates;
pub mod resolver;
