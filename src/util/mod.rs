//! General utility code that didn't fit anywhere else
// (c) 2026 the xfer-engine developers

mod bitset;
pub(crate) use bitset::bit_set;

pub(crate) mod tracing;
pub use tracing::{TimeFormat, is_initialized as tracing_is_initialised, setup as setup_tracing};
