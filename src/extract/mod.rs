//! Entity extractors
//!
//! Pure functions that pull typed fields out of raw command transcripts.
//! Field extraction failures are independent; callers treat a failed
//! extraction as "insufficient data", never as a hard error.

pub mod expense;
pub mod money;
pub mod vehicle;
