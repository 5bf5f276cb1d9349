//! Store integration tests
//!
//! Round-trips through real sources and the error kinds callers branch on.

mod errors;
mod round_trip;
