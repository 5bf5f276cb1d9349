//! Sync coordinator integration tests

mod convergence;
mod failures;
