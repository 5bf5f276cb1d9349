//! Collection integration tests
//!
//! Merge properties exercised through the public API only.
