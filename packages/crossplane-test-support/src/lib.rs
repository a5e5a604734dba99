//! Shared test utilities for the crossplane workspace.
//!
//! Kept free of any dependency on the `crossplane` crate itself so it can be
//! used from unit tests and integration tests alike without type duplication.

pub mod test_logging;
