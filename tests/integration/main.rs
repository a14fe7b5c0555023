//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below exercises one part of the loop through the public API
//! with in-memory collaborators.  No hardware or console is needed.

mod fanout_tests;
mod mock_collaborators;
mod producer_tests;
