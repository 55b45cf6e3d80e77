//! Library integration tests: variant resolution through the public API.

mod common;
mod packaging_tests;
mod priority_tests;
