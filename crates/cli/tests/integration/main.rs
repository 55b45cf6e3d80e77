//! CLI integration tests for vforge.

mod build_tests;
mod common;
mod plan_tests;
