//! vforge-lib: variant resolution and build orchestration for Android-style
//! application, library and test packages.
//!
//! - `config`: mergeable configuration layers and build types
//! - `source` / `dependency`: source roots and resolved library bundles
//! - `variant`: a `VariantPlan` answering every input question for one build
//! - `manifest`: package parsing, the merge tool seam, test manifests
//! - `orchestrator`: the `Builder` that drives the external toolchain
//! - `package`: assembling, deduplicating and signing the final archive
//! - `project`: `vforge.json` descriptors

pub mod config;
pub mod consts;
pub mod dependency;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod package;
pub mod platform;
pub mod process;
pub mod project;
pub mod sdk;
pub mod source;
pub mod util;
pub mod variant;
