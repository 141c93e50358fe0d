//! Unit test suite for flowpack
//!
//! Library-level tests that exercise workflows spanning several modules:
//! loading a descriptor through the full interpolation chain, and resolving
//! artifacts against a repository in Maven layout. These tests never spawn
//! the flowpack binary or a Java process.
//!
//! # Running Unit Tests
//!
//! ```bash
//! cargo test --test unit
//! ```

mod artifact_resolution;
mod descriptor_loading;
