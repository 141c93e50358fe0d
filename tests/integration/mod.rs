//! Integration test suite for flowpack
//!
//! End-to-end tests that run the flowpack binary against a temporary project
//! directory and a fake local Maven repository. No Java process is spawned;
//! tests that would reach the JVM either skip tests explicitly or assert the
//! failure before the launch.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! Tests are organized by functionality area:
//! - **commands**: CLI surface, list output and error reporting
//! - **lifecycle**: build, pack and deploy workflows

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod commands;
mod lifecycle;
