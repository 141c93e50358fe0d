//! flowpack - package and deployment tool for Flowman projects
//!
//! flowpack reads a YAML deployment descriptor (`deployment.yml`) that
//! declares which Flowman release to bundle, which Flowman projects to ship,
//! and where the result should go. It then builds self-contained packages
//! (tarball distributions or single shaded jars), runs the projects' tests in
//! a spawned JVM, and copies the packed artifacts to their deployment
//! targets.
//!
//! # Architecture Overview
//!
//! Everything starts from the deployment descriptor:
//! - `flowman`, `build` and `execution` blocks hold descriptor-level
//!   settings; each package may override them, and the effective settings are
//!   produced by a fixed merge (lists concatenate, scalars override)
//! - `packages` declares buildable targets (`dist` tarballs, `fatjar` shaded
//!   jars), `deployments` declares where packed artifacts are published
//! - `${...}` references are interpolated before the tree is deserialized
//!
//! Framework artifacts (the Flowman distribution, tools jar and plugins) are
//! resolved by Maven coordinates against a local Maven-layout repository;
//! flowpack never downloads anything itself.
//!
//! # Core Modules
//!
//! - [`artifact`] - Maven coordinate parsing and repository path layout
//! - [`cli`] - Command-line interface with the lifecycle subcommands
//! - [`core`] - Error types and user-friendly error reporting
//! - [`descriptor`] - Deployment descriptor model, loading and lookup
//! - [`driver`] - Package/deployment lifecycle (build, test, pack, deploy)
//! - [`remotefs`] - Scheme-keyed file systems for deployment targets
//! - [`repo`] - Local Maven repository resolution
//! - [`utils`] - Shared helpers for files, archives and `key=value` settings
//!
//! # Descriptor Format (deployment.yml)
//!
//! ```yaml
//! flowman:
//!   version: 0.30.0
//!   plugins:
//!     - flowman-kafka
//!     - flowman-mariadb
//!
//! projects:
//!   - flows
//!
//! packages:
//!   dist:
//!     kind: dist
//!   uberjar:
//!     kind: fatjar
//!     build:
//!       dependencies:
//!         - org.postgresql:postgresql:42.5.0
//!
//! deployments:
//!   prod:
//!     kind: copy
//!     package: dist
//!     location: /srv/releases/flowman
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Build all packages declared in ./deployment.yml
//! flowpack build
//!
//! # Run the Flowman tests of one package
//! flowpack test --package dist
//!
//! # Build and pack, then publish the declared deployments
//! flowpack pack
//! flowpack deploy
//!
//! # Inspect the descriptor
//! flowpack list --format json
//! ```

pub mod artifact;
pub mod cli;
pub mod constants;
pub mod core;
pub mod descriptor;
pub mod driver;
pub mod remotefs;
pub mod repo;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
