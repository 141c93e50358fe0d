//! Core types shared across the flowpack codebase
//!
//! This module forms the foundation of flowpack's type system. Today that is
//! mostly error handling:
//! - **Strongly-typed errors** ([`FlowpackError`]) for precise error handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//! - **Automatic error conversion** from common standard library errors
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use flowpack_cli::core::{FlowpackError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     // Simulate an operation that might fail
//!     Err(FlowpackError::DescriptorNotFound {
//!         path: "deployment.yml".to_string(),
//!     }
//!     .into())
//! }
//!
//! fn handle_operation() {
//!     match example_operation() {
//!         Ok(result) => println!("Success: {}", result),
//!         Err(e) => {
//!             // Convert to user-friendly error and display
//!             let friendly = user_friendly_error(e);
//!             friendly.display(); // Shows colored error with suggestions
//!         }
//!     }
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, FlowpackError, IntoAnyhowWithContext, user_friendly_error};
