//! Error handling for flowpack
//!
//! This module provides the error types and user-friendly error reporting for
//! the flowpack deployment tool. The error system is designed around two core
//! principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`FlowpackError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! Flowpack errors are organized into several categories:
//! - **Descriptor**: [`FlowpackError::DescriptorNotFound`],
//!   [`FlowpackError::DescriptorParse`], [`FlowpackError::UnknownEntityKind`],
//!   [`FlowpackError::DuplicateEntity`], [`FlowpackError::MissingField`]
//! - **Lookup**: [`FlowpackError::PackageNotFound`],
//!   [`FlowpackError::DeploymentNotFound`], [`FlowpackError::ProjectNotFound`]
//! - **Coordinates**: [`FlowpackError::InvalidCoordinate`],
//!   [`FlowpackError::MissingVersion`]
//! - **External tools**: [`FlowpackError::JavaNotFound`],
//!   [`FlowpackError::JavaCommandFailed`], [`FlowpackError::ArtifactNotFound`]
//! - **File system**: [`FlowpackError::Io`], [`FlowpackError::FileError`]
//!
//! # Error Conversion and Context
//!
//! Common standard library errors are automatically converted:
//! - [`std::io::Error`] → [`FlowpackError::Io`]
//!
//! YAML parsing failures are mapped to [`FlowpackError::DescriptorParse`] at
//! the parse site, where the descriptor path is known.
//!
//! Use [`user_friendly_error`] to convert any error into a user-friendly
//! format with contextual suggestions.
//!
//! # Examples
//!
//! ## Basic Error Handling
//!
//! ```rust,no_run
//! use flowpack_cli::core::{FlowpackError, user_friendly_error};
//!
//! fn launch_flowman() -> Result<(), FlowpackError> {
//!     // Simulate a missing JVM
//!     Err(FlowpackError::JavaNotFound)
//! }
//!
//! match launch_flowman() {
//!     Ok(_) => println!("Success!"),
//!     Err(e) => {
//!         let ctx = user_friendly_error(anyhow::Error::from(e));
//!         ctx.display(); // Shows colored error with suggestions
//!     }
//! }
//! ```
//!
//! ## Creating Error Context Manually
//!
//! ```rust,no_run
//! use flowpack_cli::core::{FlowpackError, ErrorContext};
//!
//! let error = FlowpackError::DescriptorNotFound {
//!     path: "deployment.yml".to_string(),
//! };
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Create a deployment.yml in your project directory")
//!     .with_details("flowpack reads packages and deployments from a YAML descriptor");
//!
//! // Display with colors in terminal
//! context.display();
//!
//! // Or get as string for logging
//! let message = format!("{}", context);
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for flowpack operations
///
/// This enum represents all possible errors that can occur while resolving a
/// deployment descriptor and driving packages and deployments through their
/// lifecycle. Each variant is designed to provide specific context about the
/// failure and enable appropriate error handling strategies.
///
/// # Design Philosophy
///
/// - **Specific error types**: each variant represents a specific failure mode
/// - **Rich context**: errors include relevant details like file paths,
///   coordinates, and entity names
/// - **User-friendly**: error messages are written for end users, not just
///   developers
///
/// # Examples
///
/// ## Pattern Matching on Errors
///
/// ```rust,no_run
/// use flowpack_cli::core::FlowpackError;
///
/// fn handle_error(error: FlowpackError) {
///     match error {
///         FlowpackError::JavaNotFound => {
///             eprintln!("Please install a JDK to use flowpack");
///             std::process::exit(1);
///         }
///         FlowpackError::DescriptorNotFound { path } => {
///             eprintln!("No descriptor at {path}; pass -f to point at one");
///         }
///         _ => {
///             eprintln!("Unexpected error: {}", error);
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum FlowpackError {
    /// Deployment descriptor file not found
    ///
    /// This error occurs when the descriptor path (default `deployment.yml`
    /// in the current directory, or the value of `-f/--descriptor`) does not
    /// point at an existing file.
    #[error("Deployment descriptor not found: {path}")]
    DescriptorNotFound {
        /// Path that was checked for the descriptor
        path: String,
    },

    /// Deployment descriptor failed to parse
    ///
    /// This error occurs when the descriptor file is not valid YAML or does
    /// not match the expected descriptor structure.
    ///
    /// # Fields
    /// - `file`: Path to the descriptor that failed to parse
    /// - `reason`: Specific reason for the parsing failure
    #[error("Invalid deployment descriptor in {file}")]
    DescriptorParse {
        /// Path to the descriptor file that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// Entity declared with a kind that is not registered
    ///
    /// Packages support `dist` and `fatjar` (alias `jar`), deployments
    /// support `copy`. Anything else is rejected before the entity is
    /// decoded further.
    #[error("Unknown {entity} kind '{kind}' for '{name}'")]
    UnknownEntityKind {
        /// Entity category, "package" or "deployment"
        entity: String,
        /// Name of the entity carrying the unknown kind
        name: String,
        /// The kind string that is not registered
        kind: String,
    },

    /// Two entities of the same category share a name
    #[error("Duplicate {entity} '{name}' in deployment descriptor")]
    DuplicateEntity {
        /// Entity category, "package" or "deployment"
        entity: String,
        /// The name that appears more than once
        name: String,
    },

    /// A required descriptor field is missing or empty
    #[error("Missing field '{field}' in {entity}")]
    MissingField {
        /// Where the field was expected, e.g. "deployment descriptor"
        entity: String,
        /// Dotted path of the missing field, e.g. "flowman.version"
        field: String,
    },

    /// Deployment location uses a scheme with no registered file system
    #[error("Unsupported scheme '{scheme}' in location '{location}'")]
    UnknownScheme {
        /// The scheme that is not registered
        scheme: String,
        /// The full location string
        location: String,
    },

    /// Named package not declared in the descriptor
    #[error("Package '{name}' not found in deployment descriptor")]
    PackageNotFound {
        /// Name of the package that could not be found
        name: String,
    },

    /// Named deployment not declared in the descriptor
    #[error("Deployment '{name}' not found in deployment descriptor")]
    DeploymentNotFound {
        /// Name of the deployment that could not be found
        name: String,
    },

    /// Named project not listed in the descriptor
    #[error("Project '{name}' not found in deployment descriptor")]
    ProjectNotFound {
        /// Name of the project that could not be found
        name: String,
    },

    /// Artifact coordinates have an unsupported shape
    ///
    /// Coordinates must have two segments (`group:artifact`, only where a
    /// default version applies), three (`group:artifact:version`) or four
    /// (`group:artifact:classifier:version`).
    #[error("Unsupported artifact: {coords}")]
    InvalidCoordinate {
        /// The coordinate string that could not be parsed
        coords: String,
    },

    /// Coordinates omit the version and no default version applies
    #[error("Missing artifact version: {coords}")]
    MissingVersion {
        /// The coordinate string missing its version
        coords: String,
    },

    /// Artifact file not present in the local repository
    #[error("Artifact '{coords}' not found in local repository")]
    ArtifactNotFound {
        /// Coordinates of the missing artifact
        coords: String,
        /// Repository path that was searched
        path: String,
    },

    /// Java executable not found
    ///
    /// This error occurs when flowpack can locate neither `$JAVA_HOME/bin/java`
    /// nor a `java` executable on the PATH. All Flowman tools run in a
    /// separate Java process, so a JVM is required.
    #[error("Java executable not found in JAVA_HOME or PATH")]
    JavaNotFound,

    /// Java process exited with a non-zero status
    ///
    /// # Fields
    /// - `operation`: The operation the process was running (e.g. "test", "shell")
    /// - `code`: The exit code, or -1 when the process was killed by a signal
    #[error("Java process for {operation} exited with code {code}")]
    JavaCommandFailed {
        /// The operation the process was running
        operation: String,
        /// Exit code, -1 when terminated by a signal
        code: i32,
    },

    /// Java process exceeded the configured timeout
    #[error("Java process for {operation} timed out after {timeout_secs}s")]
    JavaCommandTimeout {
        /// The operation the process was running
        operation: String,
        /// Timeout that was exceeded, in seconds
        timeout_secs: u64,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File operation failed with path context
    #[error("File operation failed on {path}: {reason}")]
    FileError {
        /// Path the operation was acting on
        path: String,
        /// Reason for the failure
        reason: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for FlowpackError {
    fn clone(&self) -> Self {
        match self {
            Self::DescriptorNotFound {
                path,
            } => Self::DescriptorNotFound {
                path: path.clone(),
            },
            Self::DescriptorParse {
                file,
                reason,
            } => Self::DescriptorParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::UnknownEntityKind {
                entity,
                name,
                kind,
            } => Self::UnknownEntityKind {
                entity: entity.clone(),
                name: name.clone(),
                kind: kind.clone(),
            },
            Self::DuplicateEntity {
                entity,
                name,
            } => Self::DuplicateEntity {
                entity: entity.clone(),
                name: name.clone(),
            },
            Self::MissingField {
                entity,
                field,
            } => Self::MissingField {
                entity: entity.clone(),
                field: field.clone(),
            },
            Self::UnknownScheme {
                scheme,
                location,
            } => Self::UnknownScheme {
                scheme: scheme.clone(),
                location: location.clone(),
            },
            Self::PackageNotFound {
                name,
            } => Self::PackageNotFound {
                name: name.clone(),
            },
            Self::DeploymentNotFound {
                name,
            } => Self::DeploymentNotFound {
                name: name.clone(),
            },
            Self::ProjectNotFound {
                name,
            } => Self::ProjectNotFound {
                name: name.clone(),
            },
            Self::InvalidCoordinate {
                coords,
            } => Self::InvalidCoordinate {
                coords: coords.clone(),
            },
            Self::MissingVersion {
                coords,
            } => Self::MissingVersion {
                coords: coords.clone(),
            },
            Self::ArtifactNotFound {
                coords,
                path,
            } => Self::ArtifactNotFound {
                coords: coords.clone(),
                path: path.clone(),
            },
            Self::JavaNotFound => Self::JavaNotFound,
            Self::JavaCommandFailed {
                operation,
                code,
            } => Self::JavaCommandFailed {
                operation: operation.clone(),
                code: *code,
            },
            Self::JavaCommandTimeout {
                operation,
                timeout_secs,
            } => Self::JavaCommandTimeout {
                operation: operation.clone(),
                timeout_secs: *timeout_secs,
            },
            // io::Error does not implement Clone, convert to Other
            Self::Io(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::FileError {
                path,
                reason,
            } => Self::FileError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`FlowpackError`] and adds optional user-friendly
/// messages, suggestions for resolution, and additional details. This is the
/// primary way flowpack presents errors to CLI users.
///
/// # Display Format
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
///
/// # Examples
///
/// ```rust,no_run
/// use flowpack_cli::core::{FlowpackError, ErrorContext};
///
/// let context = ErrorContext::new(FlowpackError::JavaNotFound)
///     .with_suggestion("Install a JDK and set JAVA_HOME")
///     .with_details("Flowman tools run in a separate Java process");
///
/// // Display to terminal with colors
/// context.display();
///
/// // Or convert to string for logging
/// let message = context.to_string();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying flowpack error
    pub error: FlowpackError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`FlowpackError`]
    ///
    /// This creates a basic error context with no additional suggestions or
    /// details. Use the builder methods [`with_suggestion`] and
    /// [`with_details`] to add user-friendly information.
    ///
    /// [`with_suggestion`]: ErrorContext::with_suggestion
    /// [`with_details`]: ErrorContext::with_details
    #[must_use]
    pub const fn new(error: FlowpackError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps that users can take to resolve
    /// the error. They are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details provide context about why the error occurred or what it means.
    /// They are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// This method prints the error, details, and suggestion to stderr using
    /// color coding:
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }

    /// Create an [`ErrorContext`] with only a suggestion (no specific error)
    ///
    /// This is useful for generic errors where you want to provide a
    /// suggestion but don't have a specific [`FlowpackError`] variant.
    pub fn suggestion(suggestion: impl Into<String>) -> Self {
        Self {
            error: FlowpackError::Other {
                message: String::new(),
            },
            suggestion: Some(suggestion.into()),
            details: None,
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Extension trait for converting [`FlowpackError`] to [`anyhow::Error`] with context
///
/// This trait provides a method to convert flowpack-specific errors into
/// generic [`anyhow::Error`] instances while preserving user-friendly context
/// information.
pub trait IntoAnyhowWithContext {
    /// Convert the error to an [`anyhow::Error`] with the provided context
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error;
}

impl IntoAnyhowWithContext for FlowpackError {
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error {
        anyhow::Error::new(ErrorContext {
            error: self,
            suggestion: context.suggestion,
            details: context.details,
        })
    }
}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// This function is the main entry point for converting arbitrary errors into
/// user-friendly error messages for CLI display. It recognizes common error
/// types and provides appropriate context and suggestions.
///
/// # Error Recognition
///
/// The function recognizes and provides specific handling for:
/// - [`ErrorContext`] built at the failure site, passed through unchanged
/// - [`FlowpackError`] variants with tailored suggestions
/// - [`std::io::Error`] with filesystem-specific guidance
/// - [`serde_yaml::Error`] with YAML syntax help
/// - Generic errors with basic context
///
/// # Examples
///
/// ```rust,no_run
/// use flowpack_cli::core::{FlowpackError, user_friendly_error};
///
/// let error = FlowpackError::JavaNotFound;
/// let anyhow_error = anyhow::Error::from(error);
/// let context = user_friendly_error(anyhow_error);
///
/// context.display(); // Shows JDK installation suggestions
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // A context built at the failure site already carries the best suggestion
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    if let Some(fp_error) = error.downcast_ref::<FlowpackError>() {
        return create_error_context(fp_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(FlowpackError::FileError {
                    path: "unknown".to_string(),
                    reason: "permission denied".to_string(),
                })
                .with_suggestion("Check file ownership or run with sufficient permissions")
                .with_details(
                    "This error occurs when flowpack doesn't have permission to read or write files",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(FlowpackError::FileError {
                    path: "unknown".to_string(),
                    reason: "not found".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(
                    "This error occurs when a required file or directory cannot be found",
                );
            }
            std::io::ErrorKind::AlreadyExists => {
                return ErrorContext::new(FlowpackError::FileError {
                    path: "unknown".to_string(),
                    reason: "already exists".to_string(),
                })
                .with_suggestion("Remove the existing file or clean the build directory")
                .with_details("The target file or directory already exists");
            }
            _ => {}
        }
    }

    if let Some(yaml_error) = error.downcast_ref::<serde_yaml::Error>() {
        return ErrorContext::new(FlowpackError::DescriptorParse {
            file: "deployment.yml".to_string(),
            reason: yaml_error.to_string(),
        })
        .with_suggestion(
            "Check the YAML syntax in your deployment descriptor. Verify indentation, colons and quoting",
        )
        .with_details(
            "YAML parsing errors are usually caused by inconsistent indentation or unquoted special characters",
        );
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    // Append error chain if available
    let chain: Vec<String> = error
        .chain()
        .skip(1) // Skip the root cause which is already in to_string()
        .map(std::string::ToString::to_string)
        .collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(FlowpackError::Other {
        message,
    })
}

/// Create appropriate [`ErrorContext`] with suggestions for specific flowpack errors
///
/// This internal function maps each [`FlowpackError`] variant to an
/// appropriate [`ErrorContext`] with tailored suggestions and details. It's
/// used by [`user_friendly_error`] to provide consistent, helpful error
/// messages.
fn create_error_context(error: FlowpackError) -> ErrorContext {
    match &error {
        FlowpackError::JavaNotFound => ErrorContext::new(FlowpackError::JavaNotFound)
            .with_suggestion("Install a JDK (11 or later) and set JAVA_HOME, or make sure 'java' is on your PATH")
            .with_details("flowpack launches the Flowman tools in a separate Java process"),

        FlowpackError::JavaCommandFailed { operation, code } => {
            ErrorContext::new(FlowpackError::JavaCommandFailed {
                operation: operation.clone(),
                code: *code,
            })
            .with_suggestion("Re-run with -v to see the full java command line")
            .with_details("The Flowman process writes its own diagnostics to the output above")
        }

        FlowpackError::JavaCommandTimeout { operation, timeout_secs } => {
            ErrorContext::new(FlowpackError::JavaCommandTimeout {
                operation: operation.clone(),
                timeout_secs: *timeout_secs,
            })
            .with_suggestion("Increase --timeout or investigate why the Flowman process hangs")
            .with_details(format!(
                "The process was killed after {timeout_secs} seconds without completing"
            ))
        }

        FlowpackError::DescriptorNotFound { path } => {
            ErrorContext::new(FlowpackError::DescriptorNotFound {
                path: path.clone(),
            })
            .with_suggestion("Create a deployment.yml in your project directory, or pass -f/--descriptor with the path to your descriptor")
            .with_details("flowpack reads all packages and deployments from a single YAML deployment descriptor")
        }

        FlowpackError::DescriptorParse { file, reason } => {
            ErrorContext::new(FlowpackError::DescriptorParse {
                file: file.clone(),
                reason: reason.clone(),
            })
            .with_suggestion(format!(
                "Check the YAML syntax in {file}. Common issues: inconsistent indentation, missing colons, unquoted special characters"
            ))
            .with_details(reason.clone())
        }

        FlowpackError::UnknownEntityKind { entity, name, kind } => {
            ErrorContext::new(FlowpackError::UnknownEntityKind {
                entity: entity.clone(),
                name: name.clone(),
                kind: kind.clone(),
            })
            .with_suggestion(if entity == "package" {
                "Supported package kinds are 'dist' and 'fatjar'"
            } else {
                "Supported deployment kinds are 'copy'"
            })
            .with_details(format!(
                "The {entity} '{name}' declares kind '{kind}', which is not registered"
            ))
        }

        FlowpackError::PackageNotFound { name } => {
            ErrorContext::new(FlowpackError::PackageNotFound {
                name: name.clone(),
            })
            .with_suggestion("Run 'flowpack list' to see the packages defined in the descriptor")
        }

        FlowpackError::DeploymentNotFound { name } => {
            ErrorContext::new(FlowpackError::DeploymentNotFound {
                name: name.clone(),
            })
            .with_suggestion("Run 'flowpack list' to see the deployments defined in the descriptor")
        }

        FlowpackError::ProjectNotFound { name } => {
            ErrorContext::new(FlowpackError::ProjectNotFound {
                name: name.clone(),
            })
            .with_suggestion("Check the 'projects' list in the descriptor; projects are matched by directory basename")
        }

        FlowpackError::InvalidCoordinate { coords } => {
            ErrorContext::new(FlowpackError::InvalidCoordinate {
                coords: coords.clone(),
            })
            .with_suggestion("Use 'group:artifact:version' or 'group:artifact:classifier:version' coordinates")
        }

        FlowpackError::MissingVersion { coords } => {
            ErrorContext::new(FlowpackError::MissingVersion {
                coords: coords.clone(),
            })
            .with_suggestion("Add an explicit version to the coordinates, or set flowman.version in the descriptor")
        }

        FlowpackError::ArtifactNotFound { coords, path } => {
            ErrorContext::new(FlowpackError::ArtifactNotFound {
                coords: coords.clone(),
                path: path.clone(),
            })
            .with_suggestion("Install the artifact into the local repository (mvn install), or point --local-repository at a repository that contains it")
            .with_details(format!("Searched {path}"))
        }

        FlowpackError::UnknownScheme { scheme, location } => {
            ErrorContext::new(FlowpackError::UnknownScheme {
                scheme: scheme.clone(),
                location: location.clone(),
            })
            .with_suggestion("Use a plain path or a file:// URI as the deployment location")
            .with_details(format!("No file system is registered for scheme '{scheme}'"))
        }

        _ => ErrorContext::new(error.clone()),
    }
}
