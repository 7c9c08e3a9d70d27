use thiserror::Error;

use crate::metadata::token::{GroupToken, TypeToken};

macro_rules! declaration_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Declaration {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Declaration {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while building constraint
/// metadata, resolving validation group chains, and validating object graphs. Each variant
/// provides specific context about the failure mode to enable appropriate error handling.
///
/// Constraint violations are never errors — they are the data this engine produces. Only
/// contradictory declarations and malformed calls surface through this type.
///
/// # Error Categories
///
/// ## Declaration Errors
/// - [`Error::Declaration`] - Contradictory or unsatisfiable constraint declarations,
///   detected once while building a type's metadata
/// - [`Error::GroupDefinition`] - Invalid group or group sequence definitions (cycles,
///   duplicates, non-expandable default sequence redefinitions)
///
/// ## Call Errors
/// - [`Error::InvalidArgument`] - Malformed arguments at a validation entry point
/// - [`Error::Validation`] - A request the engine cannot honor, such as a class-like
///   marker used where an interface-like group is required
///
/// ## Registry Errors
/// - [`Error::TypeNotFound`] - Requested type was never registered
/// - [`Error::GroupNotFound`] - Requested group marker was never registered
///
/// # Examples
///
/// ```rust
/// use verdict::{Error, MetadataRegistry};
///
/// let registry = MetadataRegistry::new();
/// match registry.bean_metadata(verdict::metadata::token::TypeToken::new(42)) {
///     Ok(meta) => println!("constrained elements: {}", meta.all_meta_constraints().len()),
///     Err(Error::TypeNotFound(token)) => eprintln!("unknown type: {token}"),
///     Err(Error::Declaration { message, file, line }) => {
///         eprintln!("bad declaration: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Constraint declarations for a type are contradictory or unsatisfiable.
    ///
    /// This error is raised while aggregating a type's metadata — hierarchy consistency
    /// rule violations, a constraint kind with no validator for the declared value shape,
    /// malformed attribute bags. It is deterministic: rebuilding metadata for the same
    /// type fails identically. The error includes the source location where the problem
    /// was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the declaration problem
    /// * `file` - Source file in which the error was detected
    /// * `line` - Source line in which the error was detected
    #[error("Invalid constraint declaration - {file}:{line}: {message}")]
    Declaration {
        /// The message to be printed for the declaration error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A group or group sequence definition is invalid.
    ///
    /// Raised during group chain resolution or default-sequence validation: a sequence
    /// that transitively contains itself, the same group appearing twice with a gap in
    /// one expanded sequence, or a redefined default sequence that cannot be substituted
    /// for the `Default` group without reordering its surroundings.
    #[error("Invalid group definition - {0}")]
    GroupDefinition(String),

    /// A validation entry point was called with malformed arguments.
    ///
    /// Examples: an empty group list, a property name the target type does not declare,
    /// an executable signature that carries no metadata.
    #[error("{0}")]
    InvalidArgument(String),

    /// A request the engine cannot honor.
    ///
    /// Currently raised when a marker registered as class-like is passed where an
    /// interface-like validation group is required.
    #[error("{0}")]
    Validation(String),

    /// Failed to find a type in the registry.
    ///
    /// This error occurs when looking up a type by token that was never registered
    /// with the owning [`crate::MetadataRegistry`].
    ///
    /// The associated [`TypeToken`] identifies which type was not found.
    #[error("Failed to find type in registry - {0}")]
    TypeNotFound(TypeToken),

    /// Failed to find a group marker in the registry.
    ///
    /// This error occurs when resolving a group chain over a token that was never
    /// registered with the owning [`crate::MetadataRegistry`].
    ///
    /// The associated [`GroupToken`] identifies which group was not found.
    #[error("Failed to find group in registry - {0}")]
    GroupNotFound(GroupToken),
}
