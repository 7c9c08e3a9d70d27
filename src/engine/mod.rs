//! The validation engine: traversal, paths, violations.
//!
//! Everything in [`crate::metadata`] is input to this module. A [`Validator`]
//! resolves requested groups through [`crate::groups`], walks bean graphs and
//! executable calls against the aggregated metadata, and collects
//! [`ConstraintViolation`]s addressed by [`Path`].
//!
//! # Key Components
//!
//! - [`validator`] - [`Validator`], the entry points and the traversal itself
//! - [`violation`] - [`ConstraintViolation`] and the deduplicating [`ViolationSet`]
//! - [`path`] - [`Path`] and [`PathNode`], the dotted addresses violations carry
//!
//! # Thread Safety
//!
//! A validator borrows nothing mutable: all traversal state lives in a per-call
//! context, so one validator instance may serve any number of threads.

pub(crate) mod context;
/// Property paths pointing from a root bean to a validated value
pub mod path;
/// Validation entry points and graph traversal
pub mod validator;
/// Constraint violations and violation sets
pub mod violation;

pub use path::{Path, PathNode};
pub use validator::{ValidationOptions, Validator};
pub use violation::{ConstraintViolation, ViolationSet};
