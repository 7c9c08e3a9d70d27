// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # verdict
//!
//! [![Crates.io](https://img.shields.io/crates/v/verdict.svg)](https://crates.io/crates/verdict)
//! [![Documentation](https://docs.rs/verdict/badge.svg)](https://docs.rs/verdict)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/verdict/blob/main/LICENSE)
//!
//! A constraint metadata model and group-ordered validation engine for object graphs.
//! `verdict` aggregates constraint declarations across type hierarchies into immutable,
//! cached metadata, resolves validation groups and sequences into ordered chains, and
//! walks bean graphs collecting constraint violations — including cascaded validation,
//! container element constraints, and method/constructor validation.
//!
//! ## Features
//!
//! - **🧩 Rich constraint model** - Shape-checked validator binding, constraint
//!   composition, per-element message and group overrides
//! - **🧬 Hierarchy aware** - Declarations aggregate across supertypes and interfaces,
//!   with consistency rules checked once at metadata build time
//! - **🔗 Groups and sequences** - Interface-like group inheritance, ordered sequences
//!   with short-circuiting, redefined per-type default group sequences
//! - **🌐 Graph traversal** - Cascaded validation over beans, lists, sets, and maps
//!   that terminates on cyclic graphs and validates each bean once per group
//! - **⚡ Concurrent metadata** - Lock-free caches with idempotent population, parallel
//!   warm-up of registered types
//! - **🧰 Extensible** - Custom constraint kinds are a trait impl and one registry call
//!
//! ## Quick Start
//!
//! Add `verdict` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! verdict = "0.1"
//! ```
//!
//! ### Declaring and validating
//!
//! ```rust
//! use std::sync::Arc;
//! use verdict::constraints::{self, not_null, size};
//! use verdict::prelude::*;
//!
//! // Types and their constraints are registered once, up front.
//! let registry = Arc::new(MetadataRegistry::new());
//! constraints::register_built_in(&registry)?;
//!
//! let person = registry.register_type(TypeDef::new("Person"))?;
//! registry.contribute(
//!     person,
//!     ConfigurationSource::Annotation,
//!     TypeConfiguration::new().with_property(
//!         ConstrainedProperty::field("name", ValueShape::Str)
//!             .with_constraint(not_null())
//!             .with_constraint(size(1, 80)),
//!     ),
//! )?;
//!
//! // Beans expose their values through a small trait.
//! struct Person {
//!     token: TypeToken,
//!     name: Option<String>,
//! }
//!
//! impl ValidatableBean for Person {
//!     fn type_token(&self) -> TypeToken {
//!         self.token
//!     }
//!
//!     fn property(&self, name: &str) -> Value {
//!         match name {
//!             "name" => self.name.as_deref().map_or(Value::Null, Value::from),
//!             _ => Value::Null,
//!         }
//!     }
//! }
//!
//! let validator = Validator::new(registry);
//! let nameless = BeanHandle::new(Person { token: person, name: None });
//! let violations = validator.validate(&nameless, &[])?;
//!
//! assert_eq!(violations.len(), 1);
//! let violation = violations.iter().next().unwrap();
//! assert_eq!(violation.path().to_string(), "name");
//! assert_eq!(violation.message(), "must not be null");
//! # Ok::<(), verdict::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `verdict` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Constraint declarations, aggregation, and the metadata registry
//! - [`groups`] - Validation groups, sequences, and chain resolution
//! - [`engine`] - The validator, property paths, and violation collection
//! - [`constraints`] - Built-in constraint kinds and their declaration constructors
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Metadata Model
//!
//! The [`MetadataRegistry`] is the central catalog. Configuration sources contribute
//! [`TypeConfiguration`]s — raw, per-type constraint declarations — and the registry
//! aggregates them on demand into immutable [`metadata::aggregated::BeanMetaData`],
//! cached per type:
//!
//! - **Declarations**: constraint kinds, attributes, composition, cascading marks,
//!   container element constraints, group conversions
//! - **Aggregation**: the full type hierarchy is merged, override rules are checked,
//!   and every declaration is bound to a shape-matched validator strategy
//! - **Caching**: metadata builds are idempotent and safe to race; every caller
//!   observes the same shared instance
//!
//! ### Validation Engine
//!
//! The [`Validator`] walks bean graphs according to resolved group chains:
//!
//! - **Groups first**: every requested group runs before any sequence begins
//! - **Sequences short-circuit**: a failing member stops the members after it
//! - **Cascades terminate**: each bean is validated once per group, so cyclic
//!   graphs finish
//! - **Executables**: method and constructor parameter lists, cross-parameter
//!   constraints, and return values validate through the same engine
//!
//! ## Validation Model
//!
//! The semantics — groups, sequences, cascaded validation, constraint composition,
//! declaration-time consistency rules — follow the
//! [Jakarta Bean Validation specification](https://jakarta.ee/specifications/bean-validation/3.0/)
//! adapted to a dynamically shaped value model: beans expose [`Value`]s by property
//! name, and declared [`ValueShape`]s select which validator strategy runs.
//!
//! ## Performance
//!
//! `verdict` is designed for concurrent, read-heavy workloads:
//!
//! - **Lock-free metadata caches** - Aggregated metadata is built once per type and
//!   shared; concurrent builders race idempotently instead of blocking
//! - **Parallel warm-up** - [`MetadataRegistry::bootstrap`] aggregates all registered
//!   types across a thread pool
//! - **Cheap validation state** - Group chains and paths are small owned values;
//!   traversal allocates per violation, not per visited element
//!
//! ## Error Handling
//!
//! Constraint violations are data, not errors. The [`Result`] type covers genuinely
//! broken configuration and malformed calls:
//!
//! ```rust
//! use verdict::{Error, MetadataRegistry, TypeToken};
//!
//! let registry = MetadataRegistry::new();
//! match registry.bean_metadata(TypeToken::new(7)) {
//!     Ok(meta) => println!("constrained: {}", meta.is_constrained()),
//!     Err(Error::TypeNotFound(token)) => println!("never registered: {token}"),
//!     Err(Error::Declaration { message, .. }) => println!("bad declaration: {message}"),
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```
//!
//! ## Testing
//!
//! The test suite exercises metadata aggregation, group resolution, and graph
//! traversal, including cyclic graphs and concurrent registry access:
//!
//! ```bash
//! cargo test
//! cargo bench  # Criterion benchmarks for metadata builds and validation
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod value;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the verdict library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use verdict::prelude::*;
///
/// let registry = MetadataRegistry::new();
/// let token = registry.register_type(TypeDef::new("Order"))?;
/// assert!(registry.bean_metadata(token).is_ok());
/// # Ok::<(), verdict::Error>(())
/// ```
pub mod prelude;

/// Built-in constraint kinds and typed declaration constructors.
///
/// Ships the general-purpose constraints (`NotNull`, `Size`, `Min`, `Max`,
/// `NotBlank`, `AssertTrue`) as validator strategies plus [`ConstraintDef`]
/// constructors, installed through [`constraints::register_built_in`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use verdict::{constraints, MetadataRegistry};
///
/// let registry = Arc::new(MetadataRegistry::new());
/// constraints::register_built_in(&registry)?;
/// # Ok::<(), verdict::Error>(())
/// ```
pub mod constraints;

/// The validation engine: graph traversal, property paths, violations.
///
/// This module drives actual validation. Given aggregated metadata and a resolved
/// group chain it walks a bean graph, evaluates constraints, and collects
/// [`ConstraintViolation`]s into a [`ViolationSet`]. It includes:
///
/// - **Entry points**: whole-bean, single-property, free-value, and executable
///   validation on [`Validator`]
/// - **Traversal**: cascaded validation over beans and containers with cycle
///   termination
/// - **Paths**: structured [`Path`]s from the root bean to each validated value
///
/// # Key Types
///
/// - [`engine::Validator`] - Validation entry points over a shared registry
/// - [`engine::ValidationOptions`] - Fail-fast versus collecting behavior
/// - [`engine::ViolationSet`] - The violations of one validation call
/// - [`engine::Path`] - Property path to a validated value
pub mod engine;

/// Validation groups, sequences, and group chain resolution.
///
/// Implements the group model: interface-like group markers with inheritance,
/// ordered group sequences with cycle detection, and the resolver that expands
/// requested groups into an ordered [`GroupChain`].
///
/// # Key Types
///
/// - [`groups::Group`] - A resolved group, possibly a sequence member
/// - [`groups::Sequence`] - An expanded, ordered group sequence
/// - [`groups::GroupChain`] - Standalone groups plus sequences, in evaluation order
/// - [`groups::GroupChainResolver`] - Expands requested group tokens into a chain
pub mod groups;

/// Constraint declarations, aggregation, and the metadata registry.
///
/// Everything that happens before validation lives here: declaring constraint
/// kinds and their validator strategies, contributing per-type configuration,
/// and aggregating raw declarations across type hierarchies into cached,
/// immutable metadata.
///
/// # Key Components
///
/// ## Registry
/// - [`MetadataRegistry`] - Types, groups, constraint kinds, and the metadata cache
/// - [`metadata::registry::TypeDef`] - Hierarchy declaration for a registered type
///
/// ## Declaration
/// - [`metadata::descriptor`] - Constraint kinds, attribute bags, validator binding
/// - [`metadata::raw`] - Raw per-type configuration before aggregation
/// - [`metadata::shape`] - Declared value shapes and shape sets
///
/// ## Aggregation
/// - [`metadata::aggregated`] - Immutable per-type metadata views
/// - [`metadata::location`] - Constraint locations and bound descriptors
/// - [`metadata::token`] - Type and group tokens
pub mod metadata;

/// `verdict` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
///
/// # Examples
///
/// ```rust
/// use verdict::{MetadataRegistry, Result, TypeToken};
///
/// fn constrained(registry: &MetadataRegistry, token: TypeToken) -> Result<bool> {
///     Ok(registry.bean_metadata(token)?.is_constrained())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `verdict` Error type
///
/// The main error type for all operations in this crate. Provides detailed error
/// information for constraint declaration problems, group definition problems, and
/// malformed validation calls. Constraint violations are not errors; they are
/// returned as [`ViolationSet`]s.
///
/// # Examples
///
/// ```rust
/// use verdict::{Error, MetadataRegistry, TypeToken};
///
/// match MetadataRegistry::new().bean_metadata(TypeToken::new(1)) {
///     Ok(_) => println!("metadata built"),
///     Err(Error::TypeNotFound(token)) => println!("unknown type: {token}"),
///     Err(e) => println!("error: {e}"),
/// }
/// ```
pub use error::Error;

/// Main entry points for validating bean graphs.
///
/// See [`engine::validator::Validator`] for whole-bean, property, value, and
/// executable validation over a shared [`MetadataRegistry`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use verdict::{MetadataRegistry, ValidationOptions, Validator};
///
/// let registry = Arc::new(MetadataRegistry::new());
/// let validator = Validator::with_options(registry, ValidationOptions::fail_fast());
/// ```
pub use engine::validator::{ValidationOptions, Validator};

/// Validation results: individual violations and the set of a validation call.
///
/// [`ConstraintViolation`] carries the violated descriptor, the property path, the
/// failing value, and the group under which evaluation ran. [`Path`] and
/// [`PathNode`] describe where in the graph the value lives.
pub use engine::{ConstraintViolation, Path, PathNode, ViolationSet};

/// Dynamically shaped values and the bean abstraction.
///
/// Beans implement [`ValidatableBean`] to expose property values as [`Value`]s;
/// [`BeanHandle`] is the shared, identity-comparable handle the engine traverses.
pub use value::{BeanHandle, ValidatableBean, Value};

/// The metadata registry and type hierarchy declarations.
///
/// [`MetadataRegistry`] owns constraint kinds, registered types and groups, raw
/// configuration, and the aggregated metadata cache.
///
/// # Example
///
/// ```rust
/// use verdict::{MetadataRegistry, TypeDef};
///
/// let registry = MetadataRegistry::new();
/// let base = registry.register_type(TypeDef::new("Base"))?;
/// let derived = registry.register_type(TypeDef::new("Derived").with_supertype(base))?;
/// # let _ = derived;
/// # Ok::<(), verdict::Error>(())
/// ```
pub use metadata::registry::{MetadataRegistry, TypeDef};

/// Tokens identifying registered types and groups.
pub use metadata::token::{GroupToken, TypeToken};

/// Declared value shapes and the shape sets validator strategies accept.
pub use metadata::shape::{ShapeSet, ValueShape};

/// The constraint declaration surface.
///
/// [`ConstraintKindDef`] registers a kind with its validator strategies;
/// [`ConstraintDef`] declares a use of a kind with attributes, groups, and
/// composition; [`ConstraintValidator`] is the strategy trait custom kinds
/// implement.
pub use metadata::descriptor::{
    AttributeBag, AttributeValue, ConstraintDef, ConstraintKindDef, ConstraintValidator,
};

/// Raw per-type configuration contributed by configuration sources.
pub use metadata::raw::{
    ConfigurationSource, ConstrainedContainerElement, ConstrainedExecutable, ConstrainedParameter,
    ConstrainedProperty, ContainerSlot, DefaultSequenceMember, TypeConfiguration,
};

/// Validation groups, sequences, and the chain resolver.
pub use groups::{Group, GroupChain, GroupChainResolver, Sequence};
