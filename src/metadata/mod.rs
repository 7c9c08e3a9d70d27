//! Constraint metadata model.
//!
//! This module contains the whole metadata side of the engine: how constraints,
//! properties, executables and type hierarchies are declared, merged and cached
//! before a single value is ever validated. Raw declarations flow in per source,
//! get aggregated once per type, and come out as the immutable model the
//! traversal in [`crate::engine`] walks.
//!
//! # Key Components
//!
//! - [`registry`] - The central [`MetadataRegistry`](registry::MetadataRegistry) everything hangs off
//! - [`raw`] - Per-source constraint declarations, the input format
//! - [`aggregated`] - Hierarchy-merged per-type metadata, the output format
//! - [`descriptor`] - Constraint kinds, attributes, composition and validator dispatch
//! - [`location`] - Structural constraint locations and the bound [`MetaConstraint`](location::MetaConstraint)
//! - [`token`] - Compact identifiers for types and groups
//! - [`shape`] - The value shape lattice driving validator selection
//!
//! # Examples
//!
//! ```rust
//! use verdict::metadata::descriptor::ConstraintDef;
//! use verdict::metadata::raw::{ConfigurationSource, ConstrainedProperty, TypeConfiguration};
//! use verdict::metadata::shape::ValueShape;
//! use verdict::{MetadataRegistry, TypeDef};
//!
//! let registry = MetadataRegistry::new();
//! verdict::constraints::register_built_in(&registry)?;
//!
//! let address = registry.register_type(TypeDef::new("Address"))?;
//! registry.contribute(
//!     address,
//!     ConfigurationSource::Annotation,
//!     TypeConfiguration::new().with_property(
//!         ConstrainedProperty::field("street", ValueShape::Str)
//!             .with_constraint(ConstraintDef::new("NotNull")),
//!     ),
//! )?;
//!
//! let meta = registry.bean_metadata(address)?;
//! assert_eq!(meta.all_meta_constraints().len(), 1);
//! # Ok::<(), verdict::Error>(())
//! ```

/// Hierarchy-merged, per-type constraint metadata
pub mod aggregated;
/// Constraint kind catalog, descriptors and validator dispatch
pub mod descriptor;
/// Type hierarchy linearization
pub(crate) mod hierarchy;
/// Structural constraint locations
pub mod location;
/// Raw per-source constraint declarations
pub mod raw;
/// The central metadata registry
pub mod registry;
/// Value shapes and shape sets
pub mod shape;
/// Compact type and group identifiers
pub mod token;
