//! # verdict Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the verdict library. Import this module to get quick access to the essential
//! types for declaring constraints and validating bean graphs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all verdict operations
pub use crate::Error;

/// The result type used throughout verdict
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Validation entry points over a shared metadata registry
pub use crate::{ValidationOptions, Validator};

/// The central catalog of types, groups, constraint kinds, and cached metadata
pub use crate::metadata::registry::{MetadataRegistry, TypeDef};

// ================================================================================================
// Values and Beans
// ================================================================================================

/// Dynamically shaped property values and the traversable bean handle
pub use crate::value::{BeanHandle, ValidatableBean, Value};

/// Tokens identifying registered types and group markers
pub use crate::metadata::token::{GroupToken, TypeToken};

// ================================================================================================
// Violations and Paths
// ================================================================================================

/// Individual violations and the result set of one validation call
pub use crate::engine::violation::{ConstraintViolation, ViolationSet};

/// Structured property paths from the root bean to each validated value
pub use crate::engine::path::{Path, PathNode};

// ================================================================================================
// Constraint Declaration
// ================================================================================================

/// Constraint kind registration and per-use declarations
pub use crate::metadata::descriptor::{ConstraintDef, ConstraintKindDef};

/// The validator strategy trait and the attribute bags it is initialized from
pub use crate::metadata::descriptor::{AttributeBag, AttributeValue, ConstraintValidator};

/// Declared value shapes and the shape sets validator strategies accept
pub use crate::metadata::shape::{ShapeSet, ValueShape};

// ================================================================================================
// Type Configuration
// ================================================================================================

/// Per-type configuration contributed by a configuration source
pub use crate::metadata::raw::{ConfigurationSource, DefaultSequenceMember, TypeConfiguration};

/// Constrained properties, container elements, and cascading declarations
pub use crate::metadata::raw::{
    CascadeDef, ConstrainedContainerElement, ConstrainedProperty, ContainerSlot,
    GroupConversionDef, PropertyKind,
};

/// Constrained methods, constructors, and their parameters
pub use crate::metadata::raw::{ConstrainedExecutable, ConstrainedParameter, ExecutableKind};

// ================================================================================================
// Aggregated Metadata
// ================================================================================================

/// Immutable per-type metadata views built by the registry
pub use crate::metadata::aggregated::{
    BeanMetaData, CascadingMetaData, ContainerCascade, ExecutableMetaData, ParameterMetaData,
    PropertyMetaData,
};

/// Bound constraint descriptors and the locations they attach to
pub use crate::metadata::descriptor::ConstraintDescriptor;

/// Constraint locations within a type and location-bound constraints
pub use crate::metadata::location::{ConstraintLocation, MetaConstraint};

// ================================================================================================
// Groups
// ================================================================================================

/// Resolved groups, expanded sequences, and ordered group chains
pub use crate::groups::{Group, GroupChain, GroupChainResolver, Sequence};

// ================================================================================================
// Built-in Constraints
// ================================================================================================

/// Registration of the shipped constraint kinds
pub use crate::constraints::register_built_in;

/// Typed declaration constructors for the built-in kinds
pub use crate::constraints::{assert_true, max, min, not_blank, not_null, size};
