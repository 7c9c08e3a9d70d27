//! Aggregated, hierarchy-merged constraint metadata.
//!
//! The raw per-source declarations from [`crate::metadata::raw`] become the immutable
//! per-type model here: one [`BeanMetaData`] per registered type, holding merged
//! [`PropertyMetaData`] and signature-keyed [`ExecutableMetaData`]. Merging walks the
//! linearized hierarchy, applies source-priority override within each type, collapses
//! declaration-equal inherited constraints, and enforces the executable hierarchy
//! consistency rules in [`rules`] — all at build time, exactly once per type.

pub(crate) mod bean;
pub(crate) mod cascading;
pub(crate) mod executable;
pub(crate) mod property;
pub(crate) mod rules;

pub use bean::BeanMetaData;
pub use cascading::{CascadingMetaData, ContainerCascade};
pub use executable::{ExecutableMetaData, ParameterMetaData};
pub use property::PropertyMetaData;
