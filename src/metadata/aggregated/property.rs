use crate::metadata::aggregated::cascading::CascadingMetaData;
use crate::metadata::location::{merge_unique, MetaConstraint};
use crate::metadata::raw::CascadeDef;
use crate::metadata::shape::ValueShape;
use crate::Result;

/// The merged metadata of one logical property.
///
/// Field and getter declarations of the same name, from every configuration source
/// and every hierarchy type, collapse into one of these. Constraint lists keep
/// first-seen order (most derived type first) with declaration-equal inherited
/// duplicates removed.
#[derive(Debug, Clone)]
pub struct PropertyMetaData {
    name: String,
    declared_shape: ValueShape,
    constraints: Vec<MetaConstraint>,
    container_constraints: Vec<MetaConstraint>,
    cascading: CascadingMetaData,
}

impl PropertyMetaData {
    /// The property name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared shape of the property value
    #[must_use]
    pub fn declared_shape(&self) -> ValueShape {
        self.declared_shape
    }

    /// Constraints on the property value itself
    #[must_use]
    pub fn constraints(&self) -> &[MetaConstraint] {
        &self.constraints
    }

    /// Per-element constraints on container content held by this property
    #[must_use]
    pub fn container_constraints(&self) -> &[MetaConstraint] {
        &self.container_constraints
    }

    /// Merged cascading metadata
    #[must_use]
    pub fn cascading(&self) -> &CascadingMetaData {
        &self.cascading
    }

    /// Returns true if the property value or a container slot cascades
    #[must_use]
    pub fn is_cascading(&self) -> bool {
        self.cascading.requires_traversal()
    }

    /// Returns true if this property carries any constraint or cascading work
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
            || !self.container_constraints.is_empty()
            || self.cascading.requires_traversal()
    }
}

/// Accumulates declarations of one property while the bean builder walks the
/// hierarchy.
#[derive(Debug)]
pub(crate) struct PropertyMetaDataBuilder {
    name: String,
    declared_shape: Option<ValueShape>,
    constraints: Vec<MetaConstraint>,
    container_constraints: Vec<MetaConstraint>,
    cascading: CascadingMetaData,
}

impl PropertyMetaDataBuilder {
    pub(crate) fn new(name: &str) -> Self {
        PropertyMetaDataBuilder {
            name: name.to_string(),
            declared_shape: None,
            constraints: Vec::new(),
            container_constraints: Vec::new(),
            cascading: CascadingMetaData::default(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Folds one surviving raw declaration in.
    ///
    /// `constraints` and `container_constraints` are the declaration's already-built
    /// meta-constraints; declaration-equal entries already present are dropped, which
    /// collapses identical inherited declarations. The first-seen declared shape wins
    /// (most derived declaration first).
    pub(crate) fn merge(
        &mut self,
        declared_shape: ValueShape,
        constraints: Vec<MetaConstraint>,
        container_constraints: Vec<MetaConstraint>,
        cascade: &CascadeDef,
    ) {
        self.declared_shape.get_or_insert(declared_shape);
        merge_unique(&mut self.constraints, constraints);
        merge_unique(&mut self.container_constraints, container_constraints);
        self.cascading.merge_def(cascade);
    }

    pub(crate) fn build(self) -> Result<PropertyMetaData> {
        self.cascading.validate(&self.name)?;
        Ok(PropertyMetaData {
            declared_shape: self.declared_shape.unwrap_or(ValueShape::Bean),
            name: self.name,
            constraints: self.constraints,
            container_constraints: self.container_constraints,
            cascading: self.cascading,
        })
    }
}
