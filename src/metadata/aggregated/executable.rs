//! Aggregated executable metadata.
//!
//! All declarations of one executable signature across a type hierarchy merge
//! into a single [`ExecutableMetaData`]: parameters are merged by position,
//! cross-parameter and return constraints are unioned with inherited duplicates
//! collapsed, and return cascading markers from parallel branches fold into one.
//! The hierarchy consistency rules run before any merging, so an inconsistent
//! set of declarations never produces metadata.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicU32;

use crate::metadata::aggregated::cascading::CascadingMetaData;
use crate::metadata::aggregated::rules::assert_executable_hierarchy_rules;
use crate::metadata::descriptor::{ConstraintCatalog, ConstraintDescriptor};
use crate::metadata::location::{merge_unique, ConstraintLocation, MetaConstraint};
use crate::metadata::raw::{ConstrainedExecutable, ExecutableKind};
use crate::metadata::shape::ValueShape;
use crate::metadata::token::TypeToken;
use crate::Result;

/// The merged metadata of one executable parameter.
#[derive(Debug, Clone)]
pub struct ParameterMetaData {
    index: usize,
    name: String,
    declared_shape: ValueShape,
    constraints: Vec<MetaConstraint>,
    container_constraints: Vec<MetaConstraint>,
    cascading: CascadingMetaData,
}

impl ParameterMetaData {
    /// Zero-based position in the argument list
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The parameter name, used in violation paths
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared shape of the parameter value
    #[must_use]
    pub fn declared_shape(&self) -> ValueShape {
        self.declared_shape
    }

    /// Constraints on the parameter value itself
    #[must_use]
    pub fn constraints(&self) -> &[MetaConstraint] {
        &self.constraints
    }

    /// Per-element constraints on container content passed in this position
    #[must_use]
    pub fn container_constraints(&self) -> &[MetaConstraint] {
        &self.container_constraints
    }

    /// Merged cascading metadata
    #[must_use]
    pub fn cascading(&self) -> &CascadingMetaData {
        &self.cascading
    }

    /// Returns true if the parameter value or a container slot cascades
    #[must_use]
    pub fn is_cascading(&self) -> bool {
        self.cascading.requires_traversal()
    }

    /// Returns true if this parameter carries any constraint or cascading work
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
            || !self.container_constraints.is_empty()
            || self.cascading.requires_traversal()
    }
}

/// The merged metadata of one executable signature.
#[derive(Debug, Clone)]
pub struct ExecutableMetaData {
    kind: ExecutableKind,
    name: String,
    signature: String,
    parameters: Vec<ParameterMetaData>,
    cross_parameter_constraints: Vec<MetaConstraint>,
    return_shape: Option<ValueShape>,
    return_constraints: Vec<MetaConstraint>,
    return_container_constraints: Vec<MetaConstraint>,
    return_cascading: CascadingMetaData,
}

impl ExecutableMetaData {
    /// Method or constructor
    #[must_use]
    pub fn kind(&self) -> ExecutableKind {
        self.kind
    }

    /// The executable name, used as the first violation path node
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identity key this metadata was merged under
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Parameter metadata in position order; positions nothing declares are absent
    #[must_use]
    pub fn parameters(&self) -> &[ParameterMetaData] {
        &self.parameters
    }

    /// The metadata for one parameter position, if any declaration mentioned it
    #[must_use]
    pub fn parameter(&self, index: usize) -> Option<&ParameterMetaData> {
        self.parameters.iter().find(|p| p.index() == index)
    }

    /// Constraints over the whole argument list
    #[must_use]
    pub fn cross_parameter_constraints(&self) -> &[MetaConstraint] {
        &self.cross_parameter_constraints
    }

    /// Declared return shape; `None` for void
    #[must_use]
    pub fn return_shape(&self) -> Option<ValueShape> {
        self.return_shape
    }

    /// Constraints on the return value
    #[must_use]
    pub fn return_constraints(&self) -> &[MetaConstraint] {
        &self.return_constraints
    }

    /// Per-element constraints on returned container content
    #[must_use]
    pub fn return_container_constraints(&self) -> &[MetaConstraint] {
        &self.return_container_constraints
    }

    /// Merged cascading metadata for the return value
    #[must_use]
    pub fn return_cascading(&self) -> &CascadingMetaData {
        &self.return_cascading
    }

    /// Returns true if any parameter position or the argument list carries constraints
    #[must_use]
    pub fn has_parameter_constraints(&self) -> bool {
        !self.cross_parameter_constraints.is_empty()
            || self.parameters.iter().any(ParameterMetaData::is_constrained)
    }

    /// Returns true if the return value carries constraints or cascading work
    #[must_use]
    pub fn has_return_constraints(&self) -> bool {
        !self.return_constraints.is_empty()
            || !self.return_container_constraints.is_empty()
            || self.return_cascading.requires_traversal()
    }

    /// Returns true if validating this executable can do anything at all
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.has_parameter_constraints() || self.has_return_constraints()
    }
}

/// Accumulates the declarations of one signature while the bean builder walks
/// the hierarchy, then checks the consistency rules and merges.
#[derive(Debug)]
pub(crate) struct ExecutableMetaDataBuilder {
    declarations: Vec<(TypeToken, ConstrainedExecutable)>,
}

impl ExecutableMetaDataBuilder {
    pub(crate) fn new(declaring: TypeToken, executable: ConstrainedExecutable) -> Self {
        ExecutableMetaDataBuilder {
            declarations: vec![(declaring, executable)],
        }
    }

    pub(crate) fn add(&mut self, declaring: TypeToken, executable: ConstrainedExecutable) {
        self.declarations.push((declaring, executable));
    }

    /// Checks the hierarchy rules, then merges all declarations into one
    /// [`ExecutableMetaData`].
    ///
    /// Declarations must have been added most derived type first; first-seen
    /// values win wherever declarations disagree on incidental detail (names,
    /// shapes), and constraint dedup attributes survivors to the most derived
    /// declaration.
    pub(crate) fn build<S, N>(
        self,
        catalog: &ConstraintCatalog,
        ids: &AtomicU32,
        is_strict_subtype: S,
        type_name: N,
    ) -> Result<ExecutableMetaData>
    where
        S: Fn(TypeToken, TypeToken) -> bool,
        N: Fn(TypeToken) -> String,
    {
        assert_executable_hierarchy_rules(&self.declarations, is_strict_subtype, type_name)?;

        let (_, first) = &self.declarations[0];
        let kind = first.kind();
        let name = first.name().to_string();
        let signature = first.signature().to_string();
        let return_shape = self
            .declarations
            .iter()
            .find_map(|(_, executable)| executable.return_shape());

        let mut parameters: BTreeMap<usize, ParameterMetaData> = BTreeMap::new();
        let mut cross_parameter_constraints = Vec::new();
        let mut return_constraints = Vec::new();
        let mut return_container_constraints = Vec::new();
        let mut return_cascading = CascadingMetaData::default();

        for (declaring, executable) in &self.declarations {
            for raw in executable.parameters() {
                let parameter =
                    parameters
                        .entry(raw.index())
                        .or_insert_with(|| ParameterMetaData {
                            index: raw.index(),
                            name: raw.name().to_string(),
                            declared_shape: raw.declared_shape(),
                            constraints: Vec::new(),
                            container_constraints: Vec::new(),
                            cascading: CascadingMetaData::default(),
                        });

                let mut built = Vec::new();
                for def in raw.constraints() {
                    let descriptor =
                        ConstraintDescriptor::build(def, raw.declared_shape(), catalog, ids)?;
                    built.push(MetaConstraint::new(
                        descriptor,
                        ConstraintLocation::Parameter {
                            executable: name.clone(),
                            index: parameter.index,
                            name: parameter.name.clone(),
                        },
                        *declaring,
                    ));
                }
                merge_unique(&mut parameter.constraints, built);

                let mut built = Vec::new();
                for element in raw.cascade().container_elements() {
                    for def in element.constraints() {
                        let descriptor =
                            ConstraintDescriptor::build(def, element.declared_shape(), catalog, ids)?;
                        built.push(MetaConstraint::new(
                            descriptor,
                            ConstraintLocation::ParameterContainerElement {
                                executable: name.clone(),
                                index: parameter.index,
                                name: parameter.name.clone(),
                                slot: element.slot(),
                            },
                            *declaring,
                        ));
                    }
                }
                merge_unique(&mut parameter.container_constraints, built);

                parameter.cascading.merge_def(raw.cascade());
            }

            let mut built = Vec::new();
            for def in executable.cross_parameter_constraints() {
                // Cross-parameter validators see the whole argument list.
                let descriptor = ConstraintDescriptor::build(def, ValueShape::List, catalog, ids)?;
                built.push(MetaConstraint::new(
                    descriptor,
                    ConstraintLocation::CrossParameter {
                        executable: name.clone(),
                    },
                    *declaring,
                ));
            }
            merge_unique(&mut cross_parameter_constraints, built);

            if let Some(shape) = executable.return_shape() {
                let mut built = Vec::new();
                for def in executable.return_constraints() {
                    let descriptor = ConstraintDescriptor::build(def, shape, catalog, ids)?;
                    built.push(MetaConstraint::new(
                        descriptor,
                        ConstraintLocation::ReturnValue {
                            executable: name.clone(),
                        },
                        *declaring,
                    ));
                }
                merge_unique(&mut return_constraints, built);

                let mut built = Vec::new();
                for element in executable.return_cascade().container_elements() {
                    for def in element.constraints() {
                        let descriptor =
                            ConstraintDescriptor::build(def, element.declared_shape(), catalog, ids)?;
                        built.push(MetaConstraint::new(
                            descriptor,
                            ConstraintLocation::ReturnValueContainerElement {
                                executable: name.clone(),
                                slot: element.slot(),
                            },
                            *declaring,
                        ));
                    }
                }
                merge_unique(&mut return_container_constraints, built);
            }

            return_cascading.merge_def(executable.return_cascade());
        }

        for parameter in parameters.values() {
            parameter
                .cascading
                .validate(&format!("{}.{}", name, parameter.name))?;
        }
        return_cascading.validate(&format!("{name}.<return value>"))?;

        Ok(ExecutableMetaData {
            kind,
            name,
            signature,
            parameters: parameters.into_values().collect(),
            cross_parameter_constraints,
            return_shape,
            return_constraints,
            return_container_constraints,
            return_cascading,
        })
    }
}
