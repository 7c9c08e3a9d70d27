//! Aggregated per-type metadata.
//!
//! One [`BeanMetaData`] per registered type: every raw contribution for every type
//! in the linearized hierarchy, folded into the immutable model the engine walks.
//! Building resolves source-priority override within each hierarchy type, collapses
//! declaration-equal inherited constraints, merges executables by signature, and
//! validates a redefined default group sequence up front.

use std::collections::BTreeMap;

use crate::metadata::aggregated::executable::{ExecutableMetaData, ExecutableMetaDataBuilder};
use crate::metadata::aggregated::property::{PropertyMetaData, PropertyMetaDataBuilder};
use crate::metadata::descriptor::{ConstraintDef, ConstraintDescriptor};
use crate::metadata::location::{merge_unique, ConstraintLocation, MetaConstraint};
use crate::metadata::raw::{
    ConstrainedExecutable, ConstrainedProperty, DefaultSequenceMember,
};
use crate::metadata::registry::MetadataRegistry;
use crate::metadata::shape::ValueShape;
use crate::metadata::token::{GroupToken, TypeToken};
use crate::{Error, Result};

/// The aggregated constraint metadata of one type.
///
/// Everything the engine needs to validate instances of the type: the merged
/// bean-hosted constraints, per-property and per-executable metadata, the class
/// hierarchy for the per-hosting-class default group walk, and the validated
/// default group sequence. Instances are immutable and shared behind an `Arc`
/// out of the registry cache.
#[derive(Debug)]
pub struct BeanMetaData {
    type_token: TypeToken,
    type_name: String,
    class_hierarchy: Vec<TypeToken>,
    class_constraints: Vec<MetaConstraint>,
    properties: Vec<PropertyMetaData>,
    executables: Vec<ExecutableMetaData>,
    all_meta_constraints: Vec<MetaConstraint>,
    direct_meta_constraints: Vec<MetaConstraint>,
    default_group_sequence: Vec<GroupToken>,
}

impl BeanMetaData {
    /// The token of the described type
    #[must_use]
    pub fn type_token(&self) -> TypeToken {
        self.type_token
    }

    /// The registered name of the described type
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The type and its superclasses, most derived first, interfaces excluded.
    ///
    /// This is the walk order for default-group validation, where each class in
    /// turn hosts its direct constraints under its own default group sequence.
    #[must_use]
    pub fn class_hierarchy(&self) -> &[TypeToken] {
        &self.class_hierarchy
    }

    /// Class-level constraints, merged across the hierarchy
    #[must_use]
    pub fn class_constraints(&self) -> &[MetaConstraint] {
        &self.class_constraints
    }

    /// Every bean-hosted constraint: class-level, property and container-element
    #[must_use]
    pub fn all_meta_constraints(&self) -> &[MetaConstraint] {
        &self.all_meta_constraints
    }

    /// The subset of [`BeanMetaData::all_meta_constraints`] declared on the type
    /// itself or one of the interfaces it implements directly.
    #[must_use]
    pub fn direct_meta_constraints(&self) -> &[MetaConstraint] {
        &self.direct_meta_constraints
    }

    /// Merged property metadata, in first-seen hierarchy order
    #[must_use]
    pub fn properties(&self) -> &[PropertyMetaData] {
        &self.properties
    }

    /// The merged metadata of one property, if anything declared it
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyMetaData> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Merged executable metadata, one entry per signature
    #[must_use]
    pub fn executables(&self) -> &[ExecutableMetaData] {
        &self.executables
    }

    /// The merged metadata of one executable signature, if anything declared it
    #[must_use]
    pub fn executable(&self, signature: &str) -> Option<&ExecutableMetaData> {
        self.executables.iter().find(|e| e.signature() == signature)
    }

    /// The validated default group sequence of this type.
    ///
    /// `[Default]` unless the type redefines it; a redefinition is stored fully
    /// expanded, with the type's own position substituted by `Default`.
    /// Redefinitions are not inherited: a supertype's sequence shows up on the
    /// supertype's own metadata and is honored during the per-class walk.
    #[must_use]
    pub fn default_group_sequence(&self) -> &[GroupToken] {
        &self.default_group_sequence
    }

    /// Returns true if this type redefines the default group sequence
    #[must_use]
    pub fn default_sequence_redefined(&self) -> bool {
        self.default_group_sequence.len() > 1
    }

    /// Returns true if any bean-hosted constraint exists
    #[must_use]
    pub fn has_constraints(&self) -> bool {
        !self.all_meta_constraints.is_empty()
    }

    /// Returns true if validating instances of this type can do anything at all
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.has_constraints()
            || self.properties.iter().any(PropertyMetaData::is_cascading)
            || self.executables.iter().any(ExecutableMetaData::is_constrained)
    }

    /// Builds the aggregate for `token` from the contributions recorded in the
    /// registry.
    ///
    /// The hierarchy is walked most derived type first; within each type the
    /// per-source override resolution runs before anything is merged, so a
    /// lower-priority source never leaks declarations past a higher-priority
    /// one for the same element.
    pub(crate) fn build(registry: &MetadataRegistry, token: TypeToken) -> Result<Self> {
        let type_name = registry
            .type_name(token)
            .ok_or(Error::TypeNotFound(token))?;
        let lineage = registry.lineage(token)?;
        let catalog = registry.catalog();
        let ids = registry.constraint_ids();

        let mut class_constraints: Vec<MetaConstraint> = Vec::new();
        let mut property_builders: Vec<PropertyMetaDataBuilder> = Vec::new();
        let mut executable_builders: Vec<(String, ExecutableMetaDataBuilder)> = Vec::new();
        let mut default_sequence: Option<Vec<DefaultSequenceMember>> = None;

        for hierarchy_type in &lineage {
            let view = TypeView::from_contributions(registry.contributions_for(*hierarchy_type));

            let mut built = Vec::new();
            for def in &view.class_constraints {
                let descriptor = ConstraintDescriptor::build(def, ValueShape::Bean, catalog, ids)?;
                built.push(MetaConstraint::new(
                    descriptor,
                    ConstraintLocation::Type,
                    *hierarchy_type,
                ));
            }
            merge_unique(&mut class_constraints, built);

            for declaration in &view.properties {
                let position = match property_builders
                    .iter()
                    .position(|b| b.name() == declaration.name())
                {
                    Some(position) => position,
                    None => {
                        property_builders.push(PropertyMetaDataBuilder::new(declaration.name()));
                        property_builders.len() - 1
                    }
                };
                fold_property(
                    &mut property_builders[position],
                    declaration,
                    *hierarchy_type,
                    registry,
                )?;
            }

            for declaration in view.executables {
                match executable_builders
                    .iter_mut()
                    .find(|(signature, _)| signature == declaration.signature())
                {
                    Some((_, builder)) => builder.add(*hierarchy_type, declaration),
                    None => executable_builders.push((
                        declaration.signature().to_string(),
                        ExecutableMetaDataBuilder::new(*hierarchy_type, declaration),
                    )),
                }
            }

            // A redefined default sequence binds only the type that declares it.
            if *hierarchy_type == token {
                default_sequence = view.default_sequence;
            }
        }

        let mut properties = Vec::with_capacity(property_builders.len());
        for builder in property_builders {
            properties.push(builder.build()?);
        }

        let mut executables = Vec::with_capacity(executable_builders.len());
        for (_, builder) in executable_builders {
            executables.push(builder.build(
                catalog,
                ids,
                |sub, sup| registry.is_strict_subtype(sub, sup),
                |t| registry.type_display(t),
            )?);
        }

        let default_group_sequence = match default_sequence {
            Some(members) => {
                let sequence = validate_default_sequence(registry, &type_name, &members)?;
                tracing::debug!(
                    bean = %type_name,
                    sequence = ?sequence,
                    "adopted redefined default group sequence"
                );
                sequence
            }
            None => vec![GroupToken::DEFAULT],
        };

        let mut all_meta_constraints = class_constraints.clone();
        for property in &properties {
            all_meta_constraints.extend_from_slice(property.constraints());
            all_meta_constraints.extend_from_slice(property.container_constraints());
        }

        let direct = registry.direct_types(token)?;
        let direct_meta_constraints = all_meta_constraints
            .iter()
            .filter(|constraint| direct.contains(&constraint.declaring_type()))
            .cloned()
            .collect();

        Ok(BeanMetaData {
            type_token: token,
            type_name,
            class_hierarchy: registry.class_hierarchy(token)?,
            class_constraints,
            properties,
            executables,
            all_meta_constraints,
            direct_meta_constraints,
            default_group_sequence,
        })
    }
}

/// Builds one property declaration's meta-constraints and folds them in.
fn fold_property(
    builder: &mut PropertyMetaDataBuilder,
    declaration: &ConstrainedProperty,
    declaring: TypeToken,
    registry: &MetadataRegistry,
) -> Result<()> {
    let catalog = registry.catalog();
    let ids = registry.constraint_ids();

    let mut constraints = Vec::new();
    for def in declaration.constraints() {
        let descriptor =
            ConstraintDescriptor::build(def, declaration.declared_shape(), catalog, ids)?;
        constraints.push(MetaConstraint::new(
            descriptor,
            ConstraintLocation::Property {
                name: declaration.name().to_string(),
                kind: declaration.kind(),
            },
            declaring,
        ));
    }

    let mut container_constraints = Vec::new();
    for element in declaration.cascade().container_elements() {
        for def in element.constraints() {
            let descriptor =
                ConstraintDescriptor::build(def, element.declared_shape(), catalog, ids)?;
            container_constraints.push(MetaConstraint::new(
                descriptor,
                ConstraintLocation::ContainerElement {
                    property: declaration.name().to_string(),
                    slot: element.slot(),
                },
                declaring,
            ));
        }
    }

    builder.merge(
        declaration.declared_shape(),
        constraints,
        container_constraints,
        declaration.cascade(),
    );
    Ok(())
}

/// Checks a raw redefinition and expands it into its final token list.
///
/// The redefining type's own position becomes `Default` in place; exactly the
/// rules the engine relies on later are enforced here, at build time, so a
/// broken redefinition never reaches a validation call.
fn validate_default_sequence(
    registry: &MetadataRegistry,
    type_name: &str,
    members: &[DefaultSequenceMember],
) -> Result<Vec<GroupToken>> {
    let mut sequence = Vec::with_capacity(members.len());
    let mut contains_self = false;

    for member in members {
        match member {
            DefaultSequenceMember::SelfType => {
                sequence.push(GroupToken::DEFAULT);
                contains_self = true;
            }
            DefaultSequenceMember::Group(token) if *token == GroupToken::DEFAULT => {
                return Err(Error::GroupDefinition(format!(
                    "the redefined default group sequence of '{type_name}' must name the \
                     redefining type, not the 'Default' group"
                )));
            }
            DefaultSequenceMember::Group(token) => sequence.push(*token),
        }
    }

    if !contains_self {
        return Err(Error::GroupDefinition(format!(
            "the redefined default group sequence of '{type_name}' must contain the \
             redefining type"
        )));
    }

    registry
        .group_resolver()
        .resolve_redefined_default_sequence(&sequence)
}

/// The per-source survivors of one hierarchy type's contributions.
///
/// Override runs per element: for each property name, executable signature, the
/// class-constraint set and the default sequence independently, the declarations
/// from the highest-priority source win. Equal-priority contributions merge
/// additively, later sequences replacing earlier ones.
#[derive(Default)]
struct TypeView {
    class_constraints: Vec<ConstraintDef>,
    class_priority: Option<u8>,
    properties: Vec<ConstrainedProperty>,
    executables: Vec<ConstrainedExecutable>,
    default_sequence: Option<Vec<DefaultSequenceMember>>,
}

impl TypeView {
    fn from_contributions(
        contributions: Vec<crate::metadata::registry::Contribution>,
    ) -> Self {
        let mut view = TypeView::default();
        let mut property_priorities: BTreeMap<String, u8> = BTreeMap::new();
        let mut executable_priorities: BTreeMap<String, u8> = BTreeMap::new();
        let mut sequence_priority: Option<u8> = None;

        for contribution in contributions {
            let priority = contribution.source.priority();
            let configuration = contribution.configuration;

            if !configuration.class_constraints().is_empty() {
                match view.class_priority {
                    Some(current) if priority < current => {}
                    Some(current) if priority == current => {
                        view.class_constraints
                            .extend_from_slice(configuration.class_constraints());
                    }
                    _ => {
                        view.class_constraints = configuration.class_constraints().to_vec();
                        view.class_priority = Some(priority);
                    }
                }
            }

            for property in configuration.properties() {
                match property_priorities.get(property.name()) {
                    Some(&current) if priority < current => {}
                    Some(&current) if priority == current => {
                        view.properties.push(property.clone());
                    }
                    _ => {
                        view.properties.retain(|p| p.name() != property.name());
                        view.properties.push(property.clone());
                        property_priorities.insert(property.name().to_string(), priority);
                    }
                }
            }

            for executable in configuration.executables() {
                match executable_priorities.get(executable.signature()) {
                    Some(&current) if priority < current => {}
                    Some(&current) if priority == current => {
                        view.executables.push(executable.clone());
                    }
                    _ => {
                        view.executables
                            .retain(|e| e.signature() != executable.signature());
                        view.executables.push(executable.clone());
                        executable_priorities
                            .insert(executable.signature().to_string(), priority);
                    }
                }
            }

            if let Some(members) = configuration.default_group_sequence() {
                match sequence_priority {
                    Some(current) if priority < current => {}
                    _ => {
                        view.default_sequence = Some(members.to_vec());
                        sequence_priority = Some(priority);
                    }
                }
            }
        }

        view
    }
}
