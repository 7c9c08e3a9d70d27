//! Raw, per-source constraint declarations.
//!
//! Everything in this module is input: the shape in which configuration contributors
//! (annotation-equivalent scanners, XML mappings, the programmatic API) hand
//! declarations to the registry, before any hierarchy walking, merging or validator
//! resolution has happened. The aggregated model built from these lives in
//! [`crate::metadata::aggregated`].
//!
//! ## Structure
//!
//! - [`TypeConfiguration`] — one contribution: class-level constraints, constrained
//!   properties and executables, and an optional default-group-sequence redefinition
//!   for a single type.
//! - [`ConstrainedProperty`] / [`ConstrainedExecutable`] — the per-element raw
//!   declarations, in [`element`] and [`executable`].
//! - [`ConfigurationSource`] — where a contribution came from, with the fixed
//!   override precedence annotation < XML < API.

pub(crate) mod element;
pub(crate) mod executable;

pub use element::{
    CascadeDef, ConstrainedContainerElement, ConstrainedProperty, ContainerSlot,
    GroupConversionDef, PropertyKind,
};
pub use executable::{ConstrainedExecutable, ConstrainedParameter, ExecutableKind};

use strum::{Display, EnumCount, EnumIter};

use crate::metadata::descriptor::ConstraintDef;
use crate::metadata::token::GroupToken;

/// Where a configuration contribution came from.
///
/// Sources form a fixed total order for override resolution: a higher-priority source
/// declaring a property replaces a lower-priority declaration of the same property on
/// the same type, while contributions from non-overriding sources merge additively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum ConfigurationSource {
    /// Annotation-equivalent declarations, lowest priority
    Annotation,
    /// XML-mapping-equivalent declarations
    Xml,
    /// Programmatic API declarations, highest priority
    Api,
}

impl ConfigurationSource {
    /// Override priority; higher wins
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self {
            ConfigurationSource::Annotation => 0,
            ConfigurationSource::Xml => 1,
            ConfigurationSource::Api => 2,
        }
    }
}

/// The kind tag of a constrainable structural location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum ConstrainedElementKind {
    /// Class-level constraint host
    Type,
    /// Instance field
    Field,
    /// Property getter
    Getter,
    /// Method
    Method,
    /// Constructor
    Constructor,
    /// Executable parameter
    Parameter,
    /// Executable return value
    ReturnValue,
    /// Whole-argument-list constraint host
    CrossParameter,
    /// Generic container element
    TypeArgument,
}

/// One entry of a redefined default group sequence.
///
/// A redefinition lists group markers plus exactly one reference to the redefining
/// type itself; validation replaces that reference with the `Default` group in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSequenceMember {
    /// A group marker
    Group(GroupToken),
    /// The redefining type itself, substituted by `Default`
    SelfType,
}

/// One per-source configuration contribution for one type.
///
/// Contributions are additive within a source and subject to property-level override
/// across sources. A type may receive any number of contributions; the aggregator
/// collects them in source-priority order.
#[derive(Debug, Clone, Default)]
pub struct TypeConfiguration {
    class_constraints: Vec<ConstraintDef>,
    properties: Vec<ConstrainedProperty>,
    executables: Vec<ConstrainedExecutable>,
    default_group_sequence: Option<Vec<DefaultSequenceMember>>,
}

impl TypeConfiguration {
    /// Starts an empty contribution
    #[must_use]
    pub fn new() -> Self {
        TypeConfiguration::default()
    }

    /// Adds a class-level constraint
    #[must_use]
    pub fn with_class_constraint(mut self, def: ConstraintDef) -> Self {
        self.class_constraints.push(def);
        self
    }

    /// Adds a constrained property declaration
    #[must_use]
    pub fn with_property(mut self, property: ConstrainedProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a constrained executable declaration
    #[must_use]
    pub fn with_executable(mut self, executable: ConstrainedExecutable) -> Self {
        self.executables.push(executable);
        self
    }

    /// Redefines the default group sequence for the configured type
    #[must_use]
    pub fn with_default_group_sequence(mut self, members: Vec<DefaultSequenceMember>) -> Self {
        self.default_group_sequence = Some(members);
        self
    }

    /// Class-level constraint declarations
    #[must_use]
    pub fn class_constraints(&self) -> &[ConstraintDef] {
        &self.class_constraints
    }

    /// Constrained property declarations
    #[must_use]
    pub fn properties(&self) -> &[ConstrainedProperty] {
        &self.properties
    }

    /// Constrained executable declarations
    #[must_use]
    pub fn executables(&self) -> &[ConstrainedExecutable] {
        &self.executables
    }

    /// The redefined default group sequence, if this contribution carries one
    #[must_use]
    pub fn default_group_sequence(&self) -> Option<&[DefaultSequenceMember]> {
        self.default_group_sequence.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_priority_order() {
        assert!(ConfigurationSource::Annotation.priority() < ConfigurationSource::Xml.priority());
        assert!(ConfigurationSource::Xml.priority() < ConfigurationSource::Api.priority());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ConfigurationSource::Annotation.to_string(), "Annotation");
        assert_eq!(ConfigurationSource::Api.to_string(), "Api");
    }

    #[test]
    fn test_configuration_accumulates() {
        let config = TypeConfiguration::new()
            .with_class_constraint(ConstraintDef::new("Coherent"))
            .with_property(ConstrainedProperty::field(
                "zipcode",
                crate::metadata::shape::ValueShape::Str,
            ))
            .with_default_group_sequence(vec![
                DefaultSequenceMember::SelfType,
                DefaultSequenceMember::Group(GroupToken::new(7)),
            ]);

        assert_eq!(config.class_constraints().len(), 1);
        assert_eq!(config.properties().len(), 1);
        assert!(config.executables().is_empty());
        assert_eq!(config.default_group_sequence().unwrap().len(), 2);
    }
}
