use std::fmt;
use std::sync::Arc;

use crate::metadata::descriptor::ConstraintDescriptor;
use crate::metadata::raw::{ConstrainedElementKind, ContainerSlot, PropertyKind};
use crate::metadata::token::TypeToken;
use crate::value::{BeanHandle, Value};

/// The structural position a constraint is bound to.
///
/// Bean-hosted locations (`Type`, `Property`, `ContainerElement`) know how to pull
/// their value out of a bean instance; executable-hosted locations are fed by the
/// engine from the argument slice or return value of the call being validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintLocation {
    /// The bean itself (class-level constraint)
    Type,
    /// A named property, field- or getter-declared
    Property {
        /// Property name, also the path node name
        name: String,
        /// Which accessor declared it
        kind: PropertyKind,
    },
    /// Elements of a container held by a property
    ContainerElement {
        /// The container property's name
        property: String,
        /// Which container position
        slot: ContainerSlot,
    },
    /// One executable parameter
    Parameter {
        /// Executable name for the path root node
        executable: String,
        /// Zero-based position in the argument list
        index: usize,
        /// Parameter name for the path
        name: String,
    },
    /// Elements of a container passed as one executable parameter
    ParameterContainerElement {
        /// Executable name for the path root node
        executable: String,
        /// Zero-based position in the argument list
        index: usize,
        /// Parameter name for the path
        name: String,
        /// Which container position
        slot: ContainerSlot,
    },
    /// The whole argument list of an executable
    CrossParameter {
        /// Executable name for the path root node
        executable: String,
    },
    /// The return value of an executable
    ReturnValue {
        /// Executable name for the path root node
        executable: String,
    },
    /// Elements of a container returned by an executable
    ReturnValueContainerElement {
        /// Executable name for the path root node
        executable: String,
        /// Which container position
        slot: ContainerSlot,
    },
}

impl ConstraintLocation {
    /// The element kind this location reports under
    #[must_use]
    pub fn kind(&self) -> ConstrainedElementKind {
        match self {
            ConstraintLocation::Type => ConstrainedElementKind::Type,
            ConstraintLocation::Property {
                kind: PropertyKind::Field,
                ..
            } => ConstrainedElementKind::Field,
            ConstraintLocation::Property {
                kind: PropertyKind::Getter,
                ..
            } => ConstrainedElementKind::Getter,
            ConstraintLocation::ContainerElement { .. }
            | ConstraintLocation::ParameterContainerElement { .. }
            | ConstraintLocation::ReturnValueContainerElement { .. } => {
                ConstrainedElementKind::TypeArgument
            }
            ConstraintLocation::Parameter { .. } => ConstrainedElementKind::Parameter,
            ConstraintLocation::CrossParameter { .. } => ConstrainedElementKind::CrossParameter,
            ConstraintLocation::ReturnValue { .. } => ConstrainedElementKind::ReturnValue,
        }
    }

    /// The property name for bean-hosted locations
    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        match self {
            ConstraintLocation::Property { name, .. }
            | ConstraintLocation::ContainerElement { property: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns true for locations hosted on an executable rather than a bean
    #[must_use]
    pub fn is_executable_hosted(&self) -> bool {
        matches!(
            self,
            ConstraintLocation::Parameter { .. }
                | ConstraintLocation::ParameterContainerElement { .. }
                | ConstraintLocation::CrossParameter { .. }
                | ConstraintLocation::ReturnValue { .. }
                | ConstraintLocation::ReturnValueContainerElement { .. }
        )
    }

    /// Pulls this location's value out of a bean instance.
    ///
    /// For `Type` the value is the bean itself; for properties it is one property
    /// read; for container element locations it is the *container*, which the engine
    /// then iterates per element. Executable-hosted locations have no bean-held value
    /// and yield [`Value::Null`].
    #[must_use]
    pub fn extract_from_bean(&self, bean: &BeanHandle) -> Value {
        match self {
            ConstraintLocation::Type => Value::Bean(bean.clone()),
            ConstraintLocation::Property { name, .. }
            | ConstraintLocation::ContainerElement { property: name, .. } => bean.property(name),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for ConstraintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintLocation::Type => write!(f, "<type>"),
            ConstraintLocation::Property { name, .. } => write!(f, "{name}"),
            ConstraintLocation::ContainerElement { property, slot } => {
                write!(f, "{property}<{slot}>")
            }
            ConstraintLocation::Parameter {
                executable, name, ..
            } => write!(f, "{executable}.{name}"),
            ConstraintLocation::ParameterContainerElement {
                executable,
                name,
                slot,
                ..
            } => write!(f, "{executable}.{name}<{slot}>"),
            ConstraintLocation::CrossParameter { executable } => {
                write!(f, "{executable}.<cross-parameter>")
            }
            ConstraintLocation::ReturnValue { executable } => {
                write!(f, "{executable}.<return value>")
            }
            ConstraintLocation::ReturnValueContainerElement { executable, slot } => {
                write!(f, "{executable}.<return value><{slot}>")
            }
        }
    }
}

/// A built constraint descriptor bound to one structural location.
///
/// Meta-constraints are what the aggregated metadata stores and what the traversal
/// evaluates. Each one remembers the hierarchy type that declared it, which drives
/// the per-hosting-class walk when a type in the hierarchy redefines its default
/// group sequence. They are cheap to clone and safe to share; the descriptor sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct MetaConstraint {
    descriptor: Arc<ConstraintDescriptor>,
    location: ConstraintLocation,
    declaring_type: TypeToken,
}

impl MetaConstraint {
    /// Binds a descriptor to a location declared on the given hierarchy type
    #[must_use]
    pub fn new(
        descriptor: Arc<ConstraintDescriptor>,
        location: ConstraintLocation,
        declaring_type: TypeToken,
    ) -> Self {
        MetaConstraint {
            descriptor,
            location,
            declaring_type,
        }
    }

    /// The bound descriptor
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ConstraintDescriptor> {
        &self.descriptor
    }

    /// The bound location
    #[must_use]
    pub fn location(&self) -> &ConstraintLocation {
        &self.location
    }

    /// The hierarchy type hosting the declaration
    #[must_use]
    pub fn declaring_type(&self) -> TypeToken {
        self.declaring_type
    }

    /// The element kind this meta-constraint reports under
    #[must_use]
    pub fn kind(&self) -> ConstrainedElementKind {
        self.location.kind()
    }

    /// Declaration-level equality: same location and declaration-equal descriptor.
    ///
    /// The declaring type is deliberately ignored so that a constraint inherited
    /// identically through several hierarchy types collapses into one evaluation,
    /// attributed to the most derived declaration.
    #[must_use]
    pub fn declaration_equals(&self, other: &MetaConstraint) -> bool {
        self.location == other.location && self.descriptor.declaration_equals(&other.descriptor)
    }
}

impl fmt::Debug for MetaConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MetaConstraint({} @ {})",
            self.descriptor.kind(),
            self.location
        )
    }
}

/// Appends constraints that are not declaration-equal to one already in `target`.
///
/// The aggregation builders use this to collapse identical inherited declarations:
/// merge order runs most derived type first, so the surviving entry is the most
/// derived one.
pub(crate) fn merge_unique(
    target: &mut Vec<MetaConstraint>,
    source: impl IntoIterator<Item = MetaConstraint>,
) {
    for constraint in source {
        if !target
            .iter()
            .any(|existing| existing.declaration_equals(&constraint))
        {
            target.push(constraint);
        }
    }
}
