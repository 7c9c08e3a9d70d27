use strum::{Display, EnumCount, EnumIter};

use crate::metadata::descriptor::ConstraintDef;
use crate::metadata::shape::ValueShape;
use crate::metadata::token::GroupToken;

/// Which accessor a property declaration talks about.
///
/// A field and a getter of the same name describe the same logical property; the
/// aggregator merges them into one property metadata entry while keeping the kind tag
/// for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum PropertyKind {
    /// Instance field
    Field,
    /// Property getter
    Getter,
}

/// One group conversion attached to a cascaded edge.
///
/// While cascading, a child validates under `to` wherever the parent would have used
/// `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupConversionDef {
    /// Group active on the parent side
    pub from: GroupToken,
    /// Group the child validates under instead
    pub to: GroupToken,
}

impl GroupConversionDef {
    /// Creates a conversion edge
    #[must_use]
    pub fn new(from: GroupToken, to: GroupToken) -> Self {
        GroupConversionDef { from, to }
    }
}

/// Container position a type-argument declaration applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum ContainerSlot {
    /// Elements of an ordered collection, addressed by index
    ListElement,
    /// Elements of an unordered collection
    SetElement,
    /// Keys of a key/value association
    MapKey,
    /// Values of a key/value association
    MapValue,
}

/// Constraints and cascading declared for one container element slot.
///
/// The generic-type-argument analog: a declaration like a size bound on every list
/// element, or cascading into every map value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedContainerElement {
    slot: ContainerSlot,
    declared_shape: ValueShape,
    constraints: Vec<ConstraintDef>,
    cascade: bool,
    conversions: Vec<GroupConversionDef>,
}

impl ConstrainedContainerElement {
    /// Starts a declaration for one container slot with the elements' declared shape
    #[must_use]
    pub fn new(slot: ContainerSlot, declared_shape: ValueShape) -> Self {
        ConstrainedContainerElement {
            slot,
            declared_shape,
            constraints: Vec::new(),
            cascade: false,
            conversions: Vec::new(),
        }
    }

    /// Adds a constraint evaluated per element in this slot
    #[must_use]
    pub fn with_constraint(mut self, def: ConstraintDef) -> Self {
        self.constraints.push(def);
        self
    }

    /// Marks elements in this slot for cascaded validation
    #[must_use]
    pub fn cascading(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Adds a group conversion for the cascaded elements
    #[must_use]
    pub fn with_group_conversion(mut self, from: GroupToken, to: GroupToken) -> Self {
        self.conversions.push(GroupConversionDef::new(from, to));
        self
    }

    /// The container slot
    #[must_use]
    pub fn slot(&self) -> ContainerSlot {
        self.slot
    }

    /// Declared shape of the elements
    #[must_use]
    pub fn declared_shape(&self) -> ValueShape {
        self.declared_shape
    }

    /// Per-element constraints
    #[must_use]
    pub fn constraints(&self) -> &[ConstraintDef] {
        &self.constraints
    }

    /// Returns true if elements cascade
    #[must_use]
    pub fn is_cascading(&self) -> bool {
        self.cascade
    }

    /// Group conversions for cascaded elements
    #[must_use]
    pub fn conversions(&self) -> &[GroupConversionDef] {
        &self.conversions
    }

    /// Returns true if this slot declaration carries anything at all
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty() || self.cascade || !self.conversions.is_empty()
    }
}

/// Cascading metadata for one constrainable element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeDef {
    cascade: bool,
    conversions: Vec<GroupConversionDef>,
    container_elements: Vec<ConstrainedContainerElement>,
}

impl CascadeDef {
    /// No cascading, no conversions, no container elements
    #[must_use]
    pub fn none() -> Self {
        CascadeDef::default()
    }

    /// Returns true if the element value itself cascades
    #[must_use]
    pub fn is_cascading(&self) -> bool {
        self.cascade
    }

    /// Group conversions for the cascaded value
    #[must_use]
    pub fn conversions(&self) -> &[GroupConversionDef] {
        &self.conversions
    }

    /// Container element declarations
    #[must_use]
    pub fn container_elements(&self) -> &[ConstrainedContainerElement] {
        &self.container_elements
    }

    /// The target group for `group` after applying this edge's conversions
    #[must_use]
    pub fn convert_group(&self, group: GroupToken) -> GroupToken {
        self.conversions
            .iter()
            .find(|c| c.from == group)
            .map_or(group, |c| c.to)
    }

    /// Returns true if this metadata requires any traversal work
    #[must_use]
    pub fn requires_traversal(&self) -> bool {
        self.cascade
            || !self.conversions.is_empty()
            || self.container_elements.iter().any(|e| e.is_constrained())
    }

    /// Returns true if the value or any container element is marked cascading
    #[must_use]
    pub fn is_marked_cascading_anywhere(&self) -> bool {
        self.cascade || self.container_elements.iter().any(ConstrainedContainerElement::is_cascading)
    }

    /// Returns true if the value or any container element declares group conversions
    #[must_use]
    pub fn has_group_conversions_anywhere(&self) -> bool {
        !self.conversions.is_empty()
            || self
                .container_elements
                .iter()
                .any(|e| !e.conversions().is_empty())
    }

    pub(crate) fn set_cascading(&mut self) {
        self.cascade = true;
    }

    pub(crate) fn add_conversion(&mut self, conversion: GroupConversionDef) {
        self.conversions.push(conversion);
    }

    pub(crate) fn add_container_element(&mut self, element: ConstrainedContainerElement) {
        self.container_elements.push(element);
    }
}

/// One raw property declaration: a field or getter with constraints and cascading.
#[derive(Debug, Clone)]
pub struct ConstrainedProperty {
    kind: PropertyKind,
    name: String,
    declared_shape: ValueShape,
    constraints: Vec<ConstraintDef>,
    cascade: CascadeDef,
}

impl ConstrainedProperty {
    /// Starts a field declaration
    #[must_use]
    pub fn field(name: &str, declared_shape: ValueShape) -> Self {
        ConstrainedProperty {
            kind: PropertyKind::Field,
            name: name.to_string(),
            declared_shape,
            constraints: Vec::new(),
            cascade: CascadeDef::none(),
        }
    }

    /// Starts a getter declaration
    #[must_use]
    pub fn getter(name: &str, declared_shape: ValueShape) -> Self {
        ConstrainedProperty {
            kind: PropertyKind::Getter,
            name: name.to_string(),
            declared_shape,
            constraints: Vec::new(),
            cascade: CascadeDef::none(),
        }
    }

    /// Adds a constraint on the property value
    #[must_use]
    pub fn with_constraint(mut self, def: ConstraintDef) -> Self {
        self.constraints.push(def);
        self
    }

    /// Marks the property for cascaded validation
    #[must_use]
    pub fn cascading(mut self) -> Self {
        self.cascade.set_cascading();
        self
    }

    /// Adds a group conversion for the cascaded value
    #[must_use]
    pub fn with_group_conversion(mut self, from: GroupToken, to: GroupToken) -> Self {
        self.cascade.add_conversion(GroupConversionDef::new(from, to));
        self
    }

    /// Adds a container element declaration
    #[must_use]
    pub fn with_container_element(mut self, element: ConstrainedContainerElement) -> Self {
        self.cascade.add_container_element(element);
        self
    }

    /// Field or getter
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

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

    /// Constraints on the property value
    #[must_use]
    pub fn constraints(&self) -> &[ConstraintDef] {
        &self.constraints
    }

    /// Cascading metadata
    #[must_use]
    pub fn cascade(&self) -> &CascadeDef {
        &self.cascade
    }

    /// Returns true if this declaration carries constraints, cascading or conversions
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty() || self.cascade.requires_traversal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_constrained() {
        let bare = ConstrainedProperty::field("name", ValueShape::Str);
        assert!(!bare.is_constrained());

        let with_constraint =
            ConstrainedProperty::field("name", ValueShape::Str).with_constraint(ConstraintDef::new("NotNull"));
        assert!(with_constraint.is_constrained());

        let cascading = ConstrainedProperty::getter("address", ValueShape::Bean).cascading();
        assert!(cascading.is_constrained());

        let converting = ConstrainedProperty::getter("address", ValueShape::Bean)
            .with_group_conversion(GroupToken::DEFAULT, GroupToken::new(9));
        assert!(converting.is_constrained());
    }

    #[test]
    fn test_convert_group() {
        let g_from = GroupToken::new(4);
        let g_to = GroupToken::new(5);
        let property = ConstrainedProperty::field("address", ValueShape::Bean)
            .cascading()
            .with_group_conversion(g_from, g_to);

        assert_eq!(property.cascade().convert_group(g_from), g_to);
        assert_eq!(
            property.cascade().convert_group(GroupToken::DEFAULT),
            GroupToken::DEFAULT
        );
    }

    #[test]
    fn test_container_element_constrained() {
        let plain = ConstrainedContainerElement::new(ContainerSlot::ListElement, ValueShape::Str);
        assert!(!plain.is_constrained());

        let sized = ConstrainedContainerElement::new(ContainerSlot::ListElement, ValueShape::Str)
            .with_constraint(ConstraintDef::new("Size"));
        assert!(sized.is_constrained());

        let cascading =
            ConstrainedContainerElement::new(ContainerSlot::MapValue, ValueShape::Bean).cascading();
        assert!(cascading.is_constrained());
        assert_eq!(cascading.slot(), ContainerSlot::MapValue);
    }
}
