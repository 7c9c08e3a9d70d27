use strum::{Display, EnumCount, EnumIter};

use crate::metadata::descriptor::ConstraintDef;
use crate::metadata::raw::element::{CascadeDef, ConstrainedContainerElement, GroupConversionDef};
use crate::metadata::shape::ValueShape;
use crate::metadata::token::GroupToken;

/// Method or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum ExecutableKind {
    /// Instance or static method
    Method,
    /// Constructor; return value is the constructed instance
    Constructor,
}

/// One raw parameter declaration of a constrained executable.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedParameter {
    index: usize,
    name: String,
    declared_shape: ValueShape,
    constraints: Vec<ConstraintDef>,
    cascade: CascadeDef,
}

impl ConstrainedParameter {
    /// Starts a parameter declaration at the given position
    #[must_use]
    pub fn new(index: usize, name: &str, declared_shape: ValueShape) -> Self {
        ConstrainedParameter {
            index,
            name: name.to_string(),
            declared_shape,
            constraints: Vec::new(),
            cascade: CascadeDef::none(),
        }
    }

    /// Adds a constraint on the parameter value
    #[must_use]
    pub fn with_constraint(mut self, def: ConstraintDef) -> Self {
        self.constraints.push(def);
        self
    }

    /// Marks the parameter for cascaded validation
    #[must_use]
    pub fn cascading(mut self) -> Self {
        self.cascade.set_cascading();
        self
    }

    /// Adds a group conversion for the cascaded parameter value
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

    /// Zero-based parameter position
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

    /// Constraints on the parameter value
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

/// One raw executable declaration: a method or constructor with parameter,
/// cross-parameter and return-value constraints.
///
/// The `signature` string is the executable's identity across the type hierarchy: two
/// declarations on different hierarchy types with the same signature describe the same
/// logical executable (an override), which is what the hierarchy consistency rules and
/// the aggregated merge key on. The `name` is what violation paths print.
#[derive(Debug, Clone)]
pub struct ConstrainedExecutable {
    kind: ExecutableKind,
    name: String,
    signature: String,
    parameters: Vec<ConstrainedParameter>,
    cross_parameter_constraints: Vec<ConstraintDef>,
    return_shape: Option<ValueShape>,
    return_constraints: Vec<ConstraintDef>,
    return_cascade: CascadeDef,
}

impl ConstrainedExecutable {
    /// Starts a void method declaration; set a return shape for non-void methods
    #[must_use]
    pub fn method(name: &str, signature: &str) -> Self {
        ConstrainedExecutable {
            kind: ExecutableKind::Method,
            name: name.to_string(),
            signature: signature.to_string(),
            parameters: Vec::new(),
            cross_parameter_constraints: Vec::new(),
            return_shape: None,
            return_constraints: Vec::new(),
            return_cascade: CascadeDef::none(),
        }
    }

    /// Starts a constructor declaration; the return shape is the constructed bean
    #[must_use]
    pub fn constructor(name: &str, signature: &str) -> Self {
        ConstrainedExecutable {
            kind: ExecutableKind::Constructor,
            name: name.to_string(),
            signature: signature.to_string(),
            parameters: Vec::new(),
            cross_parameter_constraints: Vec::new(),
            return_shape: Some(ValueShape::Bean),
            return_constraints: Vec::new(),
            return_cascade: CascadeDef::none(),
        }
    }

    /// Declares the return shape; absent means void
    #[must_use]
    pub fn with_return_shape(mut self, shape: ValueShape) -> Self {
        self.return_shape = Some(shape);
        self
    }

    /// Adds a parameter declaration
    #[must_use]
    pub fn with_parameter(mut self, parameter: ConstrainedParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds a constraint over the whole argument list
    #[must_use]
    pub fn with_cross_parameter_constraint(mut self, def: ConstraintDef) -> Self {
        self.cross_parameter_constraints.push(def);
        self
    }

    /// Adds a constraint on the return value
    #[must_use]
    pub fn with_return_constraint(mut self, def: ConstraintDef) -> Self {
        self.return_constraints.push(def);
        self
    }

    /// Marks the return value for cascaded validation
    #[must_use]
    pub fn with_cascading_return(mut self) -> Self {
        self.return_cascade.set_cascading();
        self
    }

    /// Adds a group conversion for the cascaded return value
    #[must_use]
    pub fn with_return_group_conversion(mut self, from: GroupToken, to: GroupToken) -> Self {
        self.return_cascade
            .add_conversion(GroupConversionDef::new(from, to));
        self
    }

    /// Adds a container element declaration for the return value
    #[must_use]
    pub fn with_return_container_element(mut self, element: ConstrainedContainerElement) -> Self {
        self.return_cascade.add_container_element(element);
        self
    }

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

    /// The identity key across the hierarchy
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Parameter declarations in position order
    #[must_use]
    pub fn parameters(&self) -> &[ConstrainedParameter] {
        &self.parameters
    }

    /// Constraints over the whole argument list
    #[must_use]
    pub fn cross_parameter_constraints(&self) -> &[ConstraintDef] {
        &self.cross_parameter_constraints
    }

    /// Declared return shape; `None` for void
    #[must_use]
    pub fn return_shape(&self) -> Option<ValueShape> {
        self.return_shape
    }

    /// Returns true if the executable is void
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.return_shape.is_none()
    }

    /// Constraints on the return value
    #[must_use]
    pub fn return_constraints(&self) -> &[ConstraintDef] {
        &self.return_constraints
    }

    /// Cascading metadata for the return value
    #[must_use]
    pub fn return_cascade(&self) -> &CascadeDef {
        &self.return_cascade
    }

    /// Returns true if any parameter carries constraints, cascading or conversions
    #[must_use]
    pub fn has_parameter_constraints(&self) -> bool {
        !self.cross_parameter_constraints.is_empty()
            || self.parameters.iter().any(ConstrainedParameter::is_constrained)
    }

    /// Returns true if this declaration carries anything at all
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.has_parameter_constraints()
            || !self.return_constraints.is_empty()
            || self.return_cascade.requires_traversal()
    }

    /// Returns true if the return value or one of its container elements cascades
    #[must_use]
    pub fn is_return_marked_cascading(&self) -> bool {
        self.return_cascade.is_marked_cascading_anywhere()
    }

    /// Returns true if the return value or one of its container elements declares
    /// group conversions
    #[must_use]
    pub fn has_return_group_conversions(&self) -> bool {
        self.return_cascade.has_group_conversions_anywhere()
    }

    /// Parameter-contract equivalence with another declaration of the same signature.
    ///
    /// Two declarations are equally parameter-constrained when their cross-parameter
    /// constraint multisets match and every parameter position carries the same
    /// constraint multiset and the same cascading metadata. Declaration order within
    /// one element does not matter.
    #[must_use]
    pub fn is_equally_parameter_constrained(&self, other: &ConstrainedExecutable) -> bool {
        if !same_multiset(
            &self.cross_parameter_constraints,
            &other.cross_parameter_constraints,
        ) {
            return false;
        }
        if self.parameters.len() != other.parameters.len() {
            return false;
        }
        self.parameters.iter().zip(other.parameters.iter()).all(
            |(mine, theirs)| {
                same_multiset(mine.constraints(), theirs.constraints())
                    && mine.cascade() == theirs.cascade()
            },
        )
    }
}

/// Order-insensitive equality with multiplicity.
fn same_multiset<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    for item in a {
        match b
            .iter()
            .enumerate()
            .find(|(i, other)| !used[*i] && *other == item)
        {
            Some((i, _)) => used[i] = true,
            None => return false,
        }
    }
    true
}
