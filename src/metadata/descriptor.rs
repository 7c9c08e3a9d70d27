//! Constraint descriptor model.
//!
//! A constraint travels through three representations:
//!
//! 1. [`ConstraintDef`] — the raw, source-agnostic declaration a configuration
//!    contributor hands to the registry (kind name, attribute bag, groups, payload,
//!    composing definitions).
//! 2. [`ConstraintKindDef`] — the registered definition of a constraint *kind*: its
//!    default message template and the validator factories with the [`ShapeSet`] each
//!    one accepts.
//! 3. [`ConstraintDescriptor`] — the immutable build product: groups normalized,
//!    validator strategy selected by declared shape and initialized once, composing
//!    descriptors built recursively. Shared behind `Arc` across calls and threads.
//!
//! Validator selection is a build-time dispatch: among the factories whose shape set
//! accepts the element's declared shape, the one with the narrowest set wins; ties are
//! declaration errors, as is an empty candidate list for a kind that has validators.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::metadata::shape::{ShapeSet, ValueShape};
use crate::metadata::token::{ConstraintId, GroupToken};
use crate::value::Value;
use crate::Result;

/// One typed attribute value inside a constraint declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Boolean attribute
    Bool(bool),
    /// Integer attribute
    Int(i64),
    /// Floating point attribute
    Float(f64),
    /// String attribute
    Str(String),
    /// List-of-strings attribute
    StrList(Vec<String>),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

/// Ordered name → value map of constraint attributes.
///
/// Ordered so that iteration, equality and rendering stay deterministic for one
/// metadata snapshot.
pub type AttributeBag = BTreeMap<String, AttributeValue>;

/// A constraint validator strategy.
///
/// Implementations are stateless apart from what [`initialize`](Self::initialize)
/// captures from the attribute bag. `is_valid` runs once per (element, group,
/// traversal visit); `Ok(true)` means the value passes. An `Err` marks the strategy
/// itself as broken for this evaluation — the engine logs it and moves on, it never
/// aborts the traversal and never produces a violation.
///
/// Null handling follows the usual convention: every validator except a not-null kind
/// accepts [`Value::Null`], leaving presence checks to the constraint declared for
/// them.
pub trait ConstraintValidator: Send + Sync {
    /// Captures attribute values once, when the owning descriptor is built.
    ///
    /// # Errors
    /// Returns [`crate::Error::Declaration`] when required attributes are missing or
    /// carry unusable values.
    fn initialize(&mut self, attributes: &AttributeBag) -> Result<()>;

    /// Checks one value.
    ///
    /// # Errors
    /// Any error marks this single evaluation as failed infrastructure, not as a
    /// constraint violation.
    fn is_valid(&self, value: &Value) -> Result<bool>;
}

/// Factory producing fresh validator instances for one shape set.
pub type ValidatorFactory = Arc<dyn Fn() -> Box<dyn ConstraintValidator> + Send + Sync>;

/// One registered validator strategy: the shapes it accepts and its factory.
#[derive(Clone)]
pub struct ValidatorBinding {
    shapes: ShapeSet,
    factory: ValidatorFactory,
}

impl ValidatorBinding {
    /// Creates a binding from a shape set and a factory closure
    pub fn new<F>(shapes: ShapeSet, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ConstraintValidator> + Send + Sync + 'static,
    {
        ValidatorBinding {
            shapes,
            factory: Arc::new(factory),
        }
    }

    /// The shapes this strategy accepts
    #[must_use]
    pub fn shapes(&self) -> ShapeSet {
        self.shapes
    }
}

impl fmt::Debug for ValidatorBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorBinding(shapes: {:?})", self.shapes)
    }
}

/// Registration input describing one constraint kind.
#[derive(Debug, Clone)]
pub struct ConstraintKindDef {
    name: String,
    default_message: String,
    validators: Vec<ValidatorBinding>,
}

impl ConstraintKindDef {
    /// Starts a kind definition with an empty validator list
    #[must_use]
    pub fn new(name: &str) -> Self {
        ConstraintKindDef {
            name: name.to_string(),
            default_message: format!("constraint '{name}' was violated"),
            validators: Vec::new(),
        }
    }

    /// Sets the message template used when a declaration provides none
    #[must_use]
    pub fn with_default_message(mut self, template: &str) -> Self {
        self.default_message = template.to_string();
        self
    }

    /// Adds a validator strategy for a shape set
    #[must_use]
    pub fn with_validator<F>(mut self, shapes: ShapeSet, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ConstraintValidator> + Send + Sync + 'static,
    {
        self.validators.push(ValidatorBinding::new(shapes, factory));
        self
    }

    /// The kind name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shared catalog of registered constraint kinds, keyed by kind name.
#[derive(Default)]
pub(crate) struct ConstraintCatalog {
    kinds: DashMap<String, ConstraintKindDef>,
}

impl ConstraintCatalog {
    pub(crate) fn new() -> Self {
        ConstraintCatalog {
            kinds: DashMap::new(),
        }
    }

    /// Registers a kind, rejecting duplicate names and duplicate exact shape sets.
    pub(crate) fn register(&self, def: ConstraintKindDef) -> Result<()> {
        let mut seen = Vec::new();
        for binding in &def.validators {
            if seen.contains(&binding.shapes) {
                return Err(declaration_error!(
                    "constraint kind '{}' registers two validators for the same shape set {:?}",
                    def.name,
                    binding.shapes
                ));
            }
            seen.push(binding.shapes);
        }

        if self.kinds.contains_key(&def.name) {
            return Err(declaration_error!(
                "constraint kind '{}' is already registered",
                def.name
            ));
        }
        self.kinds.insert(def.name.clone(), def);
        Ok(())
    }

    pub(crate) fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    fn default_message(&self, kind: &str) -> Option<String> {
        self.kinds.get(kind).map(|k| k.default_message.clone())
    }

    /// Picks the validator strategy for a kind and declared shape.
    ///
    /// `Ok(None)` means the kind is registered as composed-only (no validators at
    /// all). A kind with validators but no candidate for the shape, or with several
    /// equally narrow candidates, is a declaration error.
    fn resolve(&self, kind: &str, shape: ValueShape) -> Result<Option<ValidatorBinding>> {
        let Some(entry) = self.kinds.get(kind) else {
            return Err(declaration_error!(
                "constraint kind '{kind}' is not registered"
            ));
        };

        if entry.validators.is_empty() {
            return Ok(None);
        }

        let mut candidates: Vec<&ValidatorBinding> = entry
            .validators
            .iter()
            .filter(|binding| binding.shapes.accepts(shape))
            .collect();
        if candidates.is_empty() {
            return Err(declaration_error!(
                "no validator of constraint kind '{kind}' accepts declared shape {shape}"
            ));
        }

        candidates.sort_by_key(|binding| binding.shapes.bits().count_ones());
        let narrowest = candidates[0].shapes.bits().count_ones();
        if candidates.len() > 1 && candidates[1].shapes.bits().count_ones() == narrowest {
            return Err(declaration_error!(
                "ambiguous validators of constraint kind '{kind}' for declared shape {shape}"
            ));
        }

        Ok(Some(candidates[0].clone()))
    }
}

/// One raw constraint declaration, before metadata aggregation.
///
/// Built through `with_*` chaining and handed to the registry inside a type
/// configuration. Declarations are plain values; composing declarations are owned by
/// their parent, which keeps composition trees finite by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDef {
    kind: String,
    message: Option<String>,
    groups: Vec<GroupToken>,
    payload: Vec<String>,
    attributes: AttributeBag,
    composing: Vec<ConstraintDef>,
    report_as_single_violation: bool,
}

impl ConstraintDef {
    /// Starts a declaration of the given kind
    #[must_use]
    pub fn new(kind: &str) -> Self {
        ConstraintDef {
            kind: kind.to_string(),
            message: None,
            groups: Vec::new(),
            payload: Vec::new(),
            attributes: AttributeBag::new(),
            composing: Vec::new(),
            report_as_single_violation: false,
        }
    }

    /// Overrides the kind's default message template
    #[must_use]
    pub fn with_message(mut self, template: &str) -> Self {
        self.message = Some(template.to_string());
        self
    }

    /// Adds a validation group; an empty group list normalizes to `Default` at build
    #[must_use]
    pub fn with_group(mut self, group: GroupToken) -> Self {
        self.groups.push(group);
        self
    }

    /// Adds a payload marker
    #[must_use]
    pub fn with_payload(mut self, marker: &str) -> Self {
        self.payload.push(marker.to_string());
        self
    }

    /// Sets one attribute
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Adds a composing declaration (AND semantics)
    #[must_use]
    pub fn with_composing(mut self, def: ConstraintDef) -> Self {
        self.composing.push(def);
        self
    }

    /// Collapses composing failures into a single violation with this declaration's
    /// message
    #[must_use]
    pub fn report_as_single_violation(mut self) -> Self {
        self.report_as_single_violation = true;
        self
    }

    /// The kind name
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The declared groups, as written (possibly empty)
    #[must_use]
    pub fn groups(&self) -> &[GroupToken] {
        &self.groups
    }
}

/// The immutable build product of one constraint declaration at one location.
pub struct ConstraintDescriptor {
    id: ConstraintId,
    kind: String,
    message_template: String,
    groups: Vec<GroupToken>,
    payload: Vec<String>,
    attributes: AttributeBag,
    composing: Vec<Arc<ConstraintDescriptor>>,
    report_as_single_violation: bool,
    validator: Option<Arc<dyn ConstraintValidator>>,
}

impl ConstraintDescriptor {
    /// Builds a descriptor tree from a raw declaration.
    ///
    /// Normalizes groups (empty → `Default`, duplicates removed, order kept), selects
    /// and initializes the validator strategy for `declared_shape`, and recurses into
    /// composing declarations. Composing descriptors inherit the parent's effective
    /// groups so the whole composed tree activates as one unit.
    ///
    /// # Errors
    /// Returns [`crate::Error::Declaration`] for unknown kinds, missing or ambiguous
    /// validators, a composed-only kind without composing declarations, or validator
    /// initialization failures.
    pub(crate) fn build(
        def: &ConstraintDef,
        declared_shape: ValueShape,
        catalog: &ConstraintCatalog,
        ids: &AtomicU32,
    ) -> Result<Arc<ConstraintDescriptor>> {
        Self::build_with_groups(def, declared_shape, catalog, ids, None)
    }

    fn build_with_groups(
        def: &ConstraintDef,
        declared_shape: ValueShape,
        catalog: &ConstraintCatalog,
        ids: &AtomicU32,
        inherited_groups: Option<&[GroupToken]>,
    ) -> Result<Arc<ConstraintDescriptor>> {
        let binding = catalog.resolve(&def.kind, declared_shape)?;
        if binding.is_none() && def.composing.is_empty() {
            return Err(declaration_error!(
                "constraint kind '{}' has neither validators nor composing constraints",
                def.kind
            ));
        }

        let mut groups: Vec<GroupToken> = Vec::new();
        let declared: &[GroupToken] = if def.groups.is_empty() {
            inherited_groups.unwrap_or(&[GroupToken::DEFAULT])
        } else {
            &def.groups
        };
        for group in declared {
            if !groups.contains(group) {
                groups.push(*group);
            }
        }

        let mut composing = Vec::with_capacity(def.composing.len());
        for child in &def.composing {
            composing.push(Self::build_with_groups(
                child,
                declared_shape,
                catalog,
                ids,
                Some(&groups),
            )?);
        }

        let validator = match binding {
            Some(binding) => {
                let mut validator = (binding.factory)();
                validator.initialize(&def.attributes)?;
                Some(Arc::from(validator) as Arc<dyn ConstraintValidator>)
            }
            None => None,
        };

        let message_template = match &def.message {
            Some(template) => template.clone(),
            None => catalog
                .default_message(&def.kind)
                .unwrap_or_else(|| format!("constraint '{}' was violated", def.kind)),
        };

        Ok(Arc::new(ConstraintDescriptor {
            id: ConstraintId::new(ids.fetch_add(1, Ordering::Relaxed)),
            kind: def.kind.clone(),
            message_template,
            groups,
            payload: def.payload.clone(),
            attributes: def.attributes.clone(),
            composing,
            report_as_single_violation: def.report_as_single_violation,
            validator,
        }))
    }

    /// Unique id of this descriptor build
    #[must_use]
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    /// The constraint kind name
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The message template attached to violations of this descriptor
    #[must_use]
    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    /// Normalized, never-empty group list
    #[must_use]
    pub fn groups(&self) -> &[GroupToken] {
        &self.groups
    }

    /// Returns true if this descriptor activates under the given group
    #[must_use]
    pub fn matches_group(&self, group: GroupToken) -> bool {
        self.groups.contains(&group)
    }

    /// Ordered payload markers
    #[must_use]
    pub fn payload(&self) -> &[String] {
        &self.payload
    }

    /// The declaration's attribute bag
    #[must_use]
    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    /// Composing descriptors, AND-combined with this one
    #[must_use]
    pub fn composing(&self) -> &[Arc<ConstraintDescriptor>] {
        &self.composing
    }

    /// Returns true if composing failures collapse into one violation
    #[must_use]
    pub fn is_report_as_single_violation(&self) -> bool {
        self.report_as_single_violation
    }

    /// The resolved validator strategy, `None` for composed-only kinds
    #[must_use]
    pub fn validator(&self) -> Option<&Arc<dyn ConstraintValidator>> {
        self.validator.as_ref()
    }

    /// Structural equality of the underlying declarations.
    ///
    /// Compares everything a declaration states — kind, attributes, message, groups,
    /// payload and composing declarations — while ignoring build artifacts (ids,
    /// validator instances). This is the equality the hierarchy consistency rules use
    /// when deciding whether an override redeclares the same parameter contract.
    #[must_use]
    pub fn declaration_equals(&self, other: &ConstraintDescriptor) -> bool {
        self.kind == other.kind
            && self.message_template == other.message_template
            && self.groups == other.groups
            && self.payload == other.payload
            && self.attributes == other.attributes
            && self.report_as_single_violation == other.report_as_single_violation
            && self.composing.len() == other.composing.len()
            && self
                .composing
                .iter()
                .zip(other.composing.iter())
                .all(|(a, b)| a.declaration_equals(b))
    }
}

impl fmt::Debug for ConstraintDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("groups", &self.groups)
            .field("composing", &self.composing.len())
            .field("report_as_single_violation", &self.report_as_single_violation)
            .finish()
    }
}
