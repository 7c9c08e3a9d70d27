//! The validation engine: group-ordered traversal of bean graphs and
//! executable calls.
//!
//! A [`Validator`] is a cheap, shareable front over one
//! [`MetadataRegistry`](crate::MetadataRegistry). Each entry point resolves the
//! requested groups into a [`GroupChain`], then walks metadata and values in the
//! canonical order: every standalone group runs its constraints, then every
//! standalone group runs its cascades, then sequences run member by member with
//! constraints and cascades interleaved per member. A sequence member that
//! produces violations stops the whole validation.
//!
//! # Traversal Rules
//!
//! - Under the `Default` group, constraints run per hierarchy class so a class
//!   that redefines its default group sequence substitutes that sequence for
//!   its own constraints only.
//! - Cascading follows properties marked for traversal, descends into container
//!   elements and map keys, applies group conversions per edge, and consults
//!   the processed set keyed by (bean identity, group) before entering a bean.
//!   Cyclic graphs and diamonds therefore validate each bean at most once per
//!   group.
//! - A validator that fails to execute is logged and treated as passing; a
//!   broken check never vetoes a value.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use verdict::{
//!     BeanHandle, ConstraintDef, ConstrainedProperty, MetadataRegistry, TypeDef,
//!     TypeConfiguration, ConfigurationSource, GroupToken, TypeToken,
//!     ValidatableBean, Validator, Value, ValueShape,
//! };
//!
//! struct Address {
//!     street: Value,
//! }
//!
//! impl ValidatableBean for Address {
//!     fn type_token(&self) -> TypeToken {
//!         TypeToken::new(1)
//!     }
//!
//!     fn property(&self, name: &str) -> Value {
//!         match name {
//!             "street" => self.street.clone(),
//!             _ => Value::Null,
//!         }
//!     }
//! }
//!
//! let registry = Arc::new(MetadataRegistry::new());
//! verdict::constraints::register_built_in(&registry)?;
//! let address = registry.register_type(TypeDef::new("Address"))?;
//! registry.contribute(
//!     address,
//!     ConfigurationSource::Annotation,
//!     TypeConfiguration::new().with_property(
//!         ConstrainedProperty::field("street", ValueShape::Str)
//!             .with_constraint(ConstraintDef::new("NotNull")),
//!     ),
//! )?;
//!
//! let validator = Validator::new(registry);
//! let bean = BeanHandle::new(Address { street: Value::Null });
//! let violations = validator.validate(&bean, &[GroupToken::DEFAULT])?;
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations.violations()[0].path().to_string(), "street");
//! # Ok::<(), verdict::Error>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::context::{ValidationContext, ValueContext};
use crate::engine::path::{Path, PathNode};
use crate::engine::violation::ViolationSet;
use crate::groups::{Group, GroupChain, GroupChainResolver};
use crate::metadata::aggregated::{BeanMetaData, CascadingMetaData, ExecutableMetaData, PropertyMetaData};
use crate::metadata::descriptor::ConstraintDescriptor;
use crate::metadata::location::{ConstraintLocation, MetaConstraint};
use crate::metadata::raw::{ContainerSlot, ExecutableKind};
use crate::metadata::registry::MetadataRegistry;
use crate::metadata::token::{GroupToken, TypeToken};
use crate::value::{BeanHandle, Value};
use crate::{Error, Result};

/// Tuning knobs for one [`Validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Stop at the first violation instead of collecting all of them
    pub fail_fast: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions { fail_fast: false }
    }
}

impl ValidationOptions {
    /// Collects every violation the traversal can find
    #[must_use]
    pub fn collecting() -> Self {
        ValidationOptions::default()
    }

    /// Unwinds after the first violation
    #[must_use]
    pub fn fail_fast() -> Self {
        ValidationOptions { fail_fast: true }
    }
}

/// Validates bean graphs and executable calls against registered metadata.
///
/// Construction is cheap; the heavy lifting lives in the registry's aggregated
/// metadata cache, which the validator shares. One validator may serve any
/// number of threads concurrently.
pub struct Validator {
    registry: Arc<MetadataRegistry>,
    resolver: GroupChainResolver,
    options: ValidationOptions,
}

impl Validator {
    /// Creates a validator with default options
    #[must_use]
    pub fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self::with_options(registry, ValidationOptions::default())
    }

    /// Creates a validator with explicit options
    #[must_use]
    pub fn with_options(registry: Arc<MetadataRegistry>, options: ValidationOptions) -> Self {
        let resolver = registry.group_resolver();
        Validator {
            registry,
            resolver,
            options,
        }
    }

    /// The options this validator runs with
    #[must_use]
    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// The registry this validator reads metadata from
    #[must_use]
    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Validates a whole bean graph under the requested groups.
    ///
    /// An empty group list validates under `Default`.
    ///
    /// # Errors
    ///
    /// Returns the group resolution error for an unknown or class-like group,
    /// [`Error::TypeNotFound`] for a bean of an unregistered type reached by
    /// the traversal, or the declaration error that building metadata ran into.
    pub fn validate(&self, bean: &BeanHandle, groups: &[GroupToken]) -> Result<ViolationSet> {
        let chain = self.resolve_requested(groups)?;
        let mut ctx = ValidationContext::new(Some(bean.clone()), self.options.fail_fast);
        let value_ctx = ValueContext::for_bean(bean.clone(), Path::root());
        self.validate_in_context(&mut ctx, &value_ctx, &chain)?;
        Ok(ctx.into_violations())
    }

    /// Validates the constraints bound to one property of `bean`, without
    /// cascading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the type declares no such
    /// property, plus everything [`Validator::validate`] can return.
    pub fn validate_property(
        &self,
        bean: &BeanHandle,
        property: &str,
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        let meta = self.registry.bean_metadata(bean.type_token())?;
        let property_meta = Self::lookup_property(&meta, property)?;
        let chain = self.resolve_requested(groups)?;
        if meta.default_sequence_redefined() {
            chain.assert_default_group_sequence_expandable(meta.default_group_sequence())?;
        }

        let mut ctx = ValidationContext::new(Some(bean.clone()), self.options.fail_fast);
        let value_ctx = ValueContext::for_bean(bean.clone(), Path::root());
        self.drive_single_property(&mut ctx, &value_ctx, &meta, property_meta, &chain);
        Ok(ctx.into_violations())
    }

    /// Validates a hypothetical value for one property of a type, with no
    /// instance involved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the type declares no such
    /// property, plus everything [`Validator::validate`] can return.
    pub fn validate_value(
        &self,
        type_token: TypeToken,
        property: &str,
        value: &Value,
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        let meta = self.registry.bean_metadata(type_token)?;
        let property_meta = Self::lookup_property(&meta, property)?;
        let chain = self.resolve_requested(groups)?;
        if meta.default_sequence_redefined() {
            chain.assert_default_group_sequence_expandable(meta.default_group_sequence())?;
        }

        let mut ctx = ValidationContext::new(None, self.options.fail_fast);
        let value_ctx = ValueContext::for_value(value.clone());
        self.drive_single_property(&mut ctx, &value_ctx, &meta, property_meta, &chain);
        Ok(ctx.into_violations())
    }

    /// Validates the arguments of a method call on `bean`.
    ///
    /// Runs cross-parameter constraints, per-parameter constraints and
    /// parameter cascades under the resolved groups.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the type declares no constrained
    /// method with this signature or the argument list does not cover every
    /// declared parameter, plus everything [`Validator::validate`] can return.
    pub fn validate_parameters(
        &self,
        bean: &BeanHandle,
        signature: &str,
        arguments: &[Value],
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        let meta = self.registry.bean_metadata(bean.type_token())?;
        let executable = Self::lookup_executable(&meta, signature, ExecutableKind::Method)?;
        self.validate_parameters_with(Some(bean), &meta, executable, arguments, groups)
    }

    /// Validates the arguments of a constructor call for `constructed`.
    ///
    /// There is no instance yet, so violations carry no root bean.
    ///
    /// # Errors
    ///
    /// Same contract as [`Validator::validate_parameters`], against the
    /// constructor metadata of the constructed type.
    pub fn validate_constructor_parameters(
        &self,
        constructed: TypeToken,
        signature: &str,
        arguments: &[Value],
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        let meta = self.registry.bean_metadata(constructed)?;
        let executable = Self::lookup_executable(&meta, signature, ExecutableKind::Constructor)?;
        self.validate_parameters_with(None, &meta, executable, arguments, groups)
    }

    /// Validates the value returned by a method call on `bean`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the type declares no constrained
    /// method with this signature, plus everything [`Validator::validate`] can
    /// return.
    pub fn validate_return_value(
        &self,
        bean: &BeanHandle,
        signature: &str,
        returned: &Value,
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        let meta = self.registry.bean_metadata(bean.type_token())?;
        let executable = Self::lookup_executable(&meta, signature, ExecutableKind::Method)?;
        self.validate_return_value_with(Some(bean), &meta, executable, returned, groups)
    }

    /// Validates a freshly constructed instance as the return value of its
    /// constructor.
    ///
    /// The created object is both the validated value and the root the
    /// violations report.
    ///
    /// # Errors
    ///
    /// Same contract as [`Validator::validate_return_value`], against the
    /// constructor metadata of the constructed type.
    pub fn validate_constructor_return_value(
        &self,
        constructed: TypeToken,
        signature: &str,
        created: &BeanHandle,
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        let meta = self.registry.bean_metadata(constructed)?;
        let executable = Self::lookup_executable(&meta, signature, ExecutableKind::Constructor)?;
        let returned = Value::Bean(created.clone());
        self.validate_return_value_with(Some(created), &meta, executable, &returned, groups)
    }

    /// An empty request means `Default`; anything else resolves as written.
    fn resolve_requested(&self, groups: &[GroupToken]) -> Result<GroupChain> {
        if groups.is_empty() {
            return self.resolver.resolve(&[GroupToken::DEFAULT]);
        }
        self.resolver.resolve(groups)
    }

    fn lookup_property<'a>(
        meta: &'a Arc<BeanMetaData>,
        property: &str,
    ) -> Result<&'a PropertyMetaData> {
        meta.property(property).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "property '{property}' is not defined on type '{}'",
                meta.type_name()
            ))
        })
    }

    fn lookup_executable<'a>(
        meta: &'a Arc<BeanMetaData>,
        signature: &str,
        kind: ExecutableKind,
    ) -> Result<&'a ExecutableMetaData> {
        let executable = meta.executable(signature).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "no constrained executable '{signature}' is declared on type '{}'",
                meta.type_name()
            ))
        })?;
        if executable.kind() != kind {
            return Err(Error::InvalidArgument(format!(
                "executable '{signature}' on type '{}' is a {}, not a {kind}",
                meta.type_name(),
                executable.kind()
            )));
        }
        Ok(executable)
    }

    /// The one full traversal step for one bean: constraints for every
    /// standalone group, cascades for every standalone group, then sequences
    /// member by member.
    fn validate_in_context(
        &self,
        ctx: &mut ValidationContext,
        value_ctx: &ValueContext,
        chain: &GroupChain,
    ) -> Result<()> {
        let Some(bean) = value_ctx.bean() else {
            return Ok(());
        };
        let meta = self.registry.bean_metadata(bean.type_token())?;
        if meta.default_sequence_redefined() {
            chain.assert_default_group_sequence_expandable(meta.default_group_sequence())?;
        }

        for group in chain.groups() {
            self.validate_constraints_for_group(ctx, value_ctx, &meta, *group)?;
            if ctx.should_stop() {
                return Ok(());
            }
        }

        for group in chain.groups() {
            self.validate_cascades_for_group(ctx, value_ctx, &meta, *group)?;
            if ctx.should_stop() {
                return Ok(());
            }
        }

        for sequence in chain.sequences() {
            for member in sequence.groups() {
                let before = ctx.violation_count();
                self.validate_constraints_for_group(ctx, value_ctx, &meta, *member)?;
                if ctx.should_stop() {
                    return Ok(());
                }
                self.validate_cascades_for_group(ctx, value_ctx, &meta, *member)?;
                if ctx.should_stop() {
                    return Ok(());
                }
                if ctx.violation_count() > before {
                    // A failed member invalidates everything scheduled after it,
                    // not just the rest of its sequence.
                    ctx.stop();
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    fn validate_constraints_for_group(
        &self,
        ctx: &mut ValidationContext,
        value_ctx: &ValueContext,
        meta: &Arc<BeanMetaData>,
        group: Group,
    ) -> Result<()> {
        let Some(bean) = value_ctx.bean() else {
            return Ok(());
        };
        if group.is_default() {
            return self.validate_constraints_for_default_group(ctx, value_ctx, bean, meta);
        }

        for constraint in meta.all_meta_constraints() {
            if !constraint.descriptor().matches_group(group.token()) {
                continue;
            }
            self.validate_meta_constraint(ctx, value_ctx, constraint, group.token());
            if ctx.should_stop() {
                return Ok(());
            }
        }
        ctx.mark_processed(bean, group.token());
        Ok(())
    }

    /// The `Default` group walks the class hierarchy so that a class redefining
    /// its default group sequence substitutes it for its own constraints only.
    ///
    /// Each hierarchy class validates its direct constraints under its own
    /// default sequence, short-circuiting between members. A redefining class
    /// validates its full constraint set and ends the walk. Constraints
    /// inherited into several classes from a shared supertype run only for the
    /// first class that claims their declaring type.
    fn validate_constraints_for_default_group(
        &self,
        ctx: &mut ValidationContext,
        value_ctx: &ValueContext,
        bean: &BeanHandle,
        meta: &Arc<BeanMetaData>,
    ) -> Result<()> {
        let mut claimed: HashMap<TypeToken, TypeToken> = HashMap::new();

        for hosting in meta.class_hierarchy() {
            let hosting_meta = if *hosting == meta.type_token() {
                meta.clone()
            } else {
                self.registry.bean_metadata(*hosting)?
            };
            let redefined = hosting_meta.default_sequence_redefined();
            let constraints = if redefined {
                hosting_meta.all_meta_constraints()
            } else {
                hosting_meta.direct_meta_constraints()
            };

            for member in hosting_meta.default_group_sequence() {
                let mut member_passed = true;
                for constraint in constraints {
                    if let Some(previous) = claimed.get(&constraint.declaring_type()) {
                        if previous != hosting {
                            continue;
                        }
                    }
                    claimed.insert(constraint.declaring_type(), *hosting);
                    if !constraint.descriptor().matches_group(*member) {
                        continue;
                    }
                    if self.validate_meta_constraint(ctx, value_ctx, constraint, *member) {
                        member_passed = false;
                    }
                    if ctx.should_stop() {
                        return Ok(());
                    }
                }
                if !member_passed {
                    break;
                }
            }

            ctx.mark_processed(bean, GroupToken::DEFAULT);
            if redefined {
                break;
            }
        }

        Ok(())
    }

    /// Evaluates one bean-hosted meta-constraint; returns true if it produced
    /// at least one violation.
    fn validate_meta_constraint(
        &self,
        ctx: &mut ValidationContext,
        value_ctx: &ValueContext,
        constraint: &MetaConstraint,
        group: GroupToken,
    ) -> bool {
        match constraint.location() {
            ConstraintLocation::Type => {
                let Some(bean) = value_ctx.bean() else {
                    return false;
                };
                let value = Value::Bean(bean.clone());
                self.evaluate_tree(
                    ctx,
                    value_ctx.bean(),
                    value_ctx.path(),
                    &value,
                    constraint.descriptor(),
                    group,
                    false,
                )
            }
            ConstraintLocation::Property { name, .. } => {
                let value = value_ctx.property_value(name);
                let path = value_ctx.path().append(PathNode::property(name));
                self.evaluate_tree(
                    ctx,
                    value_ctx.bean(),
                    &path,
                    &value,
                    constraint.descriptor(),
                    group,
                    false,
                )
            }
            ConstraintLocation::ContainerElement { property, slot } => {
                let container = value_ctx.property_value(property);
                let base = value_ctx.path().append(PathNode::property(property));
                self.validate_elements(
                    ctx,
                    value_ctx.bean(),
                    &base,
                    &container,
                    *slot,
                    constraint.descriptor(),
                    group,
                )
            }
            // Executable-hosted constraints are driven by the parameter and
            // return value entry points and never reach the bean traversal.
            _ => false,
        }
    }

    /// Evaluates one descriptor per element of a container value; returns true
    /// if any element produced a violation. Null and shape-mismatched
    /// containers hold no elements to check.
    fn validate_elements(
        &self,
        ctx: &mut ValidationContext,
        leaf: Option<&BeanHandle>,
        base: &Path,
        container: &Value,
        slot: ContainerSlot,
        descriptor: &Arc<ConstraintDescriptor>,
        group: GroupToken,
    ) -> bool {
        let mut failed = false;
        match (container, slot) {
            (Value::List(items), ContainerSlot::ListElement) => {
                for (index, item) in items.iter().enumerate() {
                    let path = base.append(PathNode::Index(index));
                    failed |= self.evaluate_tree(ctx, leaf, &path, item, descriptor, group, false);
                    if ctx.should_stop() {
                        return failed;
                    }
                }
            }
            (Value::Set(items), ContainerSlot::SetElement) => {
                for item in items {
                    let path = base.append(PathNode::IterableElement);
                    failed |= self.evaluate_tree(ctx, leaf, &path, item, descriptor, group, false);
                    if ctx.should_stop() {
                        return failed;
                    }
                }
            }
            (Value::Map(entries), ContainerSlot::MapValue) => {
                for (key, value) in entries {
                    let path = base.append(PathNode::key(key.key_display()));
                    failed |= self.evaluate_tree(ctx, leaf, &path, value, descriptor, group, false);
                    if ctx.should_stop() {
                        return failed;
                    }
                }
            }
            (Value::Map(entries), ContainerSlot::MapKey) => {
                for (key, _) in entries {
                    let path = base
                        .append(PathNode::key(key.key_display()))
                        .append(PathNode::MapKey);
                    failed |= self.evaluate_tree(ctx, leaf, &path, key, descriptor, group, false);
                    if ctx.should_stop() {
                        return failed;
                    }
                }
            }
            _ => {}
        }
        failed
    }

    /// Evaluates a descriptor tree against one value; returns true if anything
    /// in the tree failed.
    ///
    /// Composing descriptors evaluate first, then the descriptor's own
    /// validator. With report-as-single-violation the parts stay silent and one
    /// violation is recorded for the composed declaration; `silent` carries
    /// that suppression down the tree. A validator error is logged and treated
    /// as a pass.
    #[allow(clippy::too_many_arguments)]
    fn evaluate_tree(
        &self,
        ctx: &mut ValidationContext,
        leaf: Option<&BeanHandle>,
        path: &Path,
        value: &Value,
        descriptor: &Arc<ConstraintDescriptor>,
        group: GroupToken,
        silent: bool,
    ) -> bool {
        let report_single = descriptor.is_report_as_single_violation();
        let mut failed = false;

        for composing in descriptor.composing() {
            failed |= self.evaluate_tree(
                ctx,
                leaf,
                path,
                value,
                composing,
                group,
                silent || report_single,
            );
            if ctx.should_stop() {
                return failed;
            }
        }

        if let Some(validator) = descriptor.validator() {
            match validator.is_valid(value) {
                Ok(true) => {}
                Ok(false) => {
                    failed = true;
                    if !silent && !report_single {
                        ctx.record(leaf, path, value, descriptor, group);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        constraint = descriptor.kind(),
                        path = %path,
                        error = %error,
                        "constraint validator failed to execute, treating as passed"
                    );
                }
            }
        }

        if failed && report_single && !silent {
            ctx.record(leaf, path, value, descriptor, group);
        }

        failed
    }

    fn validate_cascades_for_group(
        &self,
        ctx: &mut ValidationContext,
        value_ctx: &ValueContext,
        meta: &Arc<BeanMetaData>,
        group: Group,
    ) -> Result<()> {
        let Some(bean) = value_ctx.bean() else {
            return Ok(());
        };
        for property in meta.properties() {
            if !property.is_cascading() {
                continue;
            }
            let value = bean.property(property.name());
            let path = value_ctx.path().append(PathNode::property(property.name()));
            self.cascade_value(ctx, &path, &value, property.cascading(), group)?;
            if ctx.should_stop() {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Descends across one cascaded edge: straight into a bean, or per element
    /// for containers. Scalar and null values end the walk.
    fn cascade_value(
        &self,
        ctx: &mut ValidationContext,
        path: &Path,
        value: &Value,
        cascading: &CascadingMetaData,
        group: Group,
    ) -> Result<()> {
        match value {
            Value::Bean(child) => {
                if cascading.is_cascading() {
                    let converted = cascading.convert_group(group.token());
                    self.cascade_into_bean(ctx, path.clone(), child, group, converted)?;
                }
                Ok(())
            }
            Value::List(items) => {
                let Some(converted) =
                    element_conversion(cascading, ContainerSlot::ListElement, group.token(), true)
                else {
                    return Ok(());
                };
                for (index, item) in items.iter().enumerate() {
                    let Value::Bean(child) = item else { continue };
                    self.cascade_into_bean(
                        ctx,
                        path.append(PathNode::Index(index)),
                        child,
                        group,
                        converted,
                    )?;
                    if ctx.should_stop() {
                        return Ok(());
                    }
                }
                Ok(())
            }
            Value::Set(items) => {
                let Some(converted) =
                    element_conversion(cascading, ContainerSlot::SetElement, group.token(), true)
                else {
                    return Ok(());
                };
                for item in items {
                    let Value::Bean(child) = item else { continue };
                    self.cascade_into_bean(
                        ctx,
                        path.append(PathNode::IterableElement),
                        child,
                        group,
                        converted,
                    )?;
                    if ctx.should_stop() {
                        return Ok(());
                    }
                }
                Ok(())
            }
            Value::Map(entries) => {
                let key_edge =
                    element_conversion(cascading, ContainerSlot::MapKey, group.token(), false);
                let value_edge =
                    element_conversion(cascading, ContainerSlot::MapValue, group.token(), true);
                if key_edge.is_none() && value_edge.is_none() {
                    return Ok(());
                }
                for (key, entry_value) in entries {
                    if let (Some(converted), Value::Bean(child)) = (key_edge, key) {
                        self.cascade_into_bean(
                            ctx,
                            path.append(PathNode::key(key.key_display()))
                                .append(PathNode::MapKey),
                            child,
                            group,
                            converted,
                        )?;
                        if ctx.should_stop() {
                            return Ok(());
                        }
                    }
                    if let (Some(converted), Value::Bean(child)) = (value_edge, entry_value) {
                        self.cascade_into_bean(
                            ctx,
                            path.append(PathNode::key(key.key_display())),
                            child,
                            group,
                            converted,
                        )?;
                        if ctx.should_stop() {
                            return Ok(());
                        }
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Re-enters the traversal for one reached bean unless the processed set
    /// already covers it under the target group. A group produced by a
    /// conversion is re-resolved in full; an unconverted group passes through
    /// as-is since the surrounding loop already iterates a resolved order.
    fn cascade_into_bean(
        &self,
        ctx: &mut ValidationContext,
        path: Path,
        child: &BeanHandle,
        original: Group,
        converted: GroupToken,
    ) -> Result<()> {
        if ctx.is_processed(child, converted) {
            return Ok(());
        }
        let chain = self
            .resolver
            .resolve_cascaded(Group::new(converted), converted != original.token())?;
        let child_ctx = ValueContext::for_bean(child.clone(), path);
        self.validate_in_context(ctx, &child_ctx, &chain)
    }

    fn drive_single_property(
        &self,
        ctx: &mut ValidationContext,
        value_ctx: &ValueContext,
        meta: &Arc<BeanMetaData>,
        property_meta: &PropertyMetaData,
        chain: &GroupChain,
    ) {
        for group in chain.groups() {
            self.validate_property_for_group(ctx, value_ctx, meta, property_meta, *group);
            if ctx.should_stop() {
                return;
            }
        }

        for sequence in chain.sequences() {
            for member in sequence.groups() {
                let before = ctx.violation_count();
                self.validate_property_for_group(ctx, value_ctx, meta, property_meta, *member);
                if ctx.should_stop() {
                    return;
                }
                if ctx.violation_count() > before {
                    ctx.stop();
                    return;
                }
            }
        }
    }

    fn validate_property_for_group(
        &self,
        ctx: &mut ValidationContext,
        value_ctx: &ValueContext,
        meta: &BeanMetaData,
        property_meta: &PropertyMetaData,
        group: Group,
    ) {
        for member in substituted_members(meta, group) {
            let before = ctx.violation_count();
            for constraint in property_meta
                .constraints()
                .iter()
                .chain(property_meta.container_constraints())
            {
                if !constraint.descriptor().matches_group(member) {
                    continue;
                }
                self.validate_meta_constraint(ctx, value_ctx, constraint, member);
                if ctx.should_stop() {
                    return;
                }
            }
            if ctx.violation_count() > before {
                return;
            }
        }
    }

    fn validate_parameters_with(
        &self,
        leaf: Option<&BeanHandle>,
        meta: &Arc<BeanMetaData>,
        executable: &ExecutableMetaData,
        arguments: &[Value],
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        Self::check_arguments(executable, arguments, meta.type_name())?;
        let chain = self.resolve_requested(groups)?;
        if meta.default_sequence_redefined() {
            chain.assert_default_group_sequence_expandable(meta.default_group_sequence())?;
        }

        let mut ctx = ValidationContext::new(leaf.cloned(), self.options.fail_fast);
        self.drive_parameters(&mut ctx, leaf, meta, executable, arguments, &chain)?;
        Ok(ctx.into_violations())
    }

    fn drive_parameters(
        &self,
        ctx: &mut ValidationContext,
        leaf: Option<&BeanHandle>,
        meta: &Arc<BeanMetaData>,
        executable: &ExecutableMetaData,
        arguments: &[Value],
        chain: &GroupChain,
    ) -> Result<()> {
        for group in chain.groups() {
            self.validate_parameters_for_group(ctx, leaf, meta, executable, arguments, *group);
            if ctx.should_stop() {
                return Ok(());
            }
        }

        for group in chain.groups() {
            self.validate_parameter_cascades(ctx, executable, arguments, *group)?;
            if ctx.should_stop() {
                return Ok(());
            }
        }

        for sequence in chain.sequences() {
            for member in sequence.groups() {
                let before = ctx.violation_count();
                self.validate_parameters_for_group(ctx, leaf, meta, executable, arguments, *member);
                if ctx.should_stop() {
                    return Ok(());
                }
                self.validate_parameter_cascades(ctx, executable, arguments, *member)?;
                if ctx.should_stop() {
                    return Ok(());
                }
                if ctx.violation_count() > before {
                    ctx.stop();
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    /// Cross-parameter constraints first, then per-parameter constraints with
    /// their container elements. A `Default` request substitutes the hosting
    /// type's redefined default sequence, honored only from the hosting type
    /// itself, with short-circuit between members.
    fn validate_parameters_for_group(
        &self,
        ctx: &mut ValidationContext,
        leaf: Option<&BeanHandle>,
        meta: &BeanMetaData,
        executable: &ExecutableMetaData,
        arguments: &[Value],
        group: Group,
    ) {
        let executable_path = Path::executable(executable.name());
        let cross_parameter_value = Value::List(arguments.to_vec());
        let cross_path = executable_path.append(PathNode::CrossParameter);

        for member in substituted_members(meta, group) {
            let before = ctx.violation_count();

            for constraint in executable.cross_parameter_constraints() {
                if !constraint.descriptor().matches_group(member) {
                    continue;
                }
                self.evaluate_tree(
                    ctx,
                    leaf,
                    &cross_path,
                    &cross_parameter_value,
                    constraint.descriptor(),
                    member,
                    false,
                );
                if ctx.should_stop() {
                    return;
                }
            }

            for parameter in executable.parameters() {
                let value = &arguments[parameter.index()];
                let path = executable_path.append(PathNode::parameter(parameter.name()));

                for constraint in parameter.constraints() {
                    if !constraint.descriptor().matches_group(member) {
                        continue;
                    }
                    self.evaluate_tree(
                        ctx,
                        leaf,
                        &path,
                        value,
                        constraint.descriptor(),
                        member,
                        false,
                    );
                    if ctx.should_stop() {
                        return;
                    }
                }

                for constraint in parameter.container_constraints() {
                    if !constraint.descriptor().matches_group(member) {
                        continue;
                    }
                    let ConstraintLocation::ParameterContainerElement { slot, .. } =
                        constraint.location()
                    else {
                        continue;
                    };
                    self.validate_elements(
                        ctx,
                        leaf,
                        &path,
                        value,
                        *slot,
                        constraint.descriptor(),
                        member,
                    );
                    if ctx.should_stop() {
                        return;
                    }
                }
            }

            if ctx.violation_count() > before {
                return;
            }
        }
    }

    fn validate_parameter_cascades(
        &self,
        ctx: &mut ValidationContext,
        executable: &ExecutableMetaData,
        arguments: &[Value],
        group: Group,
    ) -> Result<()> {
        let executable_path = Path::executable(executable.name());
        for parameter in executable.parameters() {
            if !parameter.is_cascading() {
                continue;
            }
            let value = &arguments[parameter.index()];
            let path = executable_path.append(PathNode::parameter(parameter.name()));
            self.cascade_value(ctx, &path, value, parameter.cascading(), group)?;
            if ctx.should_stop() {
                return Ok(());
            }
        }
        Ok(())
    }

    fn validate_return_value_with(
        &self,
        leaf: Option<&BeanHandle>,
        meta: &Arc<BeanMetaData>,
        executable: &ExecutableMetaData,
        returned: &Value,
        groups: &[GroupToken],
    ) -> Result<ViolationSet> {
        let chain = self.resolve_requested(groups)?;
        if meta.default_sequence_redefined() {
            chain.assert_default_group_sequence_expandable(meta.default_group_sequence())?;
        }

        let mut ctx = ValidationContext::new(leaf.cloned(), self.options.fail_fast);
        self.drive_return_value(&mut ctx, leaf, meta, executable, returned, &chain)?;
        Ok(ctx.into_violations())
    }

    fn drive_return_value(
        &self,
        ctx: &mut ValidationContext,
        leaf: Option<&BeanHandle>,
        meta: &Arc<BeanMetaData>,
        executable: &ExecutableMetaData,
        returned: &Value,
        chain: &GroupChain,
    ) -> Result<()> {
        for group in chain.groups() {
            self.validate_return_value_for_group(ctx, leaf, meta, executable, returned, *group);
            if ctx.should_stop() {
                return Ok(());
            }
        }

        for group in chain.groups() {
            self.validate_return_cascade(ctx, executable, returned, *group)?;
            if ctx.should_stop() {
                return Ok(());
            }
        }

        for sequence in chain.sequences() {
            for member in sequence.groups() {
                let before = ctx.violation_count();
                self.validate_return_value_for_group(
                    ctx, leaf, meta, executable, returned, *member,
                );
                if ctx.should_stop() {
                    return Ok(());
                }
                self.validate_return_cascade(ctx, executable, returned, *member)?;
                if ctx.should_stop() {
                    return Ok(());
                }
                if ctx.violation_count() > before {
                    ctx.stop();
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    fn validate_return_value_for_group(
        &self,
        ctx: &mut ValidationContext,
        leaf: Option<&BeanHandle>,
        meta: &BeanMetaData,
        executable: &ExecutableMetaData,
        returned: &Value,
        group: Group,
    ) {
        let base = Path::executable(executable.name()).append(PathNode::ReturnValue);

        for member in substituted_members(meta, group) {
            let before = ctx.violation_count();

            for constraint in executable.return_constraints() {
                if !constraint.descriptor().matches_group(member) {
                    continue;
                }
                self.evaluate_tree(
                    ctx,
                    leaf,
                    &base,
                    returned,
                    constraint.descriptor(),
                    member,
                    false,
                );
                if ctx.should_stop() {
                    return;
                }
            }

            for constraint in executable.return_container_constraints() {
                if !constraint.descriptor().matches_group(member) {
                    continue;
                }
                let ConstraintLocation::ReturnValueContainerElement { slot, .. } =
                    constraint.location()
                else {
                    continue;
                };
                self.validate_elements(
                    ctx,
                    leaf,
                    &base,
                    returned,
                    *slot,
                    constraint.descriptor(),
                    member,
                );
                if ctx.should_stop() {
                    return;
                }
            }

            if ctx.violation_count() > before {
                return;
            }
        }
    }

    fn validate_return_cascade(
        &self,
        ctx: &mut ValidationContext,
        executable: &ExecutableMetaData,
        returned: &Value,
        group: Group,
    ) -> Result<()> {
        if !executable.return_cascading().requires_traversal() {
            return Ok(());
        }
        let base = Path::executable(executable.name()).append(PathNode::ReturnValue);
        self.cascade_value(ctx, &base, returned, executable.return_cascading(), group)
    }

    fn check_arguments(
        executable: &ExecutableMetaData,
        arguments: &[Value],
        type_name: &str,
    ) -> Result<()> {
        for parameter in executable.parameters() {
            if parameter.index() >= arguments.len() {
                return Err(Error::InvalidArgument(format!(
                    "executable '{}' on type '{type_name}' declares parameter '{}' at position {} but only {} argument(s) were passed",
                    executable.signature(),
                    parameter.name(),
                    parameter.index(),
                    arguments.len()
                )));
            }
        }
        Ok(())
    }
}

/// The group list one non-traversing validation step runs under: the hosting
/// type's expanded default sequence when `Default` was requested and the type
/// redefines it, otherwise the group itself.
fn substituted_members(meta: &BeanMetaData, group: Group) -> Vec<GroupToken> {
    if group.is_default() && meta.default_sequence_redefined() {
        meta.default_group_sequence().to_vec()
    } else {
        vec![group.token()]
    }
}

/// The group a container element cascades under, or `None` when the edge does
/// not cascade. A slot declaration marks its own edge; value positions also
/// honor the element-level cascade flag, so a plain cascade on a collection
/// property descends into its elements. Map keys cascade only when their slot
/// says so.
fn element_conversion(
    cascading: &CascadingMetaData,
    slot: ContainerSlot,
    group: GroupToken,
    element_flag: bool,
) -> Option<GroupToken> {
    if let Some(container) = cascading.container(slot) {
        if container.is_cascading() {
            return Some(container.convert_group(group));
        }
    }
    if element_flag && cascading.is_cascading() {
        return Some(cascading.convert_group(group));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::metadata::descriptor::{
        AttributeBag, AttributeValue, ConstraintDef, ConstraintKindDef, ConstraintValidator,
    };
    use crate::metadata::raw::{
        ConfigurationSource, ConstrainedContainerElement, ConstrainedExecutable,
        ConstrainedParameter, ConstrainedProperty, DefaultSequenceMember, TypeConfiguration,
    };
    use crate::metadata::registry::TypeDef;
    use crate::metadata::shape::{ShapeSet, ValueShape};
    use crate::value::ValidatableBean;

    struct NotNullCheck;

    impl ConstraintValidator for NotNullCheck {
        fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
            Ok(())
        }

        fn is_valid(&self, value: &Value) -> Result<bool> {
            Ok(!value.is_null())
        }
    }

    struct MaxLenCheck {
        max: i64,
    }

    impl ConstraintValidator for MaxLenCheck {
        fn initialize(&mut self, attributes: &AttributeBag) -> Result<()> {
            match attributes.get("max") {
                Some(AttributeValue::Int(max)) => {
                    self.max = *max;
                    Ok(())
                }
                _ => Err(declaration_error!("'max' attribute is required")),
            }
        }

        fn is_valid(&self, value: &Value) -> Result<bool> {
            Ok(value
                .element_count()
                .map_or(true, |len| len as i64 <= self.max))
        }
    }

    struct RejectCheck;

    impl ConstraintValidator for RejectCheck {
        fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
            Ok(())
        }

        fn is_valid(&self, _value: &Value) -> Result<bool> {
            Ok(false)
        }
    }

    struct BrokenCheck;

    impl ConstraintValidator for BrokenCheck {
        fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
            Ok(())
        }

        fn is_valid(&self, _value: &Value) -> Result<bool> {
            Err(Error::Validation("validator exploded".to_string()))
        }
    }

    fn registry() -> Arc<MetadataRegistry> {
        let registry = MetadataRegistry::new();
        registry
            .register_constraint(
                ConstraintKindDef::new("NotNull")
                    .with_default_message("must not be null")
                    .with_validator(ShapeSet::ANY, || Box::new(NotNullCheck)),
            )
            .unwrap();
        registry
            .register_constraint(
                ConstraintKindDef::new("MaxLen")
                    .with_default_message("too long")
                    .with_validator(ShapeSet::SIZED, || Box::new(MaxLenCheck { max: 0 })),
            )
            .unwrap();
        registry
            .register_constraint(
                ConstraintKindDef::new("Reject")
                    .with_default_message("rejected")
                    .with_validator(ShapeSet::ANY, || Box::new(RejectCheck)),
            )
            .unwrap();
        registry
            .register_constraint(
                ConstraintKindDef::new("Broken")
                    .with_default_message("never reported")
                    .with_validator(ShapeSet::ANY, || Box::new(BrokenCheck)),
            )
            .unwrap();
        Arc::new(registry)
    }

    struct TestBean {
        token: TypeToken,
        properties: Mutex<HashMap<String, Value>>,
    }

    impl TestBean {
        fn new(token: TypeToken) -> Arc<TestBean> {
            Arc::new(TestBean {
                token,
                properties: Mutex::new(HashMap::new()),
            })
        }
    }

    impl ValidatableBean for TestBean {
        fn type_token(&self) -> TypeToken {
            self.token
        }

        fn property(&self, name: &str) -> Value {
            self.properties
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .unwrap_or(Value::Null)
        }
    }

    fn set(bean: &Arc<TestBean>, name: &str, value: Value) {
        bean.properties
            .lock()
            .unwrap()
            .insert(name.to_string(), value);
    }

    fn handle(bean: &Arc<TestBean>) -> BeanHandle {
        BeanHandle::from_arc(bean.clone())
    }

    fn address_type(registry: &MetadataRegistry) -> TypeToken {
        let address = registry.register_type(TypeDef::new("Address")).unwrap();
        registry
            .contribute(
                address,
                ConfigurationSource::Annotation,
                TypeConfiguration::new()
                    .with_property(
                        ConstrainedProperty::field("street", ValueShape::Str)
                            .with_constraint(ConstraintDef::new("NotNull")),
                    )
                    .with_property(
                        ConstrainedProperty::field("city", ValueShape::Str)
                            .with_constraint(ConstraintDef::new("NotNull")),
                    ),
            )
            .unwrap();
        address
    }

    #[test]
    fn test_validate_reports_failing_property() {
        let registry = registry();
        let address = address_type(&registry);
        let bean = TestBean::new(address);
        set(&bean, "city", Value::from("Berlin"));

        let validator = Validator::new(registry);
        let violations = validator
            .validate(&handle(&bean), &[GroupToken::DEFAULT])
            .unwrap();

        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.path().to_string(), "street");
        assert_eq!(violation.constraint_kind(), "NotNull");
        assert_eq!(violation.message(), "must not be null");
        assert_eq!(violation.group(), GroupToken::DEFAULT);
        assert!(violation.invalid_value().is_null());
        assert_eq!(violation.root_bean().unwrap(), &handle(&bean));
        assert_eq!(violation.leaf_bean().unwrap(), &handle(&bean));

        // An empty group request means Default.
        let defaulted = validator.validate(&handle(&bean), &[]).unwrap();
        assert_eq!(defaulted.len(), 1);
    }

    #[test]
    fn test_validate_clean_bean_collects_nothing() {
        let registry = registry();
        let address = address_type(&registry);
        let bean = TestBean::new(address);
        set(&bean, "street", Value::from("Unter den Linden"));
        set(&bean, "city", Value::from("Berlin"));

        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&bean), &[]).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_cyclic_graph_terminates_and_validates_each_bean_once() {
        let registry = registry();
        let node = registry.register_type(TypeDef::new("Node")).unwrap();
        registry
            .contribute(
                node,
                ConfigurationSource::Annotation,
                TypeConfiguration::new()
                    .with_property(
                        ConstrainedProperty::field("name", ValueShape::Str)
                            .with_constraint(ConstraintDef::new("NotNull")),
                    )
                    .with_property(
                        ConstrainedProperty::field("partner", ValueShape::Bean).cascading(),
                    ),
            )
            .unwrap();

        let left = TestBean::new(node);
        let right = TestBean::new(node);
        set(&left, "partner", Value::Bean(handle(&right)));
        set(&right, "partner", Value::Bean(handle(&left)));

        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&left), &[]).unwrap();

        assert_eq!(violations.len(), 2);
        let paths: Vec<String> = violations.iter().map(|v| v.path().to_string()).collect();
        assert_eq!(paths, vec!["name", "partner.name"]);
    }

    #[test]
    fn test_diamond_validates_shared_leaf_once_per_group() {
        let registry = registry();
        let leaf = registry.register_type(TypeDef::new("Leaf")).unwrap();
        registry
            .contribute(
                leaf,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("name", ValueShape::Str)
                        .with_constraint(ConstraintDef::new("NotNull")),
                ),
            )
            .unwrap();
        let mid = registry.register_type(TypeDef::new("Mid")).unwrap();
        registry
            .contribute(
                mid,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("next", ValueShape::Bean).cascading(),
                ),
            )
            .unwrap();
        let root = registry.register_type(TypeDef::new("Root")).unwrap();
        registry
            .contribute(
                root,
                ConfigurationSource::Annotation,
                TypeConfiguration::new()
                    .with_property(
                        ConstrainedProperty::field("first", ValueShape::Bean).cascading(),
                    )
                    .with_property(
                        ConstrainedProperty::field("second", ValueShape::Bean).cascading(),
                    ),
            )
            .unwrap();

        let shared = TestBean::new(leaf);
        let left = TestBean::new(mid);
        let right = TestBean::new(mid);
        set(&left, "next", Value::Bean(handle(&shared)));
        set(&right, "next", Value::Bean(handle(&shared)));
        let top = TestBean::new(root);
        set(&top, "first", Value::Bean(handle(&left)));
        set(&top, "second", Value::Bean(handle(&right)));

        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&top), &[]).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].path().to_string(), "first.next.name");
    }

    #[test]
    fn test_fail_fast_stops_after_first_violation() {
        let registry = registry();
        let address = address_type(&registry);
        let bean = TestBean::new(address);

        let collecting = Validator::new(registry.clone());
        assert_eq!(collecting.validate(&handle(&bean), &[]).unwrap().len(), 2);

        let failing_fast = Validator::with_options(registry, ValidationOptions::fail_fast());
        assert!(failing_fast.options().fail_fast);
        assert_eq!(failing_fast.validate(&handle(&bean), &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_sequence_member_failure_stops_validation() {
        let registry = registry();
        let basic = registry.register_group("Basic").unwrap();
        let complete = registry.register_group("Complete").unwrap();
        let ordered = registry.register_sequence("Ordered", &[basic, complete]).unwrap();

        let account = registry.register_type(TypeDef::new("Account")).unwrap();
        registry
            .contribute(
                account,
                ConfigurationSource::Annotation,
                TypeConfiguration::new()
                    .with_property(
                        ConstrainedProperty::field("username", ValueShape::Str)
                            .with_constraint(ConstraintDef::new("NotNull").with_group(basic)),
                    )
                    .with_property(
                        ConstrainedProperty::field("nickname", ValueShape::Str)
                            .with_constraint(ConstraintDef::new("NotNull").with_group(complete)),
                    ),
            )
            .unwrap();

        let bean = TestBean::new(account);
        let validator = Validator::new(registry);

        // Both properties missing: the Basic member fails and Complete never runs.
        let violations = validator.validate(&handle(&bean), &[ordered]).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].group(), basic);

        set(&bean, "username", Value::from("kel"));
        let violations = validator.validate(&handle(&bean), &[ordered]).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].group(), complete);
    }

    #[test]
    fn test_redefined_default_sequence_gates_class_constraint() {
        let registry = registry();
        let strict = registry.register_group("Strict").unwrap();
        let payment = registry.register_type(TypeDef::new("Payment")).unwrap();
        registry
            .contribute(
                payment,
                ConfigurationSource::Annotation,
                TypeConfiguration::new()
                    .with_class_constraint(ConstraintDef::new("Reject").with_group(strict))
                    .with_property(
                        ConstrainedProperty::field("amount", ValueShape::Int)
                            .with_constraint(ConstraintDef::new("NotNull")),
                    )
                    .with_default_group_sequence(vec![
                        DefaultSequenceMember::SelfType,
                        DefaultSequenceMember::Group(strict),
                    ]),
            )
            .unwrap();

        let validator = Validator::new(registry);

        // First member fails, so the class-level check never runs.
        let bean = TestBean::new(payment);
        let violations = validator.validate(&handle(&bean), &[]).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].constraint_kind(), "NotNull");

        // First member passes, second member reports at the root path.
        set(&bean, "amount", Value::Int(10));
        let violations = validator.validate(&handle(&bean), &[]).unwrap();
        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.constraint_kind(), "Reject");
        assert_eq!(violation.group(), strict);
        assert!(violation.path().is_root());
    }

    #[test]
    fn test_cascade_applies_group_conversion() {
        let registry = registry();
        let audit = registry.register_group("Audit").unwrap();
        let child = registry.register_type(TypeDef::new("Child")).unwrap();
        registry
            .contribute(
                child,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("name", ValueShape::Str)
                        .with_constraint(ConstraintDef::new("NotNull").with_group(audit)),
                ),
            )
            .unwrap();
        let parent = registry.register_type(TypeDef::new("Parent")).unwrap();
        registry
            .contribute(
                parent,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("child", ValueShape::Bean)
                        .cascading()
                        .with_group_conversion(GroupToken::DEFAULT, audit),
                ),
            )
            .unwrap();

        let inner = TestBean::new(child);
        let outer = TestBean::new(parent);
        set(&outer, "child", Value::Bean(handle(&inner)));

        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&outer), &[]).unwrap();

        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.path().to_string(), "child.name");
        assert_eq!(violation.group(), audit);
    }

    #[test]
    fn test_list_element_constraints_get_indexed_paths() {
        let registry = registry();
        let post = registry.register_type(TypeDef::new("Post")).unwrap();
        registry
            .contribute(
                post,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("tags", ValueShape::List).with_container_element(
                        ConstrainedContainerElement::new(ContainerSlot::ListElement, ValueShape::Str)
                            .with_constraint(
                                ConstraintDef::new("MaxLen").with_attribute("max", 3i64),
                            ),
                    ),
                ),
            )
            .unwrap();

        let bean = TestBean::new(post);
        set(
            &bean,
            "tags",
            Value::List(vec![Value::from("ok"), Value::from("toolong")]),
        );

        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&bean), &[]).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].path().to_string(), "tags[1]");
        assert_eq!(
            violations.violations()[0].invalid_value(),
            &Value::from("toolong")
        );
    }

    #[test]
    fn test_map_constraints_decorate_key_and_value_paths() {
        let registry = registry();
        let config = registry.register_type(TypeDef::new("Config")).unwrap();
        registry
            .contribute(
                config,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("attrs", ValueShape::Map)
                        .with_container_element(
                            ConstrainedContainerElement::new(ContainerSlot::MapValue, ValueShape::Str)
                                .with_constraint(ConstraintDef::new("NotNull")),
                        )
                        .with_container_element(
                            ConstrainedContainerElement::new(ContainerSlot::MapKey, ValueShape::Str)
                                .with_constraint(
                                    ConstraintDef::new("MaxLen").with_attribute("max", 5i64),
                                ),
                        ),
                ),
            )
            .unwrap();

        let bean = TestBean::new(config);
        set(
            &bean,
            "attrs",
            Value::Map(vec![
                (Value::from("color"), Value::Null),
                (Value::from("verbosity"), Value::from("high")),
            ]),
        );

        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&bean), &[]).unwrap();

        let mut paths: Vec<String> = violations.iter().map(|v| v.path().to_string()).collect();
        paths.sort();
        assert_eq!(paths, vec!["attrs[color]", "attrs[verbosity].<map key>"]);
    }

    #[test]
    fn test_validate_property_touches_only_the_named_property() {
        let registry = registry();
        let address = address_type(&registry);
        let bean = TestBean::new(address);

        let validator = Validator::new(registry);
        let violations = validator
            .validate_property(&handle(&bean), "street", &[])
            .unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].path().to_string(), "street");

        let unknown = validator.validate_property(&handle(&bean), "missing", &[]);
        assert!(matches!(unknown, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_value_works_without_an_instance() {
        let registry = registry();
        let address = address_type(&registry);
        let validator = Validator::new(registry);

        let clean = validator
            .validate_value(address, "street", &Value::from("Unter den Linden"), &[])
            .unwrap();
        assert!(clean.is_empty());

        let violations = validator
            .validate_value(address, "street", &Value::Null, &[])
            .unwrap();
        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.path().to_string(), "street");
        assert!(violation.root_bean().is_none());
        assert!(violation.leaf_bean().is_none());
    }

    #[test]
    fn test_parameter_and_cross_parameter_validation() {
        let registry = registry();
        let service = registry.register_type(TypeDef::new("Service")).unwrap();
        registry
            .contribute(
                service,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_executable(
                    ConstrainedExecutable::method("transfer", "transfer(i64,i64)")
                        .with_parameter(
                            ConstrainedParameter::new(0, "from", ValueShape::Int)
                                .with_constraint(ConstraintDef::new("NotNull")),
                        )
                        .with_parameter(
                            ConstrainedParameter::new(1, "to", ValueShape::Int)
                                .with_constraint(ConstraintDef::new("NotNull")),
                        )
                        .with_cross_parameter_constraint(ConstraintDef::new("Reject")),
                ),
            )
            .unwrap();

        let bean = TestBean::new(service);
        let validator = Validator::new(registry);

        let violations = validator
            .validate_parameters(
                &handle(&bean),
                "transfer(i64,i64)",
                &[Value::Null, Value::Int(5)],
                &[],
            )
            .unwrap();

        let paths: Vec<String> = violations.iter().map(|v| v.path().to_string()).collect();
        assert_eq!(paths, vec!["transfer.<cross-parameter>", "transfer.from"]);

        // Too few arguments for the declared parameters.
        let short = validator.validate_parameters(&handle(&bean), "transfer(i64,i64)", &[], &[]);
        assert!(matches!(short, Err(Error::InvalidArgument(_))));

        // Unknown signature.
        let unknown = validator.validate_parameters(&handle(&bean), "transfer()", &[], &[]);
        assert!(matches!(unknown, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_return_value_constraints_report_under_the_return_node() {
        let registry = registry();
        let service = registry.register_type(TypeDef::new("Service")).unwrap();
        registry
            .contribute(
                service,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_executable(
                    ConstrainedExecutable::method("repair", "repair()")
                        .with_return_shape(ValueShape::Str)
                        .with_return_constraint(
                            ConstraintDef::new("MaxLen").with_attribute("max", 3i64),
                        ),
                ),
            )
            .unwrap();

        let bean = TestBean::new(service);
        let validator = Validator::new(registry);

        let violations = validator
            .validate_return_value(&handle(&bean), "repair()", &Value::from("abcdef"), &[])
            .unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations.violations()[0].path().to_string(),
            "repair.<return value>"
        );
    }

    #[test]
    fn test_constructor_entry_points() {
        let registry = registry();
        let widget = registry.register_type(TypeDef::new("Widget")).unwrap();
        registry
            .contribute(
                widget,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_executable(
                    ConstrainedExecutable::constructor("Widget", "Widget(str)")
                        .with_parameter(
                            ConstrainedParameter::new(0, "label", ValueShape::Str)
                                .with_constraint(ConstraintDef::new("NotNull")),
                        )
                        .with_return_constraint(ConstraintDef::new("Reject")),
                ),
            )
            .unwrap();

        let validator = Validator::new(registry);

        let violations = validator
            .validate_constructor_parameters(widget, "Widget(str)", &[Value::Null], &[])
            .unwrap();
        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.path().to_string(), "Widget.label");
        assert!(violation.root_bean().is_none());

        let created = TestBean::new(widget);
        let violations = validator
            .validate_constructor_return_value(widget, "Widget(str)", &handle(&created), &[])
            .unwrap();
        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.path().to_string(), "Widget.<return value>");
        assert_eq!(violation.root_bean().unwrap(), &handle(&created));

        // A constructor signature is not reachable through the method entry point.
        let bean = TestBean::new(widget);
        let mismatched = validator.validate_parameters(&handle(&bean), "Widget(str)", &[], &[]);
        assert!(matches!(mismatched, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_broken_validator_never_vetoes_a_value() {
        let registry = registry();
        let record = registry.register_type(TypeDef::new("Record")).unwrap();
        registry
            .contribute(
                record,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("id", ValueShape::Str)
                        .with_constraint(ConstraintDef::new("Broken"))
                        .with_constraint(ConstraintDef::new("NotNull")),
                ),
            )
            .unwrap();

        let bean = TestBean::new(record);
        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&bean), &[]).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations.violations()[0].constraint_kind(), "NotNull");
    }

    #[test]
    fn test_composed_constraint_reports_a_single_violation() {
        let registry = registry();
        registry
            .register_constraint(
                ConstraintKindDef::new("ValidHandle").with_default_message("handle is not valid"),
            )
            .unwrap();
        let profile = registry.register_type(TypeDef::new("Profile")).unwrap();
        registry
            .contribute(
                profile,
                ConfigurationSource::Annotation,
                TypeConfiguration::new().with_property(
                    ConstrainedProperty::field("handle", ValueShape::Str).with_constraint(
                        ConstraintDef::new("ValidHandle")
                            .with_composing(ConstraintDef::new("NotNull"))
                            .with_composing(
                                ConstraintDef::new("MaxLen").with_attribute("max", 8i64),
                            )
                            .report_as_single_violation(),
                    ),
                ),
            )
            .unwrap();

        let bean = TestBean::new(profile);
        let validator = Validator::new(registry);
        let violations = validator.validate(&handle(&bean), &[]).unwrap();

        assert_eq!(violations.len(), 1);
        let violation = &violations.violations()[0];
        assert_eq!(violation.constraint_kind(), "ValidHandle");
        assert_eq!(violation.message(), "handle is not valid");
    }
}
