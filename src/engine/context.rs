//! Per-call traversal state.
//!
//! One [`ValidationContext`] lives for the duration of a single entry-point call
//! and owns everything the whole traversal shares: the root bean, the collected
//! violations, the processed set that terminates cyclic object graphs, and the
//! stop latch for fail-fast and sequence aborts. A [`ValueContext`] is the
//! position the traversal currently looks at; cascading creates a fresh one per
//! reached bean while the validation context threads through unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use crate::engine::path::Path;
use crate::engine::violation::{ConstraintViolation, ViolationSet};
use crate::metadata::descriptor::ConstraintDescriptor;
use crate::metadata::token::GroupToken;
use crate::value::{BeanHandle, Value};

/// State shared by one whole validation call.
pub(crate) struct ValidationContext {
    root: Option<BeanHandle>,
    processed: HashSet<(usize, GroupToken)>,
    violations: ViolationSet,
    fail_fast: bool,
    stopped: bool,
}

impl ValidationContext {
    pub(crate) fn new(root: Option<BeanHandle>, fail_fast: bool) -> Self {
        ValidationContext {
            root,
            processed: HashSet::new(),
            violations: ViolationSet::new(),
            fail_fast,
            stopped: false,
        }
    }

    /// Records that `bean` finished its constraint phase under `group`.
    ///
    /// Keyed by bean identity, not equality: two distinct instances with equal
    /// state are still two beans to validate.
    pub(crate) fn mark_processed(&mut self, bean: &BeanHandle, group: GroupToken) {
        self.processed.insert((bean.identity(), group));
    }

    /// Returns true if `bean` was already validated under `group` in this call
    pub(crate) fn is_processed(&self, bean: &BeanHandle, group: GroupToken) -> bool {
        self.processed.contains(&(bean.identity(), group))
    }

    pub(crate) fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Builds and collects one violation; returns false if it deduplicated away
    pub(crate) fn record(
        &mut self,
        leaf: Option<&BeanHandle>,
        path: &Path,
        value: &Value,
        descriptor: &Arc<ConstraintDescriptor>,
        group: GroupToken,
    ) -> bool {
        self.violations.add(ConstraintViolation::new(
            self.root.clone(),
            leaf.cloned(),
            value.clone(),
            path.clone(),
            descriptor.clone(),
            group,
        ))
    }

    /// Returns true once the traversal must unwind: either the fail-fast option
    /// saw a violation or a sequence member failure latched the stop.
    pub(crate) fn should_stop(&self) -> bool {
        self.stopped || (self.fail_fast && !self.violations.is_empty())
    }

    /// Latches the stop; every loop in the traversal checks it and unwinds
    pub(crate) fn stop(&mut self) {
        self.stopped = true;
    }

    pub(crate) fn into_violations(self) -> ViolationSet {
        self.violations
    }
}

/// The position one constraint evaluation happens at.
pub(crate) struct ValueContext {
    bean: Option<BeanHandle>,
    fixed_value: Option<Value>,
    path: Path,
}

impl ValueContext {
    /// Positioned on a bean reached at `path`
    pub(crate) fn for_bean(bean: BeanHandle, path: Path) -> Self {
        ValueContext {
            bean: Some(bean),
            fixed_value: None,
            path,
        }
    }

    /// Positioned on a detached value standing in for one property, as used by
    /// hypothetical value validation
    pub(crate) fn for_value(value: Value) -> Self {
        ValueContext {
            bean: None,
            fixed_value: Some(value),
            path: Path::root(),
        }
    }

    pub(crate) fn bean(&self) -> Option<&BeanHandle> {
        self.bean.as_ref()
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads one property at this position. A fixed value answers for every
    /// property name; otherwise the bean is asked.
    pub(crate) fn property_value(&self, name: &str) -> Value {
        if let Some(value) = &self.fixed_value {
            return value.clone();
        }
        match &self.bean {
            Some(bean) => bean.property(name),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    use crate::engine::path::PathNode;
    use crate::metadata::descriptor::{
        AttributeBag, ConstraintCatalog, ConstraintDef, ConstraintKindDef, ConstraintValidator,
    };
    use crate::metadata::shape::{ShapeSet, ValueShape};
    use crate::metadata::token::TypeToken;
    use crate::value::ValidatableBean;
    use crate::Result;

    struct Stub;

    impl ValidatableBean for Stub {
        fn type_token(&self) -> TypeToken {
            TypeToken::new(1)
        }

        fn property(&self, _name: &str) -> Value {
            Value::Null
        }
    }

    struct AlwaysValid;

    impl ConstraintValidator for AlwaysValid {
        fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
            Ok(())
        }

        fn is_valid(&self, _value: &Value) -> Result<bool> {
            Ok(true)
        }
    }

    fn descriptor() -> Arc<ConstraintDescriptor> {
        let catalog = ConstraintCatalog::new();
        catalog
            .register(
                ConstraintKindDef::new("NotNull")
                    .with_default_message("must not be null")
                    .with_validator(ShapeSet::ANY, || Box::new(AlwaysValid)),
            )
            .unwrap();
        ConstraintDescriptor::build(
            &ConstraintDef::new("NotNull"),
            ValueShape::Str,
            &catalog,
            &AtomicU32::new(1),
        )
        .unwrap()
    }

    #[test]
    fn test_processed_set_keys_by_identity_and_group() {
        let first = BeanHandle::new(Stub);
        let second = BeanHandle::new(Stub);
        let mut ctx = ValidationContext::new(Some(first.clone()), false);

        ctx.mark_processed(&first, GroupToken::DEFAULT);
        assert!(ctx.is_processed(&first, GroupToken::DEFAULT));
        assert!(!ctx.is_processed(&first, GroupToken::new(2)));
        assert!(!ctx.is_processed(&second, GroupToken::DEFAULT));
    }

    #[test]
    fn test_fail_fast_stops_after_first_violation() {
        let mut ctx = ValidationContext::new(None, true);
        assert!(!ctx.should_stop());

        let path = Path::root().append(PathNode::property("street"));
        ctx.record(None, &path, &Value::Null, &descriptor(), GroupToken::DEFAULT);
        assert!(ctx.should_stop());
        assert_eq!(ctx.violation_count(), 1);
    }

    #[test]
    fn test_collecting_context_keeps_going_until_stopped() {
        let mut ctx = ValidationContext::new(None, false);
        let path = Path::root().append(PathNode::property("street"));
        ctx.record(None, &path, &Value::Null, &descriptor(), GroupToken::DEFAULT);
        assert!(!ctx.should_stop());

        ctx.stop();
        assert!(ctx.should_stop());
    }

    #[test]
    fn test_record_deduplicates_through_to_the_set() {
        let mut ctx = ValidationContext::new(None, false);
        let path = Path::root().append(PathNode::property("street"));
        let descriptor = descriptor();

        assert!(ctx.record(None, &path, &Value::Null, &descriptor, GroupToken::DEFAULT));
        assert!(!ctx.record(None, &path, &Value::Null, &descriptor, GroupToken::DEFAULT));
        assert_eq!(ctx.into_violations().len(), 1);
    }

    #[test]
    fn test_value_context_fixed_value_answers_any_property() {
        let fixed = ValueContext::for_value(Value::from("10117"));
        assert_eq!(fixed.property_value("zipcode"), Value::from("10117"));
        assert_eq!(fixed.property_value("other"), Value::from("10117"));
        assert!(fixed.bean().is_none());
        assert!(fixed.path().is_root());

        let bean = BeanHandle::new(Stub);
        let positioned =
            ValueContext::for_bean(bean.clone(), Path::root().append(PathNode::property("a")));
        assert_eq!(positioned.property_value("anything"), Value::Null);
        assert_eq!(positioned.path().to_string(), "a");
    }
}
