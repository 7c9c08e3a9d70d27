//! Constraint violations and the deduplicating set collecting them.
//!
//! A [`ConstraintViolation`] captures everything a caller needs to report one
//! failure: the raw message template, the root and leaf beans, the value that
//! failed, the [`Path`](crate::engine::path::Path) to it, the violated
//! descriptor and the group that was active. Violations accumulate in a
//! [`ViolationSet`], which drops exact duplicates: the same descriptor failing
//! at the same path under the same group is one violation no matter how many
//! traversal routes rediscover it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::engine::path::Path;
use crate::metadata::descriptor::ConstraintDescriptor;
use crate::metadata::token::{ConstraintId, GroupToken};
use crate::value::{BeanHandle, Value};

/// One constraint failure discovered by a validation call.
#[derive(Clone)]
pub struct ConstraintViolation {
    message: String,
    root_bean: Option<BeanHandle>,
    leaf_bean: Option<BeanHandle>,
    invalid_value: Value,
    path: Path,
    descriptor: Arc<ConstraintDescriptor>,
    group: GroupToken,
}

impl ConstraintViolation {
    pub(crate) fn new(
        root_bean: Option<BeanHandle>,
        leaf_bean: Option<BeanHandle>,
        invalid_value: Value,
        path: Path,
        descriptor: Arc<ConstraintDescriptor>,
        group: GroupToken,
    ) -> Self {
        ConstraintViolation {
            message: descriptor.message_template().to_string(),
            root_bean,
            leaf_bean,
            invalid_value,
            path,
            descriptor,
            group,
        }
    }

    /// The raw message template of the violated declaration, uninterpolated
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The bean the validation call started from, absent for value validation
    /// and constructor parameter validation
    #[must_use]
    pub fn root_bean(&self) -> Option<&BeanHandle> {
        self.root_bean.as_ref()
    }

    /// The bean hosting the violated constraint, absent for value validation
    #[must_use]
    pub fn leaf_bean(&self) -> Option<&BeanHandle> {
        self.leaf_bean.as_ref()
    }

    /// The value that failed the constraint
    #[must_use]
    pub fn invalid_value(&self) -> &Value {
        &self.invalid_value
    }

    /// The path from the validation root to the failing value
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The violated descriptor
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ConstraintDescriptor> {
        &self.descriptor
    }

    /// The constraint kind name, shorthand for `descriptor().kind()`
    #[must_use]
    pub fn constraint_kind(&self) -> &str {
        self.descriptor.kind()
    }

    /// The group that was active when the constraint failed. Inside a resolved
    /// sequence this is the executing member, not the sequence marker.
    #[must_use]
    pub fn group(&self) -> GroupToken {
        self.group
    }
}

impl fmt::Debug for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintViolation")
            .field("kind", &self.descriptor.kind())
            .field("path", &self.path.to_string())
            .field("group", &self.group)
            .field("invalid_value", &self.invalid_value)
            .finish()
    }
}

/// The violations of one validation call, deduplicated by
/// (path, constraint id, group).
#[derive(Default)]
pub struct ViolationSet {
    violations: Vec<ConstraintViolation>,
    seen: HashSet<(Path, ConstraintId, GroupToken)>,
}

impl ViolationSet {
    /// An empty set
    #[must_use]
    pub fn new() -> Self {
        ViolationSet::default()
    }

    /// Adds a violation unless an equal (path, constraint id, group) entry is
    /// already present; returns true if the violation was kept.
    pub(crate) fn add(&mut self, violation: ConstraintViolation) -> bool {
        let key = (
            violation.path.clone(),
            violation.descriptor.id(),
            violation.group,
        );
        if !self.seen.insert(key) {
            return false;
        }
        self.violations.push(violation);
        true
    }

    /// Number of collected violations
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if no constraint failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violations in discovery order
    #[must_use]
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// Iterates the violations in discovery order
    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintViolation> {
        self.violations.iter()
    }
}

impl IntoIterator for ViolationSet {
    type Item = ConstraintViolation;
    type IntoIter = std::vec::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationSet {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::slice::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Debug for ViolationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.violations).finish()
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
    use crate::Result;

    struct AlwaysValid;

    impl ConstraintValidator for AlwaysValid {
        fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
            Ok(())
        }

        fn is_valid(&self, _value: &Value) -> Result<bool> {
            Ok(true)
        }
    }

    fn descriptor(kind: &str, ids: &AtomicU32) -> Arc<ConstraintDescriptor> {
        let catalog = ConstraintCatalog::new();
        catalog
            .register(
                ConstraintKindDef::new(kind)
                    .with_default_message("must hold")
                    .with_validator(ShapeSet::ANY, || Box::new(AlwaysValid)),
            )
            .unwrap();
        ConstraintDescriptor::build(&ConstraintDef::new(kind), ValueShape::Str, &catalog, ids)
            .unwrap()
    }

    fn violation(
        descriptor: &Arc<ConstraintDescriptor>,
        path: Path,
        group: GroupToken,
    ) -> ConstraintViolation {
        ConstraintViolation::new(
            None,
            None,
            Value::from("broken"),
            path,
            descriptor.clone(),
            group,
        )
    }

    #[test]
    fn test_violation_carries_template_and_group() {
        let ids = AtomicU32::new(1);
        let descriptor = descriptor("NotNull", &ids);
        let path = Path::root().append(PathNode::property("street"));
        let violation = violation(&descriptor, path.clone(), GroupToken::DEFAULT);

        assert_eq!(violation.message(), "must hold");
        assert_eq!(violation.constraint_kind(), "NotNull");
        assert_eq!(violation.path(), &path);
        assert_eq!(violation.group(), GroupToken::DEFAULT);
        assert_eq!(violation.invalid_value(), &Value::from("broken"));
        assert!(violation.root_bean().is_none());
    }

    #[test]
    fn test_set_drops_exact_duplicates() {
        let ids = AtomicU32::new(1);
        let descriptor = descriptor("NotNull", &ids);
        let path = Path::root().append(PathNode::property("street"));

        let mut set = ViolationSet::new();
        assert!(set.add(violation(&descriptor, path.clone(), GroupToken::DEFAULT)));
        assert!(!set.add(violation(&descriptor, path.clone(), GroupToken::DEFAULT)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_keeps_distinct_keys() {
        let ids = AtomicU32::new(1);
        let first = descriptor("NotNull", &ids);
        let other = descriptor("Size", &ids);
        let street = Path::root().append(PathNode::property("street"));
        let city = Path::root().append(PathNode::property("city"));

        let mut set = ViolationSet::new();
        assert!(set.add(violation(&first, street.clone(), GroupToken::DEFAULT)));
        assert!(set.add(violation(&first, city, GroupToken::DEFAULT)));
        assert!(set.add(violation(&first, street.clone(), GroupToken::new(7))));
        assert!(set.add(violation(&other, street, GroupToken::DEFAULT)));
        assert_eq!(set.len(), 4);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_iteration_preserves_discovery_order() {
        let ids = AtomicU32::new(1);
        let descriptor = descriptor("NotNull", &ids);
        let mut set = ViolationSet::new();
        set.add(violation(
            &descriptor,
            Path::root().append(PathNode::property("first")),
            GroupToken::DEFAULT,
        ));
        set.add(violation(
            &descriptor,
            Path::root().append(PathNode::property("second")),
            GroupToken::DEFAULT,
        ));

        let paths: Vec<String> = set.iter().map(|v| v.path().to_string()).collect();
        assert_eq!(paths, vec!["first", "second"]);

        let owned: Vec<String> = set.into_iter().map(|v| v.path().to_string()).collect();
        assert_eq!(owned, vec!["first", "second"]);
    }
}
