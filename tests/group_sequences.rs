//! Integration tests for group-driven validation ordering.
//!
//! Covers the interplay of standalone groups, group inheritance, sequences
//! with their short-circuit semantics, and redefined default group sequences,
//! all driven through the public validation entry points.

mod common;

use common::{handle, paths, registry, set, TestBean, REJECT};
use verdict::prelude::*;

#[test]
fn test_redefined_default_defers_expensive_checks() {
    let registry = registry();
    let coherence = registry.register_group("Coherence").unwrap();

    let address = registry.register_type(TypeDef::new("Address")).unwrap();
    registry
        .contribute(
            address,
            ConfigurationSource::Annotation,
            TypeConfiguration::new()
                .with_class_constraint(ConstraintDef::new(REJECT).with_group(coherence))
                .with_property(
                    ConstrainedProperty::field("street", ValueShape::Str)
                        .with_constraint(not_blank()),
                )
                .with_property(
                    ConstrainedProperty::field("zipcode", ValueShape::Str)
                        .with_constraint(not_null()),
                )
                .with_default_group_sequence(vec![
                    DefaultSequenceMember::SelfType,
                    DefaultSequenceMember::Group(coherence),
                ]),
        )
        .unwrap();

    let validator = Validator::new(registry);

    // Broken basics: the first member of the redefined sequence fails, so the
    // class-level coherence check never runs.
    let broken = TestBean::new(address);
    set(&broken, "street", Value::from(""));
    let violations = validator.validate(&handle(&broken), &[]).unwrap();
    assert_eq!(paths(&violations), vec!["street", "zipcode"]);
    assert!(violations.iter().all(|v| v.constraint_kind() != REJECT));

    // Clean basics: the sequence advances to the coherence member.
    let clean = TestBean::new(address);
    set(&clean, "street", Value::from("Main St 1"));
    set(&clean, "zipcode", Value::from("10115"));
    let violations = validator.validate(&handle(&clean), &[]).unwrap();
    assert_eq!(violations.len(), 1);
    let violation = &violations.violations()[0];
    assert_eq!(violation.constraint_kind(), REJECT);
    assert_eq!(violation.path().to_string(), "");
    assert_eq!(violation.group(), coherence);
}

#[test]
fn test_standalone_groups_run_before_sequences() {
    let registry = registry();
    let extra = registry.register_group("Extra").unwrap();
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
                    ConstrainedProperty::field("nickname", ValueShape::Str)
                        .with_constraint(not_null().with_group(extra)),
                )
                .with_property(
                    ConstrainedProperty::field("username", ValueShape::Str)
                        .with_constraint(not_null().with_group(basic)),
                )
                .with_property(
                    ConstrainedProperty::field("email", ValueShape::Str)
                        .with_constraint(not_null().with_group(complete)),
                ),
        )
        .unwrap();

    let bean = TestBean::new(account);
    let validator = Validator::new(registry);
    let violations = validator.validate(&handle(&bean), &[extra, ordered]).unwrap();

    // The standalone group reports first; the sequence then stops at its first
    // failing member, so the Complete constraint never runs.
    let ordered_paths: Vec<String> = violations.iter().map(|v| v.path().to_string()).collect();
    assert_eq!(ordered_paths, vec!["nickname", "username"]);
    let groups: Vec<GroupToken> = violations.iter().map(|v| v.group()).collect();
    assert_eq!(groups, vec![extra, basic]);
}

#[test]
fn test_extending_group_activates_inherited_constraints() {
    let registry = registry();
    let basic = registry.register_group("Basic").unwrap();
    let complete = registry.register_group_extending("Complete", &[basic]).unwrap();

    let account = registry.register_type(TypeDef::new("Account")).unwrap();
    registry
        .contribute(
            account,
            ConfigurationSource::Annotation,
            TypeConfiguration::new()
                .with_property(
                    ConstrainedProperty::field("username", ValueShape::Str)
                        .with_constraint(not_null().with_group(basic)),
                )
                .with_property(
                    ConstrainedProperty::field("email", ValueShape::Str)
                        .with_constraint(not_null().with_group(complete)),
                ),
        )
        .unwrap();

    let bean = TestBean::new(account);
    let validator = Validator::new(registry);

    let complete_run = validator.validate(&handle(&bean), &[complete]).unwrap();
    assert_eq!(paths(&complete_run), vec!["email", "username"]);

    let basic_run = validator.validate(&handle(&bean), &[basic]).unwrap();
    assert_eq!(paths(&basic_run), vec!["username"]);
}

#[test]
fn test_cyclic_sequences_fail_at_validation_time() {
    let registry = registry();
    let account = registry.register_type(TypeDef::new("Account")).unwrap();
    registry
        .contribute(
            account,
            ConfigurationSource::Annotation,
            TypeConfiguration::new().with_property(
                ConstrainedProperty::field("username", ValueShape::Str)
                    .with_constraint(not_null()),
            ),
        )
        .unwrap();

    // Members are late-bound, so a sequence can name its own yet-unminted
    // token. Token 1 is Default; the first registration mints token 2.
    let ordered = registry
        .register_sequence("Ordered", &[GroupToken::new(2)])
        .unwrap();
    assert_eq!(ordered, GroupToken::new(2));

    let bean = TestBean::new(account);
    let validator = Validator::new(registry.clone());
    assert!(matches!(
        validator.validate(&handle(&bean), &[ordered]),
        Err(Error::GroupDefinition(_))
    ));

    // Mutual recursion through two definitions surfaces the same way, here
    // through the single-property entry point.
    let first = registry
        .register_sequence("First", &[GroupToken::new(4)])
        .unwrap();
    let second = registry.register_sequence("Second", &[first]).unwrap();
    assert_eq!(second, GroupToken::new(4));
    assert!(matches!(
        validator.validate_property(&handle(&bean), "username", &[first]),
        Err(Error::GroupDefinition(_))
    ));
}

#[test]
fn test_class_like_markers_cannot_drive_validation() {
    let registry = registry();
    let marker = registry.register_class_group("LegacyChecks").unwrap();

    let account = registry.register_type(TypeDef::new("Account")).unwrap();
    registry
        .contribute(
            account,
            ConfigurationSource::Annotation,
            TypeConfiguration::new().with_property(
                ConstrainedProperty::field("username", ValueShape::Str)
                    .with_constraint(not_null().with_group(marker)),
            ),
        )
        .unwrap();

    let bean = TestBean::new(account);
    let validator = Validator::new(registry);

    // A constraint may target the marker, but requesting it is an error.
    assert!(matches!(
        validator.validate(&handle(&bean), &[marker]),
        Err(Error::Validation(_))
    ));
    assert!(validator.validate(&handle(&bean), &[]).unwrap().is_empty());
}

#[test]
fn test_duplicate_sequence_members_need_adjacency() {
    let registry = registry();
    let first = registry.register_group("First").unwrap();
    let second = registry.register_group("Second").unwrap();

    let account = registry.register_type(TypeDef::new("Account")).unwrap();
    registry
        .contribute(
            account,
            ConfigurationSource::Annotation,
            TypeConfiguration::new().with_property(
                ConstrainedProperty::field("username", ValueShape::Str)
                    .with_constraint(not_null().with_group(first)),
            ),
        )
        .unwrap();
    let bean = TestBean::new(account);
    let validator = Validator::new(registry.clone());

    // Re-running First after Second would revisit an already-passed member.
    let gapped = registry
        .register_sequence("Gapped", &[first, second, first])
        .unwrap();
    assert!(matches!(
        validator.validate(&handle(&bean), &[gapped]),
        Err(Error::GroupDefinition(_))
    ));

    // Immediately repeated members collapse and validate normally.
    let doubled = registry.register_sequence("Doubled", &[first, first]).unwrap();
    let violations = validator.validate(&handle(&bean), &[doubled]).unwrap();
    assert_eq!(paths(&violations), vec!["username"]);
}

#[test]
fn test_redefined_default_must_not_reorder_surrounding_sequence() {
    let registry = registry();
    let pre = registry.register_group("Pre").unwrap();
    let post = registry.register_group("Post").unwrap();
    let ordered = registry
        .register_sequence("Ordered", &[pre, GroupToken::DEFAULT, post])
        .unwrap();

    // Pre runs before Default in the surrounding sequence; a redefinition
    // that puts it after the self-type would flip that order.
    let conflicting = registry.register_type(TypeDef::new("Conflicting")).unwrap();
    registry
        .contribute(
            conflicting,
            ConfigurationSource::Annotation,
            TypeConfiguration::new()
                .with_property(
                    ConstrainedProperty::field("name", ValueShape::Str)
                        .with_constraint(not_null()),
                )
                .with_default_group_sequence(vec![
                    DefaultSequenceMember::SelfType,
                    DefaultSequenceMember::Group(pre),
                ]),
        )
        .unwrap();

    let validator = Validator::new(registry.clone());
    let bean = TestBean::new(conflicting);
    assert!(matches!(
        validator.validate(&handle(&bean), &[ordered]),
        Err(Error::GroupDefinition(_))
    ));

    // Leading with Pre preserves the surrounding order and validates.
    let agreeing = registry.register_type(TypeDef::new("Agreeing")).unwrap();
    registry
        .contribute(
            agreeing,
            ConfigurationSource::Annotation,
            TypeConfiguration::new()
                .with_property(
                    ConstrainedProperty::field("name", ValueShape::Str)
                        .with_constraint(not_null()),
                )
                .with_default_group_sequence(vec![
                    DefaultSequenceMember::Group(pre),
                    DefaultSequenceMember::SelfType,
                ]),
        )
        .unwrap();

    let bean = TestBean::new(agreeing);
    let violations = validator.validate(&handle(&bean), &[ordered]).unwrap();
    assert_eq!(paths(&violations), vec!["name"]);
}

#[test]
fn test_sequence_member_inheritance_is_spliced_in() {
    let registry = registry();
    let basic = registry.register_group("Basic").unwrap();
    let complete = registry.register_group_extending("Complete", &[basic]).unwrap();
    let ordered = registry.register_sequence("Ordered", &[complete]).unwrap();

    let account = registry.register_type(TypeDef::new("Account")).unwrap();
    registry
        .contribute(
            account,
            ConfigurationSource::Annotation,
            TypeConfiguration::new()
                .with_property(
                    ConstrainedProperty::field("username", ValueShape::Str)
                        .with_constraint(not_null().with_group(basic)),
                )
                .with_property(
                    ConstrainedProperty::field("email", ValueShape::Str)
                        .with_constraint(not_null().with_group(complete)),
                ),
        )
        .unwrap();

    let validator = Validator::new(registry);

    // The expanded sequence is [Complete, Basic]; the first failing member
    // stops it before the inherited marker runs.
    let bean = TestBean::new(account);
    let violations = validator.validate(&handle(&bean), &[ordered]).unwrap();
    assert_eq!(paths(&violations), vec!["email"]);
    assert_eq!(violations.violations()[0].group(), complete);

    let bean = TestBean::new(account);
    set(&bean, "email", Value::from("a@example.com"));
    let violations = validator.validate(&handle(&bean), &[ordered]).unwrap();
    assert_eq!(paths(&violations), vec!["username"]);
    assert_eq!(violations.violations()[0].group(), basic);
}
