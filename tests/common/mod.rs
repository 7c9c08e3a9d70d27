//! Shared fixtures for the integration suites.
//!
//! Domain objects are simulated by [`TestBean`], a property bag keyed by name, so
//! suites can wire up arbitrary object graphs (including cyclic ones) without
//! declaring a struct per scenario. [`registry`] builds a registry with the
//! built-in constraint kinds installed plus an always-failing `Reject` kind for
//! gating scenarios.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use verdict::prelude::*;

/// Name of the always-failing constraint kind installed by [`registry`].
pub const REJECT: &str = "Reject";

/// A property bag standing in for a domain object.
///
/// Properties are set after construction so cyclic graphs can be wired up;
/// unset properties read as [`Value::Null`].
pub struct TestBean {
    token: TypeToken,
    properties: Mutex<HashMap<String, Value>>,
}

impl TestBean {
    /// Creates a bean of the given registered type with no properties set.
    pub fn new(token: TypeToken) -> Arc<TestBean> {
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

/// Sets one property on a test bean.
pub fn set(bean: &Arc<TestBean>, name: &str, value: Value) {
    bean.properties
        .lock()
        .unwrap()
        .insert(name.to_string(), value);
}

/// Wraps a test bean in the handle the validation entry points take.
pub fn handle(bean: &Arc<TestBean>) -> BeanHandle {
    BeanHandle::from_arc(bean.clone())
}

/// Validator backing the `Reject` kind: every value fails.
struct RejectEverything;

impl ConstraintValidator for RejectEverything {
    fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
        Ok(())
    }

    fn is_valid(&self, _value: &Value) -> Result<bool> {
        Ok(false)
    }
}

/// A registry with the built-in constraint kinds plus the `Reject` kind.
pub fn registry() -> Arc<MetadataRegistry> {
    let registry = MetadataRegistry::new();
    verdict::constraints::register_built_in(&registry).unwrap();
    registry
        .register_constraint(
            ConstraintKindDef::new(REJECT)
                .with_default_message("rejected")
                .with_validator(ShapeSet::ANY, || Box::new(RejectEverything)),
        )
        .unwrap();
    Arc::new(registry)
}

/// The violation paths of a set, sorted for order-independent assertions.
pub fn paths(violations: &ViolationSet) -> Vec<String> {
    let mut paths: Vec<String> = violations.iter().map(|v| v.path().to_string()).collect();
    paths.sort();
    paths
}
