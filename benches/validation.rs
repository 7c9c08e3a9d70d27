//! Benchmarks for metadata aggregation and graph validation.
//!
//! Tests the hot paths of the engine:
//! - Bean metadata builds (cold and cache hit)
//! - Group chain resolution (Default fast path, nested sequences)
//! - Flat bean validation (passing and failing values)
//! - Cascaded graph traversal over container properties
//! - Method parameter validation

extern crate verdict;

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use verdict::prelude::*;

/// Fixed-property bean standing in for a flat domain object.
struct Account {
    token: TypeToken,
    username: Value,
    email: Value,
    age: Value,
}

impl ValidatableBean for Account {
    fn type_token(&self) -> TypeToken {
        self.token
    }

    fn property(&self, name: &str) -> Value {
        match name {
            "username" => self.username.clone(),
            "email" => self.email.clone(),
            "age" => self.age.clone(),
            _ => Value::Null,
        }
    }
}

/// Order line reached through a cascaded container.
struct Order {
    token: TypeToken,
    street: Value,
}

impl ValidatableBean for Order {
    fn type_token(&self) -> TypeToken {
        self.token
    }

    fn property(&self, name: &str) -> Value {
        if name == "street" {
            self.street.clone()
        } else {
            Value::Null
        }
    }
}

/// Customer owning a list of cascaded orders.
struct Customer {
    token: TypeToken,
    orders: Value,
}

impl ValidatableBean for Customer {
    fn type_token(&self) -> TypeToken {
        self.token
    }

    fn property(&self, name: &str) -> Value {
        if name == "orders" {
            self.orders.clone()
        } else {
            Value::Null
        }
    }
}

fn account_configuration() -> TypeConfiguration {
    TypeConfiguration::new()
        .with_property(
            ConstrainedProperty::field("username", ValueShape::Str)
                .with_constraint(not_blank())
                .with_constraint(size(3, 20)),
        )
        .with_property(
            ConstrainedProperty::field("email", ValueShape::Str)
                .with_constraint(not_null())
                .with_constraint(size(5, 50)),
        )
        .with_property(
            ConstrainedProperty::field("age", ValueShape::Int)
                .with_constraint(min(0))
                .with_constraint(max(150)),
        )
}

/// Registry with the account type registered and its metadata built.
fn account_registry() -> (Arc<MetadataRegistry>, TypeToken) {
    let registry = MetadataRegistry::new();
    verdict::constraints::register_built_in(&registry).unwrap();
    let account = registry.register_type(TypeDef::new("Account")).unwrap();
    registry
        .contribute(
            account,
            ConfigurationSource::Annotation,
            account_configuration(),
        )
        .unwrap();
    registry.bootstrap().unwrap();
    (Arc::new(registry), account)
}

fn account(token: TypeToken, username: &str, email: Option<&str>, age: i64) -> BeanHandle {
    BeanHandle::new(Account {
        token,
        username: Value::from(username),
        email: email.map_or(Value::Null, Value::from),
        age: Value::from(age),
    })
}

/// Benchmark registering a type and building its metadata from scratch.
fn bench_metadata_build_cold(c: &mut Criterion) {
    c.bench_function("metadata_build_cold", |b| {
        b.iter(|| {
            let registry = MetadataRegistry::new();
            verdict::constraints::register_built_in(&registry).unwrap();
            let token = registry.register_type(TypeDef::new("Account")).unwrap();
            registry
                .contribute(
                    token,
                    ConfigurationSource::Annotation,
                    account_configuration(),
                )
                .unwrap();
            black_box(registry.bean_metadata(token).unwrap())
        });
    });
}

/// Benchmark the metadata cache hit taken by every validation call.
fn bench_metadata_cache_hit(c: &mut Criterion) {
    let (registry, token) = account_registry();

    c.bench_function("metadata_cache_hit", |b| {
        b.iter(|| black_box(registry.bean_metadata(black_box(token)).unwrap()));
    });
}

/// Benchmark the Default-only group resolution fast path.
fn bench_group_chain_default(c: &mut Criterion) {
    let registry = MetadataRegistry::new();
    let resolver = registry.group_resolver();

    c.bench_function("group_chain_default", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&[GroupToken::DEFAULT])).unwrap()));
    });
}

/// Benchmark resolving a nested sequence with inherited markers.
fn bench_group_chain_nested_sequence(c: &mut Criterion) {
    let registry = MetadataRegistry::new();
    let basic = registry.register_group("Basic").unwrap();
    let complete = registry.register_group_extending("Complete", &[basic]).unwrap();
    let precheck = registry.register_group("Precheck").unwrap();
    let inner = registry.register_sequence("Inner", &[complete]).unwrap();
    let checkout = registry.register_sequence("Checkout", &[precheck, inner]).unwrap();
    let resolver = registry.group_resolver();

    c.bench_function("group_chain_nested_sequence", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&[checkout])).unwrap()));
    });
}

/// Benchmark validating a flat bean whose values all pass.
fn bench_validate_flat_passing(c: &mut Criterion) {
    let (registry, token) = account_registry();
    let validator = Validator::new(registry);
    let bean = account(token, "maria", Some("maria@example.com"), 44);

    c.bench_function("validate_flat_passing", |b| {
        b.iter(|| black_box(validator.validate(black_box(&bean), &[]).unwrap()));
    });
}

/// Benchmark validating a flat bean where every property fails.
fn bench_validate_flat_failing(c: &mut Criterion) {
    let (registry, token) = account_registry();
    let validator = Validator::new(registry);
    let bean = account(token, "", None, 200);

    c.bench_function("validate_flat_failing", |b| {
        b.iter(|| black_box(validator.validate(black_box(&bean), &[]).unwrap()));
    });
}

/// Benchmark cascading through a list of sixteen clean child beans.
fn bench_validate_graph_cascade(c: &mut Criterion) {
    let registry = MetadataRegistry::new();
    verdict::constraints::register_built_in(&registry).unwrap();
    let order = registry.register_type(TypeDef::new("Order")).unwrap();
    registry
        .contribute(
            order,
            ConfigurationSource::Annotation,
            TypeConfiguration::new().with_property(
                ConstrainedProperty::field("street", ValueShape::Str)
                    .with_constraint(not_blank()),
            ),
        )
        .unwrap();
    let customer = registry.register_type(TypeDef::new("Customer")).unwrap();
    registry
        .contribute(
            customer,
            ConfigurationSource::Annotation,
            TypeConfiguration::new()
                .with_property(ConstrainedProperty::field("orders", ValueShape::List).cascading()),
        )
        .unwrap();
    registry.bootstrap().unwrap();

    let orders: Vec<Value> = (0..16)
        .map(|i| {
            Value::Bean(BeanHandle::new(Order {
                token: order,
                street: Value::from(format!("Main St {i}")),
            }))
        })
        .collect();
    let bean = BeanHandle::new(Customer {
        token: customer,
        orders: Value::List(orders),
    });

    let validator = Validator::new(Arc::new(registry));
    c.bench_function("validate_graph_cascade", |b| {
        b.iter(|| black_box(validator.validate(black_box(&bean), &[]).unwrap()));
    });
}

/// Benchmark method parameter validation with a cross-parameter check.
fn bench_validate_parameters(c: &mut Criterion) {
    let registry = MetadataRegistry::new();
    verdict::constraints::register_built_in(&registry).unwrap();
    let service = registry.register_type(TypeDef::new("BankService")).unwrap();
    registry
        .contribute(
            service,
            ConfigurationSource::Annotation,
            TypeConfiguration::new().with_executable(
                ConstrainedExecutable::method("transfer", "transfer(Int,Int)")
                    .with_cross_parameter_constraint(not_null())
                    .with_parameter(
                        ConstrainedParameter::new(0, "from", ValueShape::Int)
                            .with_constraint(min(1)),
                    )
                    .with_parameter(
                        ConstrainedParameter::new(1, "to", ValueShape::Int).with_constraint(min(1)),
                    ),
            ),
        )
        .unwrap();
    registry.bootstrap().unwrap();

    let host = BeanHandle::new(Account {
        token: service,
        username: Value::Null,
        email: Value::Null,
        age: Value::Null,
    });
    let arguments = [Value::from(10_i64), Value::from(250_i64)];

    let validator = Validator::new(Arc::new(registry));
    c.bench_function("validate_parameters", |b| {
        b.iter(|| {
            black_box(
                validator
                    .validate_parameters(
                        black_box(&host),
                        "transfer(Int,Int)",
                        black_box(&arguments),
                        &[],
                    )
                    .unwrap(),
            )
        });
    });
}

criterion_group!(
    benches,
    // Metadata aggregation
    bench_metadata_build_cold,
    bench_metadata_cache_hit,
    // Group chain resolution
    bench_group_chain_default,
    bench_group_chain_nested_sequence,
    // Bean validation
    bench_validate_flat_passing,
    bench_validate_flat_failing,
    bench_validate_graph_cascade,
    // Executable validation
    bench_validate_parameters,
);
criterion_main!(benches);
