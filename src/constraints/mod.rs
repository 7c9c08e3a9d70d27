//! Built-in constraint kinds and their [`ConstraintDef`] constructors.
//!
//! The crate ships a small set of general-purpose constraints; everything
//! else is registered through [`MetadataRegistry::register_constraint`] with
//! a custom [`ConstraintValidator`](crate::metadata::descriptor::ConstraintValidator).
//! [`register_built_in`] installs the shipped kinds:
//!
//! | Kind | Applies to | Attributes |
//! |------|------------|------------|
//! | [`NOT_NULL`] | any shape | none |
//! | [`SIZE`] | strings, lists, sets, maps | `min`, `max` |
//! | [`MIN`] | integers, floats | `value` |
//! | [`MAX`] | integers, floats | `value` |
//! | [`NOT_BLANK`] | strings | none |
//! | [`ASSERT_TRUE`] | booleans | none |
//!
//! All of them treat [`Value::Null`](crate::value::Value::Null) as valid
//! except `NotNull` and `NotBlank`; presence is declared separately from
//! content checks.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use verdict::constraints::{self, not_null, size};
//! use verdict::{
//!     ConfigurationSource, ConstrainedProperty, MetadataRegistry, TypeConfiguration, TypeDef,
//!     ValueShape,
//! };
//!
//! let registry = Arc::new(MetadataRegistry::new());
//! constraints::register_built_in(&registry)?;
//!
//! let account = registry.register_type(TypeDef::new("Account"))?;
//! registry.contribute(
//!     account,
//!     ConfigurationSource::Annotation,
//!     TypeConfiguration::new().with_property(
//!         ConstrainedProperty::field("name", ValueShape::Str)
//!             .with_constraint(not_null())
//!             .with_constraint(size(1, 64)),
//!     ),
//! )?;
//!
//! let meta = registry.bean_metadata(account)?;
//! assert!(meta.property("name").is_some());
//! # Ok::<(), verdict::Error>(())
//! ```

mod validators;

pub use validators::{
    AssertTrueValidator, MaxValidator, MinValidator, NotBlankValidator, NotNullValidator,
    SizeValidator,
};

use crate::metadata::descriptor::{ConstraintDef, ConstraintKindDef};
use crate::metadata::registry::MetadataRegistry;
use crate::metadata::shape::ShapeSet;
use crate::Result;

/// Kind name of the null check.
pub const NOT_NULL: &str = "NotNull";
/// Kind name of the element count check.
pub const SIZE: &str = "Size";
/// Kind name of the numeric lower bound.
pub const MIN: &str = "Min";
/// Kind name of the numeric upper bound.
pub const MAX: &str = "Max";
/// Kind name of the non-whitespace string check.
pub const NOT_BLANK: &str = "NotBlank";
/// Kind name of the boolean truth check.
pub const ASSERT_TRUE: &str = "AssertTrue";

/// Registers the shipped constraint kinds on `registry`.
///
/// Call this once per registry, before contributing configuration that uses
/// the built-in kind names.
///
/// # Errors
///
/// Returns [`Error::Declaration`](crate::Error::Declaration) if any of the
/// built-in kind names is already registered.
pub fn register_built_in(registry: &MetadataRegistry) -> Result<()> {
    registry.register_constraint(
        ConstraintKindDef::new(NOT_NULL)
            .with_default_message("must not be null")
            .with_validator(ShapeSet::ANY, || Box::new(NotNullValidator)),
    )?;
    registry.register_constraint(
        ConstraintKindDef::new(SIZE)
            .with_default_message("size must be between {min} and {max}")
            .with_validator(ShapeSet::SIZED, || Box::new(SizeValidator::default())),
    )?;
    registry.register_constraint(
        ConstraintKindDef::new(MIN)
            .with_default_message("must be greater than or equal to {value}")
            .with_validator(ShapeSet::NUMERIC, || Box::new(MinValidator::default())),
    )?;
    registry.register_constraint(
        ConstraintKindDef::new(MAX)
            .with_default_message("must be less than or equal to {value}")
            .with_validator(ShapeSet::NUMERIC, || Box::new(MaxValidator::default())),
    )?;
    registry.register_constraint(
        ConstraintKindDef::new(NOT_BLANK)
            .with_default_message("must not be blank")
            .with_validator(ShapeSet::STR, || Box::new(NotBlankValidator)),
    )?;
    registry.register_constraint(
        ConstraintKindDef::new(ASSERT_TRUE)
            .with_default_message("must be true")
            .with_validator(ShapeSet::BOOL, || Box::new(AssertTrueValidator)),
    )?;
    Ok(())
}

/// A `NotNull` declaration.
#[must_use]
pub fn not_null() -> ConstraintDef {
    ConstraintDef::new(NOT_NULL)
}

/// A `Size` declaration bounding the element count to `min..=max`.
#[must_use]
pub fn size(min: i64, max: i64) -> ConstraintDef {
    ConstraintDef::new(SIZE)
        .with_attribute("min", min)
        .with_attribute("max", max)
}

/// A `Min` declaration with the given lower bound.
#[must_use]
pub fn min(value: i64) -> ConstraintDef {
    ConstraintDef::new(MIN).with_attribute("value", value)
}

/// A `Max` declaration with the given upper bound.
#[must_use]
pub fn max(value: i64) -> ConstraintDef {
    ConstraintDef::new(MAX).with_attribute("value", value)
}

/// A `NotBlank` declaration.
#[must_use]
pub fn not_blank() -> ConstraintDef {
    ConstraintDef::new(NOT_BLANK)
}

/// An `AssertTrue` declaration.
#[must_use]
pub fn assert_true() -> ConstraintDef {
    ConstraintDef::new(ASSERT_TRUE)
}
