//! The shipped leaf validator strategies.
//!
//! Each strategy follows the usual null convention: [`Value::Null`] passes
//! everything except [`NotNullValidator`] and [`NotBlankValidator`], leaving
//! presence checks to the constraint declared for them.

use crate::metadata::descriptor::{AttributeBag, AttributeValue, ConstraintValidator};
use crate::value::Value;
use crate::Result;

fn int_attribute(attributes: &AttributeBag, kind: &str, name: &str) -> Result<Option<i64>> {
    match attributes.get(name) {
        Some(AttributeValue::Int(value)) => Ok(Some(*value)),
        Some(_) => Err(declaration_error!(
            "'{name}' attribute of '{kind}' must be an integer"
        )),
        None => Ok(None),
    }
}

/// Fails exactly on [`Value::Null`].
#[derive(Debug, Default)]
pub struct NotNullValidator;

impl ConstraintValidator for NotNullValidator {
    fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
        Ok(())
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        Ok(!value.is_null())
    }
}

/// Bounds the element count of a sized value.
///
/// Strings count characters, containers count entries. Bounds come from the
/// `min` (default 0) and `max` (default unbounded) attributes.
#[derive(Debug)]
pub struct SizeValidator {
    min: i64,
    max: i64,
}

impl Default for SizeValidator {
    fn default() -> Self {
        SizeValidator {
            min: 0,
            max: i64::MAX,
        }
    }
}

impl ConstraintValidator for SizeValidator {
    fn initialize(&mut self, attributes: &AttributeBag) -> Result<()> {
        if let Some(min) = int_attribute(attributes, "Size", "min")? {
            self.min = min;
        }
        if let Some(max) = int_attribute(attributes, "Size", "max")? {
            self.max = max;
        }
        if self.min < 0 {
            return Err(declaration_error!(
                "'min' attribute of 'Size' must not be negative, got {}",
                self.min
            ));
        }
        if self.max < self.min {
            return Err(declaration_error!(
                "'Size' declares max {} below min {}",
                self.max,
                self.min
            ));
        }
        Ok(())
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        Ok(value.element_count().map_or(true, |len| {
            let len = i64::try_from(len).unwrap_or(i64::MAX);
            len >= self.min && len <= self.max
        }))
    }
}

/// Lower bound on a numeric value, from the required `value` attribute.
#[derive(Debug, Default)]
pub struct MinValidator {
    bound: i64,
}

impl ConstraintValidator for MinValidator {
    fn initialize(&mut self, attributes: &AttributeBag) -> Result<()> {
        self.bound = int_attribute(attributes, "Min", "value")?
            .ok_or_else(|| declaration_error!("'Min' requires a 'value' attribute"))?;
        Ok(())
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Int(i) => *i >= self.bound,
            Value::Float(f) => *f >= self.bound as f64,
            _ => true,
        })
    }
}

/// Upper bound on a numeric value, from the required `value` attribute.
#[derive(Debug, Default)]
pub struct MaxValidator {
    bound: i64,
}

impl ConstraintValidator for MaxValidator {
    fn initialize(&mut self, attributes: &AttributeBag) -> Result<()> {
        self.bound = int_attribute(attributes, "Max", "value")?
            .ok_or_else(|| declaration_error!("'Max' requires a 'value' attribute"))?;
        Ok(())
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Int(i) => *i <= self.bound,
            Value::Float(f) => *f <= self.bound as f64,
            _ => true,
        })
    }
}

/// Requires at least one non-whitespace character.
///
/// Unlike the other built-ins this one rejects [`Value::Null`]: a blank check
/// that let null through would accept exactly the values it exists to catch.
#[derive(Debug, Default)]
pub struct NotBlankValidator;

impl ConstraintValidator for NotBlankValidator {
    fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
        Ok(())
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Null => false,
            Value::Str(s) => !s.trim().is_empty(),
            _ => true,
        })
    }
}

/// Requires a boolean value to be `true`.
#[derive(Debug, Default)]
pub struct AssertTrueValidator;

impl ConstraintValidator for AssertTrueValidator {
    fn initialize(&mut self, _attributes: &AttributeBag) -> Result<()> {
        Ok(())
    }

    fn is_valid(&self, value: &Value) -> Result<bool> {
        Ok(match value {
            Value::Bool(b) => *b,
            _ => true,
        })
    }
}
