use std::fmt;
use std::sync::Arc;

use crate::metadata::shape::ValueShape;
use crate::metadata::token::TypeToken;

/// A bean instance the engine can traverse.
///
/// Implementations connect a live object to its registered type metadata: `type_token`
/// names the registered type that describes the instance, and `property` reads one
/// property value by name. Property reads are expected to be cheap and side-effect
/// free — the engine may read the same property several times during one call (once
/// per applicable group).
///
/// Cyclic graphs are expressed naturally: a bean's property may return a
/// [`BeanHandle`] clone pointing back at an ancestor. Traversal terminates through
/// processed-pair tracking, not through any acyclicity requirement here.
pub trait ValidatableBean: Send + Sync {
    /// The registered type describing this instance
    fn type_token(&self) -> TypeToken;

    /// Reads the named property, [`Value::Null`] for absent values.
    ///
    /// Unknown property names should also return [`Value::Null`]; the engine only asks
    /// for properties the type's metadata declares.
    fn property(&self, name: &str) -> Value;
}

/// Shared handle to a [`ValidatableBean`] with pointer identity.
///
/// Cloning a handle never clones the bean. Two handles are the same bean exactly when
/// they share the allocation, which is what the engine's processed-pair tracking and
/// violation root/leaf references key on.
#[derive(Clone)]
pub struct BeanHandle(Arc<dyn ValidatableBean>);

impl BeanHandle {
    /// Wraps an already-shared bean
    #[must_use]
    pub fn from_arc(bean: Arc<dyn ValidatableBean>) -> Self {
        BeanHandle(bean)
    }

    /// Moves a bean into a fresh shared allocation
    #[must_use]
    pub fn new<B: ValidatableBean + 'static>(bean: B) -> Self {
        BeanHandle(Arc::new(bean))
    }

    /// The registered type describing this bean
    #[must_use]
    pub fn type_token(&self) -> TypeToken {
        self.0.type_token()
    }

    /// Reads one property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Value {
        self.0.property(name)
    }

    /// Stable identity of the underlying allocation.
    ///
    /// Used as one half of the (bean, group) processed key. Valid for as long as any
    /// handle to the allocation is alive, which the per-call context guarantees by
    /// holding the root handle for the whole traversal.
    #[must_use]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for BeanHandle {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for BeanHandle {}

impl fmt::Debug for BeanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BeanHandle(type: {}, addr: 0x{:x})",
            self.0.type_token(),
            self.identity()
        )
    }
}

/// A value flowing through validation.
///
/// The engine sees object graphs through this closed set of shapes; constraint
/// validators receive exactly this type. Containers own their element values, while
/// beans stay behind [`BeanHandle`]s so reference cycles remain representable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Character sequence
    Str(String),
    /// Ordered, index-addressable collection
    List(Vec<Value>),
    /// Unordered collection without stable element addresses
    Set(Vec<Value>),
    /// Key/value association, iterated in entry order
    Map(Vec<(Value, Value)>),
    /// Reference to another validatable bean
    Bean(BeanHandle),
}

impl Value {
    /// The shape category of this value
    #[must_use]
    pub fn shape(&self) -> ValueShape {
        match self {
            Value::Null => ValueShape::Null,
            Value::Bool(_) => ValueShape::Bool,
            Value::Int(_) => ValueShape::Int,
            Value::Float(_) => ValueShape::Float,
            Value::Str(_) => ValueShape::Str,
            Value::List(_) => ValueShape::List,
            Value::Set(_) => ValueShape::Set,
            Value::Map(_) => ValueShape::Map,
            Value::Bean(_) => ValueShape::Bean,
        }
    }

    /// Returns true for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The bean handle if this value is a bean
    #[must_use]
    pub fn as_bean(&self) -> Option<&BeanHandle> {
        match self {
            Value::Bean(handle) => Some(handle),
            _ => None,
        }
    }

    /// The string slice if this value is a character sequence
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The integer if this value is one
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float if this value is one
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Element count for sized shapes.
    ///
    /// Character count for strings, entry count for lists, sets and maps, `None` for
    /// everything else.
    #[must_use]
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::List(items) | Value::Set(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Rendering of this value when used as a map key inside a property path.
    ///
    /// Scalar keys render as their natural text; structured keys fall back to their
    /// shape name, which keeps paths printable without pulling object graphs into them.
    #[must_use]
    pub fn key_display(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            other => other.shape().to_string(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<BeanHandle> for Value {
    fn from(value: BeanHandle) -> Self {
        Value::Bean(value)
    }
}
