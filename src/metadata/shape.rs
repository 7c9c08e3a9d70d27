use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter};

/// Closed category of a runtime value.
///
/// Shapes are the dispatch key for validator selection: every constrained element
/// declares the shape of the values it holds, and every registered validator factory
/// declares the [`ShapeSet`] it accepts. The match is computed once while building a
/// descriptor, never per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumCount, EnumIter)]
pub enum ValueShape {
    /// Absent value; runtime-only, never a declared shape
    Null,
    /// Boolean
    Bool,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// Character sequence
    Str,
    /// Ordered collection
    List,
    /// Unordered collection
    Set,
    /// Key/value association
    Map,
    /// Reference to another validatable bean
    Bean,
}

bitflags! {
    /// Set of [`ValueShape`]s a validator strategy accepts.
    ///
    /// Composite constants cover the groupings built-in constraints care about, in the
    /// spirit of one size constraint serving strings and all container shapes.
    #[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy)]
    pub struct ShapeSet: u16 {
        /// Accepts booleans
        const BOOL = 0x0001;
        /// Accepts signed integers
        const INT = 0x0002;
        /// Accepts floating point numbers
        const FLOAT = 0x0004;
        /// Accepts character sequences
        const STR = 0x0008;
        /// Accepts ordered collections
        const LIST = 0x0010;
        /// Accepts unordered collections
        const SET = 0x0020;
        /// Accepts key/value associations
        const MAP = 0x0040;
        /// Accepts bean references
        const BEAN = 0x0080;

        /// Both numeric shapes
        const NUMERIC = Self::INT.bits() | Self::FLOAT.bits();
        /// Everything with a meaningful element count
        const SIZED = Self::STR.bits() | Self::LIST.bits() | Self::SET.bits() | Self::MAP.bits();
        /// Every declarable shape
        const ANY = Self::BOOL.bits()
            | Self::INT.bits()
            | Self::FLOAT.bits()
            | Self::STR.bits()
            | Self::LIST.bits()
            | Self::SET.bits()
            | Self::MAP.bits()
            | Self::BEAN.bits();
    }
}

impl ShapeSet {
    /// The single-bit set for one declarable shape, empty for [`ValueShape::Null`]
    #[must_use]
    pub fn from_shape(shape: ValueShape) -> ShapeSet {
        match shape {
            ValueShape::Null => ShapeSet::empty(),
            ValueShape::Bool => ShapeSet::BOOL,
            ValueShape::Int => ShapeSet::INT,
            ValueShape::Float => ShapeSet::FLOAT,
            ValueShape::Str => ShapeSet::STR,
            ValueShape::List => ShapeSet::LIST,
            ValueShape::Set => ShapeSet::SET,
            ValueShape::Map => ShapeSet::MAP,
            ValueShape::Bean => ShapeSet::BEAN,
        }
    }

    /// Returns true if this set accepts the given shape
    #[must_use]
    pub fn accepts(&self, shape: ValueShape) -> bool {
        self.contains(ShapeSet::from_shape(shape)) && shape != ValueShape::Null
    }
}
