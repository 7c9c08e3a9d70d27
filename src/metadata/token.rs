use std::fmt;

/// Identifies one registered type within a [`crate::MetadataRegistry`].
///
/// Tokens are opaque 32-bit values minted sequentially at registration time. They key
/// every per-type structure in the crate: contribution lists, the aggregated metadata
/// cache, hierarchy lineages, and cascading targets. Token 0 is reserved as the null
/// token and never handed out.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeToken(pub u32);

impl TypeToken {
    /// Creates a token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        TypeToken(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns true if this is the null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for TypeToken {
    fn from(value: u32) -> Self {
        TypeToken(value)
    }
}

impl From<TypeToken> for u32 {
    fn from(token: TypeToken) -> Self {
        token.0
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeToken(0x{:08x})", self.0)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Identifies one registered group marker within a [`crate::MetadataRegistry`].
///
/// Group markers partition constraints into named validation phases. A marker may be a
/// plain interface-like marker, a marker extending other markers, or a sequence-defining
/// marker. The `Default` group is pre-registered by every registry and always carries
/// the same token value, [`GroupToken::DEFAULT`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupToken(pub u32);

impl GroupToken {
    /// The pre-registered `Default` validation group.
    pub const DEFAULT: GroupToken = GroupToken(1);

    /// Creates a token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        GroupToken(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns true if this token denotes the `Default` group
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl From<u32> for GroupToken {
    fn from(value: u32) -> Self {
        GroupToken(value)
    }
}

impl From<GroupToken> for u32 {
    fn from(token: GroupToken) -> Self {
        token.0
    }
}

impl fmt::Debug for GroupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupToken(0x{:08x})", self.0)
    }
}

impl fmt::Display for GroupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Identifies one built [`crate::metadata::descriptor::ConstraintDescriptor`].
///
/// Minted once per descriptor build, including composing descriptors. Violation
/// deduplication compares (path, constraint id, group), so two occurrences of the same
/// descriptor at the same path under the same group collapse into one violation while
/// distinct declarations of the same constraint kind stay apart.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub u32);

impl ConstraintId {
    /// Creates an id from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        ConstraintId(value)
    }

    /// Returns the raw id value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstraintId({})", self.0)
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
