//! Property paths pointing from a validation root to a violated value.
//!
//! Every violation carries a [`Path`]: the ordered nodes the traversal crossed to
//! reach the failing value. Paths render in the dotted form established by the
//! reference period notation (`orders[2].shipping.zipcode`), with container
//! decorations attached to the preceding segment and executable markers spelled
//! out (`transfer.<cross-parameter>`, `repair.<return value>`).
//!
//! Paths are immutable; the traversal extends them copy-on-append so that sibling
//! branches never see each other's nodes. They hash and compare by node list,
//! which makes them usable as one component of the violation deduplication key.

use std::fmt;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathNode {
    /// A named bean property
    Property(String),
    /// An indexed element of an ordered collection, decorating the previous node
    Index(usize),
    /// A keyed element of a key/value association, decorating the previous node
    Key(String),
    /// An element of an unordered collection, decorating the previous node
    IterableElement,
    /// Marker moving the target from a map entry's value to its key
    MapKey,
    /// The executable whose parameters or return value are under validation
    Executable(String),
    /// A named executable parameter
    Parameter(String),
    /// The whole argument list of an executable
    CrossParameter,
    /// The return value of an executable
    ReturnValue,
}

impl PathNode {
    /// A property node from a borrowed name
    #[must_use]
    pub fn property(name: &str) -> Self {
        PathNode::Property(name.to_string())
    }

    /// A parameter node from a borrowed name
    #[must_use]
    pub fn parameter(name: &str) -> Self {
        PathNode::Parameter(name.to_string())
    }

    /// A key node from a rendered key
    #[must_use]
    pub fn key(display: String) -> Self {
        PathNode::Key(display)
    }

    /// Returns true if this node decorates the previous segment instead of
    /// starting a new dot-separated one
    #[must_use]
    pub fn is_decoration(&self) -> bool {
        matches!(
            self,
            PathNode::Index(_) | PathNode::Key(_) | PathNode::IterableElement
        )
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathNode::Property(name) => write!(f, "{name}"),
            PathNode::Index(index) => write!(f, "[{index}]"),
            PathNode::Key(key) => write!(f, "[{key}]"),
            PathNode::IterableElement => write!(f, "[]"),
            PathNode::MapKey => write!(f, "<map key>"),
            PathNode::Executable(name) => write!(f, "{name}"),
            PathNode::Parameter(name) => write!(f, "{name}"),
            PathNode::CrossParameter => write!(f, "<cross-parameter>"),
            PathNode::ReturnValue => write!(f, "<return value>"),
        }
    }
}

/// The node sequence from a validation root to one validated value.
///
/// The empty path denotes the root itself, which is where class-level
/// constraints on the root bean report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    nodes: Vec<PathNode>,
}

impl Path {
    /// The empty path at the validation root
    #[must_use]
    pub fn root() -> Self {
        Path::default()
    }

    /// A path rooted at one executable
    #[must_use]
    pub(crate) fn executable(name: &str) -> Self {
        Path {
            nodes: vec![PathNode::Executable(name.to_string())],
        }
    }

    /// A new path with `node` appended; `self` is left untouched
    #[must_use]
    pub(crate) fn append(&self, node: PathNode) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(node);
        Path { nodes }
    }

    /// The nodes in root-to-leaf order
    #[must_use]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Returns true for the empty path at the validation root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for node in &self.nodes {
            if !first && !node.is_decoration() {
                write!(f, ".")?;
            }
            write!(f, "{node}")?;
            first = false;
        }
        Ok(())
    }
}
