//! Validation group model and group chain resolution.
//!
//! A validation request names one or more group markers; constraints declare the
//! groups they belong to. Before any value is touched, the requested markers are
//! resolved into a [`GroupChain`]: standalone groups that run unconditionally, in
//! order, followed by fully expanded [`Sequence`]s whose members short-circuit on
//! the first failure.
//!
//! ## Structure
//!
//! - [`chain`] — the resolved order: [`Group`], [`Sequence`] and [`GroupChain`].
//! - [`registry`] — `GroupRegistry`, the token-indexed store of marker and
//!   sequence definitions shared by every resolver.
//! - [`resolver`] — [`GroupChainResolver`], which expands requested markers into
//!   a chain: inherited markers become additional standalone groups, sequence
//!   markers are flattened depth-first with cycle and duplicate detection, and
//!   resolved sequences are cached for the registry lifetime.
//!
//! ## Thread Safety
//!
//! Definitions and the resolved-sequence cache live in concurrent maps; resolvers
//! are cheap handles that can be created per validation call or shared freely.

pub(crate) mod chain;
pub(crate) mod registry;
pub(crate) mod resolver;

pub use chain::{Group, GroupChain, Sequence};
pub use resolver::GroupChainResolver;
