//! Expansion of requested group markers into an ordered validation chain.
//!
//! The resolver turns the tokens a caller passes to a validation entry point into
//! a [`GroupChain`]: plain markers become standalone groups (followed by their
//! inherited markers, recursively), sequence markers are flattened depth-first
//! into [`Sequence`]s. Flattening enforces the two sequence well-formedness
//! rules — no group twice at non-adjacent positions, no sequence transitively
//! containing itself — and re-checks the first rule after inherited markers are
//! spliced in, since inheritance can re-introduce a group that already appears
//! elsewhere in the expansion.
//!
//! Resolved sequences are cached in the owning registry. Sequence definitions
//! are immutable once registered, so a cached expansion never goes stale.

use std::sync::Arc;

use crate::groups::chain::{Group, GroupChain, Sequence};
use crate::groups::registry::{GroupDefinition, GroupKind, GroupRegistry};
use crate::metadata::token::GroupToken;
use crate::{Error, Result};

/// Resolves requested validation groups into an ordered [`GroupChain`].
///
/// Handles are cheap to create and clone; all state lives in the shared
/// registry, including the resolved-sequence cache.
///
/// # Examples
///
/// ```rust
/// use verdict::MetadataRegistry;
///
/// let registry = MetadataRegistry::new();
/// let basic = registry.register_group("Basic")?;
/// let complete = registry.register_group_extending("Complete", &[basic])?;
///
/// let resolver = registry.group_resolver();
/// let chain = resolver.resolve(&[complete])?;
///
/// // Extending a marker means "also validate the extended groups".
/// let tokens: Vec<_> = chain.groups().iter().map(|g| g.token()).collect();
/// assert_eq!(tokens, vec![complete, basic]);
/// # Ok::<(), verdict::Error>(())
/// ```
#[derive(Clone)]
pub struct GroupChainResolver {
    groups: Arc<GroupRegistry>,
}

impl GroupChainResolver {
    pub(crate) fn new(groups: Arc<GroupRegistry>) -> Self {
        GroupChainResolver { groups }
    }

    /// Resolves the requested groups into a validation order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty request or an
    /// unregistered token, [`Error::Validation`] if a requested marker is
    /// class-like, and [`Error::GroupDefinition`] for cyclic or duplicated
    /// sequence definitions reached through the request.
    pub fn resolve(&self, requested: &[GroupToken]) -> Result<GroupChain> {
        if requested.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one validation group must be requested".to_string(),
            ));
        }

        // The overwhelmingly common request. No definition lookups needed:
        // `Default` is pre-registered and carries neither parents nor members.
        if requested.len() == 1 && requested[0].is_default() {
            let mut chain = GroupChain::default();
            chain.insert_group(Group::DEFAULT);
            return Ok(chain);
        }

        // Validate the whole request before expanding any part of it.
        let mut definitions = Vec::with_capacity(requested.len());
        for token in requested {
            let definition = self.requested_definition(*token)?;
            if definition.kind == GroupKind::Class {
                return Err(Error::Validation(format!(
                    "group marker '{}' is class-like and cannot drive validation",
                    definition.name
                )));
            }
            definitions.push((*token, definition));
        }

        let mut chain = GroupChain::default();
        for (token, definition) in definitions {
            if token.is_default() {
                chain.insert_group(Group::DEFAULT);
            } else if definition.kind == GroupKind::Sequence {
                self.insert_sequence(token, &definition.members, true, &mut chain)?;
            } else {
                chain.insert_group(Group::new(token));
                self.insert_inherited_groups(&definition, &mut chain)?;
            }
        }

        Ok(chain)
    }

    /// Resolution for one group reached through cascading.
    ///
    /// `expand` is true when the group was produced by a group conversion: the
    /// conversion target may itself be a sequence or an extending marker, so it
    /// must be resolved in full. Without a conversion the surrounding loop is
    /// already iterating a resolved order and the group passes through as-is.
    pub(crate) fn resolve_cascaded(&self, group: Group, expand: bool) -> Result<GroupChain> {
        if expand && !group.is_default() {
            return self.resolve(&[group.token()]);
        }

        let mut chain = GroupChain::default();
        chain.insert_group(group);
        Ok(chain)
    }

    /// Expands a redefined default group sequence at metadata-build time.
    ///
    /// `members` has already had the self-type placeholder replaced by
    /// `Default`. Expansion applies the same flattening, cycle and duplicate
    /// rules as a requested sequence, but bypasses the resolved-sequence cache:
    /// the result belongs to the type being built, not to any group token.
    pub(crate) fn resolve_redefined_default_sequence(
        &self,
        members: &[GroupToken],
    ) -> Result<Vec<GroupToken>> {
        let mut processed = Vec::new();
        let mut resolved = Vec::new();
        for member in members {
            let definition = self.member_definition(*member)?;
            if definition.kind == GroupKind::Sequence {
                let nested = self.resolve_sequence(*member, &definition.members, &mut processed)?;
                self.splice_groups(&mut resolved, nested)?;
            } else {
                self.splice_groups(&mut resolved, [Group::new(*member)])?;
            }
        }

        let expanded = self.expand_inherited_groups(resolved)?;
        Ok(expanded.iter().map(Group::token).collect())
    }

    /// Standalone insertion: the group itself, then every marker it extends,
    /// depth-first. The chain deduplicates, so shared ancestors appear once.
    fn insert_inherited_groups(
        &self,
        definition: &GroupDefinition,
        chain: &mut GroupChain,
    ) -> Result<()> {
        for parent in &definition.parents {
            chain.insert_group(Group::new(*parent));
            let parent_definition = self.member_definition(*parent)?;
            self.insert_inherited_groups(&parent_definition, chain)?;
        }
        Ok(())
    }

    fn insert_sequence(
        &self,
        defining: GroupToken,
        members: &[GroupToken],
        cache: bool,
        chain: &mut GroupChain,
    ) -> Result<()> {
        let cached = if cache {
            self.groups.cached_sequence(defining)
        } else {
            None
        };

        let sequence = match cached {
            Some(sequence) => sequence,
            None => {
                let mut processed = Vec::new();
                let resolved = self.resolve_sequence(defining, members, &mut processed)?;
                // Inherited markers join only after the expansion itself is
                // known to be well-formed.
                let expanded = self.expand_inherited_groups(resolved)?;
                let sequence = Sequence::new(defining, expanded);
                if cache {
                    self.groups.intern_sequence(sequence)
                } else {
                    Arc::new(sequence)
                }
            }
        };

        chain.insert_sequence((*sequence).clone());
        Ok(())
    }

    /// Depth-first flattening of a sequence definition.
    ///
    /// `processed` tracks the sequences on the current recursion path;
    /// re-encountering one means the definition transitively contains itself.
    fn resolve_sequence(
        &self,
        defining: GroupToken,
        members: &[GroupToken],
        processed: &mut Vec<GroupToken>,
    ) -> Result<Vec<Group>> {
        if processed.contains(&defining) {
            return Err(Error::GroupDefinition(format!(
                "cyclic dependency in definition of group sequence '{}'",
                self.groups.describe(defining)
            )));
        }
        processed.push(defining);

        let mut resolved = Vec::new();
        for member in members {
            let definition = self.member_definition(*member)?;
            if definition.kind == GroupKind::Sequence {
                let nested = self.resolve_sequence(*member, &definition.members, processed)?;
                self.splice_groups(&mut resolved, nested)?;
            } else {
                self.splice_groups(&mut resolved, [Group::with_sequence(*member, Some(defining))])?;
            }
        }

        Ok(resolved)
    }

    /// Appends groups to a sequence expansion, enforcing the duplicate rule:
    /// a group already present is tolerated only while it is the most recent
    /// entry, anything earlier is a definition error.
    fn splice_groups(
        &self,
        resolved: &mut Vec<Group>,
        additions: impl IntoIterator<Item = Group>,
    ) -> Result<()> {
        for group in additions {
            if let Some(index) = resolved.iter().position(|existing| *existing == group) {
                if index + 1 < resolved.len() {
                    return Err(Error::GroupDefinition(format!(
                        "group '{}' appears at non-adjacent positions of one expanded sequence",
                        self.groups.describe(group.token())
                    )));
                }
            }
            resolved.push(group);
        }
        Ok(())
    }

    /// Splices each member's inherited markers in right after the member, then
    /// re-checks the duplicate rule over the full expansion.
    fn expand_inherited_groups(&self, resolved: Vec<Group>) -> Result<Vec<Group>> {
        let mut expanded = Vec::with_capacity(resolved.len());
        for group in &resolved {
            expanded.push(*group);
            self.push_inherited(group.token(), group.defining_sequence(), &mut expanded)?;
        }

        for (index, group) in expanded.iter().enumerate() {
            if let Some(first) = expanded[..index].iter().position(|earlier| earlier == group) {
                if first + 1 < index {
                    return Err(Error::GroupDefinition(format!(
                        "group '{}' appears at non-adjacent positions of one expanded sequence",
                        self.groups.describe(group.token())
                    )));
                }
            }
        }

        Ok(expanded)
    }

    fn push_inherited(
        &self,
        token: GroupToken,
        defining_sequence: Option<GroupToken>,
        expanded: &mut Vec<Group>,
    ) -> Result<()> {
        let definition = self.member_definition(token)?;
        for parent in &definition.parents {
            let parent_definition = self.member_definition(*parent)?;
            if parent_definition.kind == GroupKind::Sequence {
                return Err(Error::GroupDefinition(format!(
                    "group sequence '{}' must not be composed through marker inheritance",
                    parent_definition.name
                )));
            }
            expanded.push(Group::with_sequence(*parent, defining_sequence));
            self.push_inherited(*parent, defining_sequence, expanded)?;
        }
        Ok(())
    }

    /// Lookup for caller-supplied tokens.
    fn requested_definition(&self, token: GroupToken) -> Result<Arc<GroupDefinition>> {
        self.groups.definition(token).ok_or_else(|| {
            Error::InvalidArgument(format!("validation group {token} is not registered"))
        })
    }

    /// Lookup for tokens referenced from other definitions.
    fn member_definition(&self, token: GroupToken) -> Result<Arc<GroupDefinition>> {
        self.groups
            .definition(token)
            .ok_or(Error::GroupNotFound(token))
    }
}
