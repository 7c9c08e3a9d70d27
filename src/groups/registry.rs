//! Token-indexed storage for validation group definitions.
//!
//! One `GroupRegistry` lives inside every [`crate::MetadataRegistry`]. It owns the
//! marker and sequence definitions, mints [`GroupToken`]s from an atomic counter,
//! and carries the resolved-sequence cache shared by all
//! [`crate::groups::GroupChainResolver`] handles.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::groups::chain::Sequence;
use crate::metadata::token::GroupToken;
use crate::Result;

/// Name under which the pre-registered `Default` group is filed.
pub(crate) const DEFAULT_GROUP_NAME: &str = "Default";

/// What a registered group token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupKind {
    /// Interface-like marker, usable directly in validation requests.
    Interface,
    /// Class-like marker. Registration accepts it so that constraints can
    /// name it, but a validation request over it is rejected.
    Class,
    /// A sequence-defining marker with ordered members.
    Sequence,
}

/// One registered group marker or sequence.
#[derive(Debug, Clone)]
pub(crate) struct GroupDefinition {
    /// Marker name, unique within the owning registry.
    pub(crate) name: String,
    /// Interface-like, class-like or sequence-defining.
    pub(crate) kind: GroupKind,
    /// Extended markers. Only interface-like markers carry parents.
    pub(crate) parents: Vec<GroupToken>,
    /// Ordered member tokens. Only sequence definitions carry members.
    pub(crate) members: Vec<GroupToken>,
}

/// Thread-safe store of group definitions and resolved sequences.
///
/// Definitions are immutable once registered: a token, once handed out, always
/// describes the same marker. The resolved-sequence cache exploits this — a
/// sequence expansion never goes stale for the lifetime of the registry.
pub(crate) struct GroupRegistry {
    /// Primary definition storage ordered by token.
    definitions: SkipMap<GroupToken, Arc<GroupDefinition>>,
    /// Secondary index from marker name to token.
    by_name: DashMap<String, GroupToken>,
    /// Resolved sequences keyed by their defining token.
    resolved_sequences: DashMap<GroupToken, Arc<Sequence>>,
    /// Counter for minting group tokens. Token 0 stays reserved as null.
    next_token: AtomicU32,
}

impl GroupRegistry {
    /// Creates a registry with the `Default` group pre-registered under
    /// [`GroupToken::DEFAULT`].
    pub(crate) fn new() -> Self {
        let registry = GroupRegistry {
            definitions: SkipMap::new(),
            by_name: DashMap::new(),
            resolved_sequences: DashMap::new(),
            next_token: AtomicU32::new(1),
        };

        let token = registry.next_token();
        debug_assert_eq!(token, GroupToken::DEFAULT);
        registry.by_name.insert(DEFAULT_GROUP_NAME.to_string(), token);
        registry.definitions.insert(
            token,
            Arc::new(GroupDefinition {
                name: DEFAULT_GROUP_NAME.to_string(),
                kind: GroupKind::Interface,
                parents: Vec::new(),
                members: Vec::new(),
            }),
        );

        registry
    }

    fn next_token(&self) -> GroupToken {
        GroupToken::new(self.next_token.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a plain interface-like marker.
    pub(crate) fn register_group(&self, name: &str) -> Result<GroupToken> {
        self.register(GroupDefinition {
            name: name.to_string(),
            kind: GroupKind::Interface,
            parents: Vec::new(),
            members: Vec::new(),
        })
    }

    /// Registers an interface-like marker extending other markers.
    ///
    /// Parents must already be registered; a marker graph built this way is
    /// acyclic by construction, which the resolver's inheritance recursion
    /// relies on.
    pub(crate) fn register_group_extending(
        &self,
        name: &str,
        parents: &[GroupToken],
    ) -> Result<GroupToken> {
        for parent in parents {
            if !self.contains(*parent) {
                return Err(crate::Error::GroupNotFound(*parent));
            }
        }
        self.register(GroupDefinition {
            name: name.to_string(),
            kind: GroupKind::Interface,
            parents: parents.to_vec(),
            members: Vec::new(),
        })
    }

    /// Registers a class-like marker.
    pub(crate) fn register_class_group(&self, name: &str) -> Result<GroupToken> {
        self.register(GroupDefinition {
            name: name.to_string(),
            kind: GroupKind::Class,
            parents: Vec::new(),
            members: Vec::new(),
        })
    }

    /// Registers a sequence-defining marker.
    ///
    /// Members are late-bound: they may name tokens minted after this call,
    /// which is how mutually referencing sequences come into existence. Unknown
    /// members surface as errors when the sequence is resolved, not here.
    pub(crate) fn register_sequence(
        &self,
        name: &str,
        members: &[GroupToken],
    ) -> Result<GroupToken> {
        self.register(GroupDefinition {
            name: name.to_string(),
            kind: GroupKind::Sequence,
            parents: Vec::new(),
            members: members.to_vec(),
        })
    }

    fn register(&self, definition: GroupDefinition) -> Result<GroupToken> {
        match self.by_name.entry(definition.name.clone()) {
            Entry::Occupied(_) => Err(declaration_error!(
                "group marker '{}' is already registered",
                definition.name
            )),
            Entry::Vacant(slot) => {
                let token = self.next_token();
                self.definitions.insert(token, Arc::new(definition));
                slot.insert(token);
                Ok(token)
            }
        }
    }

    /// Looks up a definition by token.
    pub(crate) fn definition(&self, token: GroupToken) -> Option<Arc<GroupDefinition>> {
        self.definitions.get(&token).map(|entry| entry.value().clone())
    }

    /// Looks up a token by marker name.
    pub(crate) fn by_name(&self, name: &str) -> Option<GroupToken> {
        self.by_name.get(name).map(|entry| *entry.value())
    }

    /// Returns true if the token is registered.
    pub(crate) fn contains(&self, token: GroupToken) -> bool {
        self.definitions.contains_key(&token)
    }

    /// Human-readable identification of a token for error messages.
    pub(crate) fn describe(&self, token: GroupToken) -> String {
        match self.definition(token) {
            Some(definition) => definition.name.clone(),
            None => token.to_string(),
        }
    }

    /// Returns the cached expansion of a sequence, if one exists.
    pub(crate) fn cached_sequence(&self, defining: GroupToken) -> Option<Arc<Sequence>> {
        self.resolved_sequences
            .get(&defining)
            .map(|entry| entry.value().clone())
    }

    /// Caches a resolved sequence, converging concurrent first resolvers onto
    /// one instance: whoever loses the race adopts the winner's value.
    pub(crate) fn intern_sequence(&self, sequence: Sequence) -> Arc<Sequence> {
        match self.resolved_sequences.entry(sequence.defining_token()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(Arc::new(sequence)).clone(),
        }
    }
}
