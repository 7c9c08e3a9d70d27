//! Central registry for types, groups, constraint kinds and their metadata.
//!
//! This module provides the [`MetadataRegistry`], the thread-safe hub everything else
//! hangs off: type registration and hierarchy links, validation group definitions,
//! the constraint kind catalog, raw per-source configuration contributions, and the
//! cache of aggregated [`BeanMetaData`].
//!
//! # Key Components
//!
//! - [`MetadataRegistry`] - Central registry shared by all validators
//! - [`TypeDef`] - Registration input describing one type and its hierarchy links
//!
//! # Registry Architecture
//!
//! The registry uses a multi-index approach:
//!
//! - **Token-based lookup**: Primary type storage ordered by [`TypeToken`]
//! - **Name-based lookup**: Secondary index from type name to token
//! - **Contribution lists**: Append-only raw configuration per type
//! - **Metadata cache**: Aggregated bean metadata, built once per type
//!
//! # Thread Safety
//!
//! The registry is designed for one-shared-registry, many-concurrent-calls use:
//! - Lock-free ordered maps for primary storage (`SkipMap`)
//! - Concurrent hash maps for indices and caches (`DashMap`)
//! - Append-only vectors for contribution lists (`boxcar::Vec`)
//! - Atomic counters for token and constraint-id generation
//!
//! Registration and validation may interleave freely. Aggregated metadata is
//! immutable once cached; contributions made after a type's metadata was first
//! requested do not retroactively change it.
//!
//! # Examples
//!
//! ```rust
//! use verdict::metadata::raw::{ConfigurationSource, TypeConfiguration};
//! use verdict::metadata::raw::ConstrainedProperty;
//! use verdict::metadata::descriptor::ConstraintDef;
//! use verdict::metadata::shape::ValueShape;
//! use verdict::{MetadataRegistry, TypeDef};
//!
//! let registry = MetadataRegistry::new();
//! let address = registry.register_type(TypeDef::new("Address"))?;
//!
//! registry.contribute(
//!     address,
//!     ConfigurationSource::Annotation,
//!     TypeConfiguration::new().with_property(
//!         ConstrainedProperty::field("street", ValueShape::Str)
//!             .with_constraint(ConstraintDef::new("NotNull")),
//!     ),
//! )?;
//! # Ok::<(), verdict::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};
use rayon::prelude::*;

use crate::groups::registry::GroupRegistry;
use crate::groups::GroupChainResolver;
use crate::metadata::aggregated::BeanMetaData;
use crate::metadata::descriptor::{ConstraintCatalog, ConstraintKindDef};
use crate::metadata::hierarchy::{compute_lineage, TypeLink};
use crate::metadata::raw::{ConfigurationSource, TypeConfiguration};
use crate::metadata::token::{GroupToken, TypeToken};
use crate::{Error, Result};

/// Registration input describing one type.
///
/// Hierarchy links name tokens minted earlier, so registration order is
/// ancestors first and the resulting hierarchy graph is acyclic by
/// construction. Synthetic types are walked through during lineage computation
/// but host no metadata of their own — the escape hatch for framework proxy
/// types that sit in a hierarchy without contributing constraints.
///
/// # Examples
///
/// ```rust
/// use verdict::{MetadataRegistry, TypeDef};
///
/// let registry = MetadataRegistry::new();
/// let auditable = registry.register_type(TypeDef::new("Auditable"))?;
/// let base = registry.register_type(TypeDef::new("BaseEntity"))?;
/// let order = registry.register_type(
///     TypeDef::new("Order")
///         .with_supertype(base)
///         .with_interface(auditable),
/// )?;
/// assert!(registry.type_by_name("Order") == Some(order));
/// # Ok::<(), verdict::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: String,
    supertype: Option<TypeToken>,
    interfaces: Vec<TypeToken>,
    synthetic: bool,
}

impl TypeDef {
    /// Starts a definition for a type with the given name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        TypeDef {
            name: name.to_string(),
            supertype: None,
            interfaces: Vec::new(),
            synthetic: false,
        }
    }

    /// Sets the direct supertype.
    #[must_use]
    pub fn with_supertype(mut self, supertype: TypeToken) -> Self {
        self.supertype = Some(supertype);
        self
    }

    /// Adds a directly implemented interface.
    #[must_use]
    pub fn with_interface(mut self, interface: TypeToken) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Marks the type as synthetic: excluded from every lineage, but its own
    /// ancestors are still reached through it.
    #[must_use]
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}

/// Stored form of a registered type.
struct TypeRecord {
    name: String,
    link: TypeLink,
}

/// One raw configuration contribution for a type.
#[derive(Debug, Clone)]
pub(crate) struct Contribution {
    pub(crate) source: ConfigurationSource,
    pub(crate) configuration: TypeConfiguration,
}

/// Thread-safe registry of types, groups, constraint kinds and aggregated
/// metadata.
///
/// One registry is shared by all [`crate::Validator`] instances validating the
/// same model. Registration populates it; [`MetadataRegistry::bean_metadata`]
/// aggregates and caches the per-type model on first request;
/// [`MetadataRegistry::bootstrap`] forces aggregation for every registered type
/// up front.
///
/// # Token Spaces
///
/// Type tokens and group tokens are minted from independent counters and are
/// not interchangeable. Token 0 is reserved as the null token in both spaces;
/// the `Default` group is pre-registered under [`GroupToken::DEFAULT`].
pub struct MetadataRegistry {
    /// Primary type storage ordered by token.
    types: SkipMap<TypeToken, Arc<TypeRecord>>,
    /// Secondary index from type name to token.
    types_by_name: DashMap<String, TypeToken>,
    /// Raw per-source configuration, append-only per type.
    contributions: DashMap<TypeToken, boxcar::Vec<Contribution>>,
    /// Aggregated metadata, built once per type.
    bean_metadata_cache: DashMap<TypeToken, Arc<BeanMetaData>>,
    /// Group marker definitions, shared with every resolver handle.
    groups: Arc<GroupRegistry>,
    /// Registered constraint kinds and their validator bindings.
    constraints: ConstraintCatalog,
    /// Counter for minting type tokens. Token 0 stays reserved as null.
    next_token: AtomicU32,
    /// Counter for minting constraint descriptor ids.
    next_constraint_id: AtomicU32,
}

impl MetadataRegistry {
    /// Creates an empty registry with the `Default` group pre-registered.
    #[must_use]
    pub fn new() -> Self {
        MetadataRegistry {
            types: SkipMap::new(),
            types_by_name: DashMap::new(),
            contributions: DashMap::new(),
            bean_metadata_cache: DashMap::new(),
            groups: Arc::new(GroupRegistry::new()),
            constraints: ConstraintCatalog::new(),
            next_token: AtomicU32::new(1),
            next_constraint_id: AtomicU32::new(1),
        }
    }

    fn next_token(&self) -> TypeToken {
        let next_token = self.next_token.fetch_add(1, Ordering::Relaxed);
        debug_assert!(next_token != u32::MAX, "type token space exhausted");
        TypeToken::new(next_token)
    }

    /// Registers a type and returns its token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Declaration`] if the name is already taken and
    /// [`Error::TypeNotFound`] if the supertype or an interface was never
    /// registered.
    pub fn register_type(&self, definition: TypeDef) -> Result<TypeToken> {
        if let Some(supertype) = definition.supertype {
            if !self.types.contains_key(&supertype) {
                return Err(Error::TypeNotFound(supertype));
            }
        }
        for interface in &definition.interfaces {
            if !self.types.contains_key(interface) {
                return Err(Error::TypeNotFound(*interface));
            }
        }

        match self.types_by_name.entry(definition.name.clone()) {
            Entry::Occupied(_) => Err(declaration_error!(
                "type '{}' is already registered",
                definition.name
            )),
            Entry::Vacant(slot) => {
                let token = self.next_token();
                self.types.insert(
                    token,
                    Arc::new(TypeRecord {
                        name: definition.name,
                        link: TypeLink {
                            supertype: definition.supertype,
                            interfaces: definition.interfaces,
                            synthetic: definition.synthetic,
                        },
                    }),
                );
                slot.insert(token);
                Ok(token)
            }
        }
    }

    /// Looks up a type token by name.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<TypeToken> {
        self.types_by_name.get(name).map(|entry| *entry.value())
    }

    /// Returns the registered name of a type.
    #[must_use]
    pub fn type_name(&self, token: TypeToken) -> Option<String> {
        self.types.get(&token).map(|entry| entry.value().name.clone())
    }

    /// Name if registered, token display otherwise. For error messages.
    pub(crate) fn type_display(&self, token: TypeToken) -> String {
        match self.type_name(token) {
            Some(name) => name,
            None => token.to_string(),
        }
    }

    pub(crate) fn type_link(&self, token: TypeToken) -> Result<TypeLink> {
        self.types
            .get(&token)
            .map(|entry| entry.value().link.clone())
            .ok_or(Error::TypeNotFound(token))
    }

    /// Linearized hierarchy of a type: itself, interfaces depth-first, then the
    /// supertype chain. Deduplicated at first visit, synthetic types skipped.
    pub(crate) fn lineage(&self, token: TypeToken) -> Result<Vec<TypeToken>> {
        compute_lineage(token, &|token| self.type_link(token))
    }

    /// The supertype chain only: the type itself, then each non-synthetic
    /// ancestor class, most derived first.
    pub(crate) fn class_hierarchy(&self, token: TypeToken) -> Result<Vec<TypeToken>> {
        let mut hierarchy = Vec::new();
        let mut current = Some(token);
        while let Some(token) = current {
            let link = self.type_link(token)?;
            if !link.synthetic {
                hierarchy.push(token);
            }
            current = link.supertype;
        }
        Ok(hierarchy)
    }

    /// The type itself plus the transitive closure of its directly implemented
    /// interfaces. This is the declaring-type set whose constraints count as
    /// "direct" for the per-class default group walk.
    pub(crate) fn direct_types(&self, token: TypeToken) -> Result<Vec<TypeToken>> {
        let mut direct = vec![token];
        let link = self.type_link(token)?;
        let mut pending = link.interfaces.clone();
        while let Some(interface) = pending.pop() {
            if direct.contains(&interface) {
                continue;
            }
            let link = self.type_link(interface)?;
            if !link.synthetic {
                direct.push(interface);
            }
            pending.extend(link.interfaces.iter().copied());
        }
        Ok(direct)
    }

    /// True if `sub` is a strict subtype of `sup` (reachable through hierarchy
    /// links, and not the same type).
    pub(crate) fn is_strict_subtype(&self, sub: TypeToken, sup: TypeToken) -> bool {
        if sub == sup {
            return false;
        }
        self.lineage(sub)
            .map(|lineage| lineage.contains(&sup))
            .unwrap_or(false)
    }

    /// Registers a plain interface-like group marker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Declaration`] if the name is already taken.
    pub fn register_group(&self, name: &str) -> Result<GroupToken> {
        self.groups.register_group(name)
    }

    /// Registers an interface-like marker extending other markers. Requesting
    /// the new marker for validation also validates everything it extends.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Declaration`] for a duplicate name and
    /// [`Error::GroupNotFound`] for an unregistered parent.
    pub fn register_group_extending(
        &self,
        name: &str,
        parents: &[GroupToken],
    ) -> Result<GroupToken> {
        self.groups.register_group_extending(name, parents)
    }

    /// Registers a class-like marker. Constraints may name it, but passing it
    /// to a validation entry point is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Declaration`] if the name is already taken.
    pub fn register_class_group(&self, name: &str) -> Result<GroupToken> {
        self.groups.register_class_group(name)
    }

    /// Registers a sequence-defining marker.
    ///
    /// Members are late-bound and may name tokens minted after this call;
    /// unknown or cyclic members surface when the sequence is resolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Declaration`] if the name is already taken.
    pub fn register_sequence(&self, name: &str, members: &[GroupToken]) -> Result<GroupToken> {
        self.groups.register_sequence(name, members)
    }

    /// Looks up a group token by marker name. The `Default` group is always
    /// registered under the name `"Default"`.
    #[must_use]
    pub fn group_by_name(&self, name: &str) -> Option<GroupToken> {
        self.groups.by_name(name)
    }

    /// Creates a resolver handle over this registry's group definitions.
    #[must_use]
    pub fn group_resolver(&self) -> GroupChainResolver {
        GroupChainResolver::new(self.groups.clone())
    }

    /// Registers a constraint kind with its validator bindings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Declaration`] for a duplicate kind name or two
    /// validators bound to the exact same shape set.
    pub fn register_constraint(&self, def: ConstraintKindDef) -> Result<()> {
        self.constraints.register(def)
    }

    pub(crate) fn catalog(&self) -> &ConstraintCatalog {
        &self.constraints
    }

    pub(crate) fn constraint_ids(&self) -> &AtomicU32 {
        &self.next_constraint_id
    }

    /// Appends a raw configuration contribution for a type.
    ///
    /// Contributions are kept per source and merged during aggregation, where
    /// a higher-priority source declaring a property overrides lower-priority
    /// declarations of the same property on the same type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if the target type was never registered.
    pub fn contribute(
        &self,
        target: TypeToken,
        source: ConfigurationSource,
        configuration: TypeConfiguration,
    ) -> Result<()> {
        if !self.types.contains_key(&target) {
            return Err(Error::TypeNotFound(target));
        }
        self.contributions
            .entry(target)
            .or_default()
            .push(Contribution {
                source,
                configuration,
            });
        Ok(())
    }

    /// Snapshot of the contributions recorded for a type so far.
    pub(crate) fn contributions_for(&self, token: TypeToken) -> Vec<Contribution> {
        match self.contributions.get(&token) {
            Some(list) => list.iter().map(|(_, entry)| entry.clone()).collect(),
            None => Vec::new(),
        }
    }

    /// Returns the aggregated metadata for a type, building it on first use.
    ///
    /// Concurrent first requests may build in parallel; whoever loses the
    /// publication race adopts the winner's instance, so all callers converge
    /// on one `Arc` and a partially built value is never observable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] for an unregistered token, or the
    /// declaration/group-definition error that aggregation ran into.
    pub fn bean_metadata(&self, token: TypeToken) -> Result<Arc<BeanMetaData>> {
        if let Some(cached) = self.bean_metadata_cache.get(&token) {
            return Ok(cached.value().clone());
        }

        let built = Arc::new(BeanMetaData::build(self, token)?);
        match self.bean_metadata_cache.entry(token) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => Ok(slot.insert(built).clone()),
        }
    }

    /// Eagerly aggregates metadata for every registered type.
    ///
    /// Aggregation runs in parallel across types; the first declaration error
    /// aborts the pass. Useful to front-load all declaration checking instead
    /// of paying it on first validation.
    ///
    /// # Errors
    ///
    /// Propagates the first aggregation error encountered.
    pub fn bootstrap(&self) -> Result<()> {
        let tokens: Vec<TypeToken> = self.types.iter().map(|entry| *entry.key()).collect();
        tokens
            .par_iter()
            .try_for_each(|token| self.bean_metadata(*token).map(|_| ()))
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new()
    }
}
