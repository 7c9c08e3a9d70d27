use std::hash::{Hash, Hasher};

use crate::metadata::token::GroupToken;
use crate::{Error, Result};

/// One group to validate, remembering the sequence it was expanded from.
///
/// Equality and hashing look at the group token only. Two occurrences of the
/// same group are the same group for duplicate detection and processed-set
/// tracking, no matter which sequence pulled them in.
#[derive(Debug, Clone, Copy)]
pub struct Group {
    token: GroupToken,
    defining_sequence: Option<GroupToken>,
}

impl Group {
    /// The `Default` group, standalone.
    pub const DEFAULT: Group = Group {
        token: GroupToken::DEFAULT,
        defining_sequence: None,
    };

    /// A standalone group
    #[must_use]
    pub fn new(token: GroupToken) -> Self {
        Group {
            token,
            defining_sequence: None,
        }
    }

    /// A group owned by a resolved sequence
    #[must_use]
    pub(crate) fn with_sequence(token: GroupToken, defining_sequence: Option<GroupToken>) -> Self {
        Group {
            token,
            defining_sequence,
        }
    }

    /// The group token
    #[must_use]
    pub fn token(&self) -> GroupToken {
        self.token
    }

    /// The sequence this group was expanded from, if any
    #[must_use]
    pub fn defining_sequence(&self) -> Option<GroupToken> {
        self.defining_sequence
    }

    /// Returns true if this is the `Default` group
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.token.is_default()
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

/// A fully resolved sequence: ordered groups that must validate in order with
/// short-circuit on the first member producing violations.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    defining: GroupToken,
    groups: Vec<Group>,
}

impl Sequence {
    pub(crate) fn new(defining: GroupToken, groups: Vec<Group>) -> Self {
        Sequence { defining, groups }
    }

    /// The sequence-defining group token
    #[must_use]
    pub fn defining_token(&self) -> GroupToken {
        self.defining
    }

    /// Member groups in validation order
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }
}

/// The resolved validation order: standalone groups first, then sequences.
///
/// Standalone groups run unconditionally in insertion order. Sequences run
/// after them; see the engine for the stop semantics when a member fails.
#[derive(Debug, Clone, Default)]
pub struct GroupChain {
    groups: Vec<Group>,
    sequences: Vec<Sequence>,
}

impl GroupChain {
    /// Standalone groups in validation order
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Resolved sequences in validation order
    #[must_use]
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub(crate) fn insert_group(&mut self, group: Group) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    pub(crate) fn insert_sequence(&mut self, sequence: Sequence) {
        if !self.sequences.contains(&sequence) {
            self.sequences.push(sequence);
        }
    }

    /// Verifies that a redefined default group sequence can substitute for the
    /// `Default` member of every sequence in this chain.
    ///
    /// Substitution is in-place: each member of `redefined` must either be
    /// absent from the surrounding sequence, or sit immediately adjacent to the
    /// `Default` position (first member directly before it, last member
    /// directly after it). Anything else would reorder the surrounding
    /// sequence, which has no well-defined meaning.
    pub fn assert_default_group_sequence_expandable(
        &self,
        redefined: &[GroupToken],
    ) -> Result<()> {
        for sequence in &self.sequences {
            let Some(default_index) = sequence.groups().iter().position(Group::is_default) else {
                continue;
            };
            for (position, member) in redefined.iter().enumerate() {
                if member.is_default() {
                    // The placeholder being substituted for.
                    continue;
                }
                let Some(index) = sequence.groups().iter().position(|g| g.token() == *member)
                else {
                    continue;
                };
                let leading = position == 0 && index + 1 == default_index;
                let trailing = position + 1 == redefined.len() && index == default_index + 1;
                if !leading && !trailing {
                    return Err(Error::GroupDefinition(format!(
                        "redefined default group sequence member {member} conflicts with the ordering of sequence {}",
                        sequence.defining_token()
                    )));
                }
            }
        }
        Ok(())
    }
}
