use crate::metadata::raw::{CascadeDef, ContainerSlot, GroupConversionDef};
use crate::metadata::token::GroupToken;
use crate::Result;

/// Merged cascading state of one container element slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerCascade {
    slot: ContainerSlot,
    cascade: bool,
    conversions: Vec<GroupConversionDef>,
}

impl ContainerCascade {
    /// The container position this entry covers
    #[must_use]
    pub fn slot(&self) -> ContainerSlot {
        self.slot
    }

    /// Returns true if elements in this slot cascade
    #[must_use]
    pub fn is_cascading(&self) -> bool {
        self.cascade
    }

    /// The target group for `group` on this cascaded edge
    #[must_use]
    pub fn convert_group(&self, group: GroupToken) -> GroupToken {
        self.conversions
            .iter()
            .find(|c| c.from == group)
            .map_or(group, |c| c.to)
    }
}

/// Hierarchy- and source-merged cascading metadata for one element.
///
/// The aggregate of every [`CascadeDef`] declared for the element anywhere in the
/// hierarchy: cascade flags are OR-combined, group conversions are collected, and
/// container element slots are merged per slot. Two conversions for the same source
/// group are contradictory and rejected at build time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadingMetaData {
    cascade: bool,
    conversions: Vec<GroupConversionDef>,
    containers: Vec<ContainerCascade>,
}

impl CascadingMetaData {
    /// Folds one raw declaration into the aggregate
    pub(crate) fn merge_def(&mut self, def: &CascadeDef) {
        if def.is_cascading() {
            self.cascade = true;
        }
        self.conversions.extend_from_slice(def.conversions());

        for element in def.container_elements() {
            match self.containers.iter_mut().find(|c| c.slot == element.slot()) {
                Some(existing) => {
                    if element.is_cascading() {
                        existing.cascade = true;
                    }
                    existing.conversions.extend_from_slice(element.conversions());
                }
                None => self.containers.push(ContainerCascade {
                    slot: element.slot(),
                    cascade: element.is_cascading(),
                    conversions: element.conversions().to_vec(),
                }),
            }
        }
    }

    /// Validates the aggregate, rejecting duplicate conversion sources.
    pub(crate) fn validate(&self, element: &str) -> Result<()> {
        check_conversion_sources(&self.conversions, element)?;
        for container in &self.containers {
            check_conversion_sources(
                &container.conversions,
                &format!("{element}<{}>", container.slot),
            )?;
        }
        Ok(())
    }

    /// Returns true if the element value itself cascades
    #[must_use]
    pub fn is_cascading(&self) -> bool {
        self.cascade
    }

    /// Group conversions on the element's own cascaded edge
    #[must_use]
    pub fn conversions(&self) -> &[GroupConversionDef] {
        &self.conversions
    }

    /// Merged container slots
    #[must_use]
    pub fn containers(&self) -> &[ContainerCascade] {
        &self.containers
    }

    /// The merged entry for one slot, if anything was declared for it
    #[must_use]
    pub fn container(&self, slot: ContainerSlot) -> Option<&ContainerCascade> {
        self.containers.iter().find(|c| c.slot == slot)
    }

    /// The target group for `group` on the element's own cascaded edge
    #[must_use]
    pub fn convert_group(&self, group: GroupToken) -> GroupToken {
        self.conversions
            .iter()
            .find(|c| c.from == group)
            .map_or(group, |c| c.to)
    }

    /// Returns true if the traversal has to visit this element at all
    #[must_use]
    pub fn requires_traversal(&self) -> bool {
        self.cascade || self.containers.iter().any(|c| c.cascade)
    }
}

fn check_conversion_sources(conversions: &[GroupConversionDef], element: &str) -> Result<()> {
    for (i, conversion) in conversions.iter().enumerate() {
        if conversions[..i].iter().any(|c| c.from == conversion.from) {
            return Err(declaration_error!(
                "element '{element}' declares more than one group conversion for source group {}",
                conversion.from
            ));
        }
    }
    Ok(())
}
