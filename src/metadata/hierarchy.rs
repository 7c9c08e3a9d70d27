use std::collections::HashSet;

use crate::metadata::token::TypeToken;
use crate::Result;

/// Hierarchy links of one registered type, as the lineage walk needs them.
#[derive(Debug, Clone)]
pub(crate) struct TypeLink {
    /// Direct supertype, if any
    pub supertype: Option<TypeToken>,
    /// Directly declared interfaces, in declaration order
    pub interfaces: Vec<TypeToken>,
    /// Synthetic types are walked through but never appear in a lineage
    pub synthetic: bool,
}

/// Computes the linearized, deduplicated lineage of a type.
///
/// Order: the type itself, then each directly declared interface followed recursively
/// by the interfaces it extends, then the supertype with *its* interfaces, and so on
/// up the chain. Every type appears at most once, at its first-visit position, which
/// is what makes constraints hosted on a diamond-inherited interface evaluate exactly
/// once. Synthetic entries are skipped while their own ancestors are still visited.
///
/// Hierarchy links can only reference tokens minted earlier, so the walk is finite by
/// construction.
///
/// # Errors
/// Propagates lookup failures for dangling tokens.
pub(crate) fn compute_lineage<F>(root: TypeToken, lookup: &F) -> Result<Vec<TypeToken>>
where
    F: Fn(TypeToken) -> Result<TypeLink>,
{
    let mut lineage = Vec::new();
    let mut seen = HashSet::new();
    visit_type(root, lookup, &mut lineage, &mut seen)?;
    Ok(lineage)
}

fn visit_type<F>(
    token: TypeToken,
    lookup: &F,
    lineage: &mut Vec<TypeToken>,
    seen: &mut HashSet<TypeToken>,
) -> Result<()>
where
    F: Fn(TypeToken) -> Result<TypeLink>,
{
    if !seen.insert(token) {
        return Ok(());
    }

    let link = lookup(token)?;
    if !link.synthetic {
        lineage.push(token);
    }

    for interface in &link.interfaces {
        visit_interface(*interface, lookup, lineage, seen)?;
    }
    if let Some(supertype) = link.supertype {
        visit_type(supertype, lookup, lineage, seen)?;
    }
    Ok(())
}

fn visit_interface<F>(
    token: TypeToken,
    lookup: &F,
    lineage: &mut Vec<TypeToken>,
    seen: &mut HashSet<TypeToken>,
) -> Result<()>
where
    F: Fn(TypeToken) -> Result<TypeLink>,
{
    if !seen.insert(token) {
        return Ok(());
    }

    let link = lookup(token)?;
    if !link.synthetic {
        lineage.push(token);
    }

    for extended in &link.interfaces {
        visit_interface(*extended, lookup, lineage, seen)?;
    }
    Ok(())
}
