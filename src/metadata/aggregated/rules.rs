//! Consistency rules for constrained executables across a type hierarchy.
//!
//! When several hierarchy types declare the same executable signature, the
//! declarations must agree on who owns which part of the contract: parameter
//! constraints belong to the topmost declaration, parallel branches must not
//! compete for them, and the return value may cascade at most once per
//! override line. Every violation is a declaration error raised while the
//! bean metadata is built, long before any value is validated.

use crate::metadata::raw::{ConstrainedContainerElement, ConstrainedExecutable};
use crate::metadata::token::TypeToken;
use crate::Result;

/// Checks every hierarchy consistency rule over the surviving declarations of
/// one executable signature.
///
/// `declarations` holds at most one entry per hierarchy type. `is_strict_subtype`
/// answers whether the first type extends the second (never true for equal
/// tokens); two types with no subtype relation in either direction are parallel
/// branches. `type_name` supplies display names for error messages.
pub(crate) fn assert_executable_hierarchy_rules<S, N>(
    declarations: &[(TypeToken, ConstrainedExecutable)],
    is_strict_subtype: S,
    type_name: N,
) -> Result<()>
where
    S: Fn(TypeToken, TypeToken) -> bool,
    N: Fn(TypeToken) -> String,
{
    for (declaring, executable) in declarations {
        assert_void_unconstrained(*declaring, executable, &type_name)?;
    }

    for (left_index, (left_type, left)) in declarations.iter().enumerate() {
        for (right_type, right) in declarations.iter().skip(left_index + 1) {
            if is_strict_subtype(*left_type, *right_type) {
                assert_override_rules(*left_type, left, *right_type, right, &type_name)?;
            } else if is_strict_subtype(*right_type, *left_type) {
                assert_override_rules(*right_type, right, *left_type, left, &type_name)?;
            } else {
                assert_parallel_rules(*left_type, left, *right_type, right, &type_name)?;
            }
        }
    }

    Ok(())
}

/// Rules over an override pair, `sub` declared on a strict subtype of `sup`'s
/// declaring type.
fn assert_override_rules<N>(
    sub_type: TypeToken,
    sub: &ConstrainedExecutable,
    super_type: TypeToken,
    sup: &ConstrainedExecutable,
    type_name: &N,
) -> Result<()>
where
    N: Fn(TypeToken) -> String,
{
    // The parameter contract is fixed by the topmost declaration. A subtype may
    // restate it verbatim but never strengthen or reshape it; declaring nothing
    // is plain inheritance and stays legal.
    if sub.has_parameter_constraints() && !sub.is_equally_parameter_constrained(sup) {
        return Err(declaration_error!(
            "overriding executable '{}#{}' must not alter the parameter constraints declared by '{}#{}'",
            type_name(sub_type),
            sub.signature(),
            type_name(super_type),
            sup.signature()
        ));
    }

    // One cascading marker per override line; restating it lower down is an error.
    if sub.is_return_marked_cascading() && sup.is_return_marked_cascading() {
        return Err(declaration_error!(
            "return value of '{}' is marked for cascaded validation on both '{}' and '{}' within one hierarchy line",
            sub.signature(),
            type_name(sub_type),
            type_name(super_type)
        ));
    }

    Ok(())
}

/// Rules over a parallel pair, declared on two types with no subtype relation.
fn assert_parallel_rules<N>(
    left_type: TypeToken,
    left: &ConstrainedExecutable,
    right_type: TypeToken,
    right: &ConstrainedExecutable,
    type_name: &N,
) -> Result<()>
where
    N: Fn(TypeToken) -> String,
{
    // Neither branch outranks the other, so any parameter constraint here has
    // no well-defined precedence for a type inheriting both.
    if left.has_parameter_constraints() || right.has_parameter_constraints() {
        return Err(declaration_error!(
            "parallel declarations of '{}' on '{}' and '{}' must not define parameter constraints",
            left.signature(),
            type_name(left_type),
            type_name(right_type)
        ));
    }

    if left.has_return_group_conversions() || right.has_return_group_conversions() {
        return Err(declaration_error!(
            "parallel declarations of '{}' on '{}' and '{}' must not define group conversions for a cascaded return value",
            left.signature(),
            type_name(left_type),
            type_name(right_type)
        ));
    }

    Ok(())
}

/// A void executable has no return value to constrain or cascade into.
fn assert_void_unconstrained<N>(
    declaring: TypeToken,
    executable: &ConstrainedExecutable,
    type_name: &N,
) -> Result<()>
where
    N: Fn(TypeToken) -> String,
{
    if !executable.is_void() {
        return Ok(());
    }

    let return_declared = !executable.return_constraints().is_empty()
        || executable.is_return_marked_cascading()
        || executable.has_return_group_conversions()
        || executable
            .return_cascade()
            .container_elements()
            .iter()
            .any(ConstrainedContainerElement::is_constrained);

    if return_declared {
        return Err(declaration_error!(
            "void executable '{}#{}' must not declare return value constraints or cascaded validation",
            type_name(declaring),
            executable.signature()
        ));
    }

    Ok(())
}
