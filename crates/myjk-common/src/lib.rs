#![allow(dead_code, unused_variables, unused_mut)]
#![allow(clippy::needless_return, clippy::too_many_arguments, clippy::collapsible_if,
         clippy::collapsible_else_if, clippy::field_reassign_with_default,
         clippy::manual_range_contains, clippy::identity_op, clippy::float_cmp,
         clippy::needless_range_loop, clippy::manual_clamp, clippy::nonminimal_bool)]

pub mod q_shared;
pub mod bg_misc;
pub mod cvar;
pub mod common;
