#![allow(dead_code, unused_variables, unused_mut)]
#![allow(clippy::needless_return, clippy::too_many_arguments, clippy::collapsible_if,
         clippy::collapsible_else_if, clippy::field_reassign_with_default,
         clippy::manual_range_contains, clippy::identity_op, clippy::float_cmp,
         clippy::needless_range_loop, clippy::manual_clamp, clippy::nonminimal_bool)]

pub mod cg_local;
pub mod cg_syscalls;
pub mod cg_localents;
pub mod cg_effects;
