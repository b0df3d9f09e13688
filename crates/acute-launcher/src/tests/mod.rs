//! Crate-level tests exercising the supervisor end to end.

pub(crate) mod support;
