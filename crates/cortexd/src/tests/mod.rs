//! Test suites for the cortex daemon.

pub(crate) mod support;
