//! Process lifecycle: signal handling and the daemon run loop.

mod errors;
pub(crate) mod launch;
pub(crate) mod shutdown;

pub use errors::LaunchError;
pub use launch::run_daemon;
pub use shutdown::{ShutdownError, SignalLoop, SignalProcessControl, StopReason};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
