//! Unix-domain socket listener for client connections.
//!
//! The listener binds the configured socket path with the configured backlog
//! and accepts connections on a background thread, handing each one to a
//! [`ConnectionHandler`] on its own thread.

mod errors;
mod handler;
mod listener;
mod rate_limit;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::handler::ConnectionHandler;
pub use self::listener::{ListenerHandle, SocketListener};
pub use self::rate_limit::RateLimiter;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
