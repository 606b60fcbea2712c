//! Connection handling abstraction for the daemon listener.

use std::os::unix::net::UnixStream;

/// Handles accepted socket connections.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: UnixStream);
}
