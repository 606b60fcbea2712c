//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::{info, warn};

use crate::bootstrap::{BootstrapOptions, bootstrap_with};
use crate::collaborators::{Collaborator, Collaborators, ProcessControl};
use crate::config_store::ConfigStore;
use crate::dispatch::DispatchConnectionHandler;
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::SignalLoop;

/// Runs the daemon in the foreground until a termination signal or a
/// `shutdown` request arrives.
///
/// The system monitor and alert manager are not bound here; the methods that
/// need them answer `unavailable` until an embedding binary supplies them
/// through [`bootstrap_with`].
pub fn run_daemon(options: &BootstrapOptions) -> Result<(), LaunchError> {
    let store = Arc::new(ConfigStore::new());
    let signals = SignalLoop::install()?;
    let process: Arc<dyn ProcessControl> = Arc::new(signals.control());
    let collaborators = Collaborators {
        process: Collaborator::bound(process),
        ..Collaborators::default()
    };

    let daemon = bootstrap_with(Arc::clone(&store), options, collaborators)?;
    let config = store.snapshot();
    config.socket.prepare_filesystem()?;
    let listener = SocketListener::bind(&config.socket)?;
    info!(
        target: PROCESS_TARGET,
        socket = %listener.path(),
        pid = std::process::id(),
        "daemon ready"
    );

    let handler = Arc::new(DispatchConnectionHandler::new(
        daemon.dispatcher(),
        daemon.store(),
    ));
    let listener = listener.start(handler)?;

    let reason = signals.run(&store);
    info!(target: PROCESS_TARGET, ?reason, "shutting down");
    listener.shutdown();
    if let Err(error) = listener.join() {
        warn!(target: PROCESS_TARGET, %error, "listener did not stop cleanly");
        return Err(error.into());
    }
    info!(target: PROCESS_TARGET, "daemon stopped");
    Ok(())
}
