use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::{info, warn};

use crate::collaborators::{ProcessControl, ShutdownRequestError};
use crate::config_store::ConfigStore;

use super::PROCESS_TARGET;

/// Errors reported by the signal listener.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Why the signal loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A termination signal arrived.
    Signal(i32),
    /// The loop was closed through [`SignalProcessControl`].
    Requested,
}

/// Blocks the main thread on process signals.
///
/// SIGHUP reloads the configuration; SIGTERM, SIGINT and SIGQUIT stop the
/// loop. A `shutdown` request closes the loop through its
/// [`SignalProcessControl`].
pub struct SignalLoop {
    signals: Signals,
}

impl SignalLoop {
    /// Registers the handled signals.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self { signals })
    }

    /// Process control that ends [`SignalLoop::run`] when asked to shut down.
    pub fn control(&self) -> SignalProcessControl {
        SignalProcessControl {
            handle: self.signals.handle(),
        }
    }

    /// Serves signals until a termination signal or a shutdown request.
    pub fn run(mut self, store: &ConfigStore) -> StopReason {
        let reason = serve_signals(self.signals.forever(), store);
        info!(target: PROCESS_TARGET, ?reason, "signal loop finished");
        reason
    }
}

fn serve_signals(signals: impl IntoIterator<Item = i32>, store: &ConfigStore) -> StopReason {
    for signal in signals {
        if signal == SIGHUP {
            info!(target: PROCESS_TARGET, signal, "reloading configuration");
            if let Err(error) = store.reload() {
                warn!(
                    target: PROCESS_TARGET,
                    error = %error,
                    "configuration reload on SIGHUP failed"
                );
            }
            continue;
        }
        info!(target: PROCESS_TARGET, signal, "shutdown signal received");
        return StopReason::Signal(signal);
    }
    StopReason::Requested
}

/// [`ProcessControl`] backed by the signal loop's handle.
#[derive(Debug, Clone)]
pub struct SignalProcessControl {
    handle: Handle,
}

impl ProcessControl for SignalProcessControl {
    fn request_shutdown(&self) -> Result<(), ShutdownRequestError> {
        if self.handle.is_closed() {
            return Err(ShutdownRequestError::new("shutdown already in progress"));
        }
        self.handle.close();
        info!(target: PROCESS_TARGET, "shutdown requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use cortexd_config::Config;

    use super::*;
    use crate::tests::support::{MemorySource, config_with_cpu};

    const CONFIG_PATH: &str = "/etc/cortex/daemon.yaml";

    fn loaded_store() -> (Arc<MemorySource>, ConfigStore) {
        let source = Arc::new(MemorySource::new());
        source.insert(CONFIG_PATH, Config::default());
        let store = ConfigStore::with_source(source.clone());
        store.load(CONFIG_PATH).expect("load");
        (source, store)
    }

    #[test]
    fn hangup_reloads_and_termination_stops() {
        let (source, store) = loaded_store();
        source.insert(CONFIG_PATH, config_with_cpu(20.0, 30.0));

        let reason = serve_signals([SIGHUP, SIGHUP, SIGTERM, SIGHUP], &store);

        assert_eq!(reason, StopReason::Signal(SIGTERM));
        assert_eq!(store.generation(), 3);
        assert_eq!(store.get().monitoring.cpu.warning_threshold, 20.0);
    }

    #[test]
    fn failed_hangup_reload_keeps_serving() {
        let (source, store) = loaded_store();
        source.remove(std::path::Path::new(CONFIG_PATH));

        let reason = serve_signals([SIGHUP, SIGINT], &store);

        assert_eq!(reason, StopReason::Signal(SIGINT));
        assert_eq!(store.get(), Config::default());
    }

    #[test]
    fn exhausted_signals_count_as_requested_stop() {
        let (_, store) = loaded_store();
        assert_eq!(serve_signals([], &store), StopReason::Requested);
    }

    #[test]
    fn shutdown_request_closes_the_loop() {
        let (_, store) = loaded_store();
        let signal_loop = SignalLoop::install().expect("install signals");
        let control = signal_loop.control();
        let store = Arc::new(store);
        let runner = {
            let store = Arc::clone(&store);
            thread::spawn(move || signal_loop.run(&store))
        };

        control.request_shutdown().expect("first request");

        assert_eq!(runner.join().expect("signal thread"), StopReason::Requested);
        assert!(control.request_shutdown().is_err());
    }
}
