//! Live configuration store shared by the transport and request handlers.
//!
//! The store owns the current validated [`Config`] snapshot, the path it was
//! last loaded from, and the subscribers notified whenever a new snapshot is
//! adopted. Snapshots are immutable and swapped wholesale, so a reader always
//! sees either the previous or the next configuration, never a mix of both.
//!
//! Two locks cooperate:
//!
//! - the **state lock** guards the snapshot pointer, remembered path and
//!   subscriber list. It is held only for pointer swaps and list copies and
//!   never across I/O or callbacks, so [`ConfigStore::get`] never waits on
//!   the filesystem;
//! - the **mutation gate** serializes [`ConfigStore::load`] and
//!   [`ConfigStore::reload`] end to end, including subscriber notification,
//!   so subscribers observe snapshots in the order they were adopted. The
//!   gate is re-entrant, which lets a subscriber running on the notifying
//!   thread call back into the store.
//!
//! Every mutation follows the same shape: read and validate outside the state
//! lock, swap under it while collecting the subscribers to notify, release it,
//! then run the notifications.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use cortexd_config::{Config, ConfigError, ConfigSource, YamlFileSource};

/// Tracing target for configuration store events.
pub(crate) const CONFIG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::config");

/// Error returned by a subscriber callback.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

type Callback = dyn Fn(&Config) -> Result<(), SubscriberError> + Send + Sync;

/// Identifier returned by [`ConfigStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Errors reported by [`ConfigStore::load`] and [`ConfigStore::reload`].
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// Reload was requested before any configuration file was loaded.
    #[error("no configuration file has been loaded; nothing to reload")]
    NoSourcePath,
    /// The source could not be read, parsed, or validated.
    #[error(transparent)]
    Source(#[from] ConfigError),
    /// The remembered path changed while a reload was reading the old one.
    #[error(
        "configuration path changed during reload (expected '{}', now {}); retry the reload",
        .expected.display(),
        describe_path(.current.as_deref())
    )]
    PathChanged {
        expected: PathBuf,
        current: Option<PathBuf>,
    },
}

fn describe_path(path: Option<&Path>) -> String {
    path.map_or_else(
        || "unset".to_owned(),
        |path| format!("'{}'", path.display()),
    )
}

/// Process-wide owner of the live configuration snapshot.
pub struct ConfigStore {
    source: Arc<dyn ConfigSource>,
    state: Mutex<StoreState>,
    mutation: ReentrantMutex<()>,
}

struct StoreState {
    current: Arc<Config>,
    path: Option<PathBuf>,
    generation: u64,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    callback: Arc<Callback>,
}

/// Subscribers to notify about one adopted snapshot, collected under the
/// state lock and delivered after it is released.
struct Notification {
    config: Arc<Config>,
    generation: u64,
    subscribers: Vec<Subscriber>,
}

impl StoreState {
    fn adopt(&mut self, config: Arc<Config>, path: Option<PathBuf>) -> Notification {
        self.current = Arc::clone(&config);
        if let Some(path) = path {
            self.path = Some(path);
        }
        self.generation += 1;
        Notification {
            config,
            generation: self.generation,
            subscribers: self.subscribers.clone(),
        }
    }
}

impl Notification {
    fn deliver(self) {
        for subscriber in &self.subscribers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                (subscriber.callback)(&self.config)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => error!(
                    target: CONFIG_TARGET,
                    subscription = subscriber.id.0,
                    generation = self.generation,
                    error = %error,
                    "configuration subscriber failed"
                ),
                Err(payload) => error!(
                    target: CONFIG_TARGET,
                    subscription = subscriber.id.0,
                    generation = self.generation,
                    panic = panic_message(payload.as_ref()),
                    "configuration subscriber panicked"
                ),
            }
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl ConfigStore {
    /// Creates a store holding the default configuration and reading YAML
    /// files on load.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(Arc::new(YamlFileSource))
    }

    /// Creates a store holding the default configuration and reading through
    /// `source` on load.
    #[must_use]
    pub fn with_source(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            state: Mutex::new(StoreState {
                current: Arc::new(Config::default()),
                path: None,
                generation: 0,
                subscribers: Vec::new(),
                next_subscription: 0,
            }),
            mutation: ReentrantMutex::new(()),
        }
    }

    /// Reads, validates and adopts the configuration at `path`.
    ///
    /// On failure the current snapshot and remembered path are left exactly
    /// as they were and the cause is logged and returned. On success the new
    /// snapshot is adopted, `path` becomes the reload path, and subscribers
    /// are notified with the new snapshot after the state lock is released.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Config>, ConfigStoreError> {
        let path = path.as_ref();
        let _gate = self.mutation.lock();

        let config = match Config::load_from(self.source.as_ref(), path) {
            Ok(config) => Arc::new(config),
            Err(error) => {
                warn!(
                    target: CONFIG_TARGET,
                    path = %path.display(),
                    error = %error,
                    "configuration load failed; keeping current configuration"
                );
                return Err(error.into());
            }
        };

        let notification = self
            .state
            .lock()
            .adopt(Arc::clone(&config), Some(path.to_path_buf()));
        info!(
            target: CONFIG_TARGET,
            path = %path.display(),
            generation = notification.generation,
            "configuration loaded"
        );
        notification.deliver();
        Ok(config)
    }

    /// Re-reads the remembered configuration path and adopts the result.
    ///
    /// The path is captured before reading and re-checked before adopting;
    /// if it changed in between, the reload is abandoned with
    /// [`ConfigStoreError::PathChanged`] and the configuration is untouched.
    pub fn reload(&self) -> Result<Arc<Config>, ConfigStoreError> {
        let _gate = self.mutation.lock();

        let Some(path) = self.state.lock().path.clone() else {
            warn!(
                target: CONFIG_TARGET,
                "no configuration path set; cannot reload"
            );
            return Err(ConfigStoreError::NoSourcePath);
        };

        let config = match Config::load_from(self.source.as_ref(), &path) {
            Ok(config) => Arc::new(config),
            Err(error) => {
                error!(
                    target: CONFIG_TARGET,
                    path = %path.display(),
                    error = %error,
                    "configuration reload failed; keeping current configuration"
                );
                return Err(error.into());
            }
        };

        let notification = {
            let mut state = self.state.lock();
            if state.path.as_deref() != Some(path.as_path()) {
                let current = state.path.clone();
                drop(state);
                warn!(
                    target: CONFIG_TARGET,
                    expected = %path.display(),
                    current = describe_path(current.as_deref()),
                    "configuration path changed during reload; aborting"
                );
                return Err(ConfigStoreError::PathChanged {
                    expected: path,
                    current,
                });
            }
            state.adopt(Arc::clone(&config), None)
        };
        info!(
            target: CONFIG_TARGET,
            path = %path.display(),
            generation = notification.generation,
            "configuration reloaded"
        );
        notification.deliver();
        Ok(config)
    }

    /// Returns an independent copy of the current snapshot.
    #[must_use]
    pub fn get(&self) -> Config {
        Config::clone(&self.snapshot())
    }

    /// Returns a shared handle to the current snapshot without copying it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Config> {
        Arc::clone(&self.state.lock().current)
    }

    /// Path of the last successful load, if any.
    #[must_use]
    pub fn source_path(&self) -> Option<PathBuf> {
        self.state.lock().path.clone()
    }

    /// Number of snapshots adopted since the store was created.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Registers `callback` for every snapshot adopted from now on.
    ///
    /// Callbacks run in registration order on the thread that adopted the
    /// snapshot, outside the state lock. A callback that returns an error or
    /// panics is logged and skipped; the remaining callbacks still run.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Config) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.subscribers.push(Subscriber {
            id,
            callback: Arc::new(callback),
        });
        debug!(
            target: CONFIG_TARGET,
            subscription = id.0,
            "configuration subscriber registered"
        );
        id
    }

    /// Removes a subscriber. Returns `false` when `id` was not registered.
    ///
    /// A notification already in flight may still reach the subscriber.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|subscriber| subscriber.id != id);
        state.subscribers.len() != before
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        formatter
            .debug_struct("ConfigStore")
            .field("path", &state.path)
            .field("generation", &state.generation)
            .field("subscribers", &state.subscribers.len())
            .finish_non_exhaustive()
    }
}
