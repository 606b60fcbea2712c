//! In-memory configuration source for store scenarios.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use cortexd_config::{Config, ConfigError, ConfigSource, Thresholds};

type ReadHook = Box<dyn FnOnce() + Send>;

/// Source serving configurations keyed by path from memory.
///
/// Unknown paths fail with a read error. A one-shot hook can be armed to run
/// at the start of the next read, which lets tests interleave store
/// operations with an in-flight load.
#[derive(Default)]
pub struct MemorySource {
    entries: Mutex<HashMap<PathBuf, Config>>,
    hook: Mutex<Option<ReadHook>>,
    reads: AtomicUsize,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `config` for `path`, replacing any previous entry.
    pub fn insert(&self, path: impl Into<PathBuf>, config: Config) {
        self.entries
            .lock()
            .expect("entries lock")
            .insert(path.into(), config);
    }

    /// Stops serving `path`; later reads fail with a read error.
    pub fn remove(&self, path: &Path) {
        self.entries.lock().expect("entries lock").remove(path);
    }

    /// Runs `hook` once, at the start of the next read.
    pub fn before_next_read(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock().expect("hook lock") = Some(Box::new(hook));
    }

    /// Number of reads served so far, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ConfigSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Config, ConfigError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let hook = self.hook.lock().expect("hook lock").take();
        if let Some(hook) = hook {
            hook();
        }
        self.entries
            .lock()
            .expect("entries lock")
            .get(path)
            .cloned()
            .ok_or_else(|| ConfigError::Read {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such entry"),
            })
    }
}

/// Default configuration with the given CPU thresholds.
#[must_use]
pub fn config_with_cpu(warning: f64, critical: f64) -> Config {
    let mut config = Config::default();
    config.monitoring.cpu = Thresholds::new(warning, critical);
    config
}
