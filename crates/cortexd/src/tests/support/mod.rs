//! Test doubles shared by the unit and behavioural suites.

mod collaborators;
mod sources;

pub use collaborators::{InMemoryAlerts, RecordingProcessControl, StaticMonitor, sample_alert};
pub use sources::{MemorySource, config_with_cpu};
