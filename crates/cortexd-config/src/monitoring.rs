//! Resource thresholds consumed by the system monitor.

use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_CHECK_INTERVAL_SECONDS;
use crate::validation::Resource;

/// Monitoring thresholds for each sampled resource.
///
/// Threshold keys may be omitted individually in a configuration document;
/// each missing key keeps the compiled-in default for its resource.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "MonitoringDocument")]
pub struct MonitoringSettings {
    /// CPU utilisation thresholds.
    pub cpu: Thresholds,
    /// Memory utilisation thresholds.
    pub memory: Thresholds,
    /// Disk utilisation thresholds.
    pub disk: Thresholds,
    /// Seconds between sampling passes.
    pub check_interval_seconds: u64,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            cpu: Thresholds::new(70.0, 90.0),
            memory: Thresholds::new(80.0, 95.0),
            disk: Thresholds::new(80.0, 95.0),
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECONDS,
        }
    }
}

impl MonitoringSettings {
    /// Returns the thresholds configured for `resource`.
    #[must_use]
    pub fn thresholds(&self, resource: Resource) -> &Thresholds {
        match resource {
            Resource::Cpu => &self.cpu,
            Resource::Memory => &self.memory,
            Resource::Disk => &self.disk,
        }
    }
}

/// Warning and critical utilisation percentages for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Thresholds {
    /// Utilisation at which a warning alert is raised.
    pub warning_threshold: f64,
    /// Utilisation at which a critical alert is raised.
    pub critical_threshold: f64,
}

impl Thresholds {
    /// Builds a threshold pair.
    #[must_use]
    pub const fn new(warning_threshold: f64, critical_threshold: f64) -> Self {
        Self {
            warning_threshold,
            critical_threshold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MonitoringDocument {
    cpu: ThresholdsDocument,
    memory: ThresholdsDocument,
    disk: ThresholdsDocument,
    check_interval_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThresholdsDocument {
    warning_threshold: Option<f64>,
    critical_threshold: Option<f64>,
}

impl ThresholdsDocument {
    fn or(self, fallback: Thresholds) -> Thresholds {
        Thresholds {
            warning_threshold: self.warning_threshold.unwrap_or(fallback.warning_threshold),
            critical_threshold: self
                .critical_threshold
                .unwrap_or(fallback.critical_threshold),
        }
    }
}

impl From<MonitoringDocument> for MonitoringSettings {
    fn from(document: MonitoringDocument) -> Self {
        let defaults = Self::default();
        Self {
            cpu: document.cpu.or(defaults.cpu),
            memory: document.memory.or(defaults.memory),
            disk: document.disk.or(defaults.disk),
            check_interval_seconds: document
                .check_interval_seconds
                .unwrap_or(defaults.check_interval_seconds),
        }
    }
}
