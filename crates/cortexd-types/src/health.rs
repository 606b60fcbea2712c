use serde::{Deserialize, Serialize};

/// Overall health classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Every resource is below its warning threshold.
    #[default]
    Healthy,
    /// At least one resource crossed its warning threshold.
    Warning,
    /// At least one resource crossed its critical threshold.
    Critical,
}

/// Utilisation percentages sampled by the monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ResourceUsage {
    /// Processor utilisation percentage.
    pub cpu_percent: f64,
    /// Memory utilisation percentage.
    pub memory_percent: f64,
    /// Disk utilisation percentage.
    pub disk_percent: f64,
}

/// Point-in-time health report produced by the system monitor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HealthSnapshot {
    /// Overall classification.
    pub status: HealthStatus,
    /// Most recent utilisation sample.
    pub usage: ResourceUsage,
    /// Seconds since the monitor started.
    pub uptime_seconds: u64,
    /// Number of alerts not yet acknowledged or dismissed.
    pub active_alerts: usize,
}
