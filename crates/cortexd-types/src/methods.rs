//! Method names understood by the daemon.

/// Liveness probe.
pub const PING: &str = "ping";
/// Build and version identifiers.
pub const VERSION: &str = "version";
/// Current configuration snapshot.
pub const CONFIG_GET: &str = "config.get";
/// Re-read the configuration source.
pub const CONFIG_RELOAD: &str = "config.reload";
/// Begin daemon shutdown.
pub const SHUTDOWN: &str = "shutdown";
/// Current health snapshot from the system monitor.
pub const HEALTH: &str = "health";
/// Active alerts, optionally filtered.
pub const ALERTS_GET: &str = "alerts.get";
/// Acknowledge an alert by id.
pub const ALERTS_ACKNOWLEDGE: &str = "alerts.acknowledge";
/// Dismiss an alert by id.
pub const ALERTS_DISMISS: &str = "alerts.dismiss";

/// Every method the daemon registers at startup.
pub const ALL: [&str; 9] = [
    PING,
    VERSION,
    CONFIG_GET,
    CONFIG_RELOAD,
    SHUTDOWN,
    HEALTH,
    ALERTS_GET,
    ALERTS_ACKNOWLEDGE,
    ALERTS_DISMISS,
];
