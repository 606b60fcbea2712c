/// Default location of the daemon configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cortex/daemon.yaml";

/// Default Unix socket the daemon listens on.
pub const DEFAULT_SOCKET_PATH: &str = "/run/cortex/cortex.sock";

/// Default listen backlog for the daemon socket.
pub const DEFAULT_SOCKET_BACKLOG: u32 = 16;

/// Default per-connection read and write timeout in milliseconds.
pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 5_000;

/// Default number of requests admitted per second.
pub const DEFAULT_MAX_REQUESTS_PER_SEC: u32 = 100;

/// Default log verbosity (info).
pub const DEFAULT_LOG_LEVEL: u8 = 1;

/// Default number of seconds between monitor sampling passes.
pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 60;
