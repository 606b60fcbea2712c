//! Collaborator doubles recording how handlers use them.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cortexd_types::{Alert, AlertFilter, AlertSeverity, HealthSnapshot};

use crate::collaborators::{
    AlertError, AlertManager, HealthMonitor, ProcessControl, ShutdownRequestError,
};

/// Builds an unacknowledged alert with a predictable title.
#[must_use]
pub fn sample_alert(id: &str, severity: AlertSeverity) -> Alert {
    Alert {
        id: id.to_owned(),
        severity,
        title: format!("{id} raised"),
        message: format!("{id} crossed its threshold"),
        acknowledged: false,
        raised_at: 1_700_000_000,
    }
}

/// Alert manager keeping alerts in a vector.
#[derive(Default)]
pub struct InMemoryAlerts {
    alerts: Mutex<Vec<Alert>>,
    calls: AtomicUsize,
}

impl InMemoryAlerts {
    #[must_use]
    pub fn with_alerts(alerts: Vec<Alert>) -> Self {
        Self {
            alerts: Mutex::new(alerts),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of trait calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copy of the stored alert with `id`, if any.
    pub fn find(&self, id: &str) -> Option<Alert> {
        self.alerts
            .lock()
            .expect("alerts lock")
            .iter()
            .find(|alert| alert.id == id)
            .cloned()
    }
}

impl AlertManager for InMemoryAlerts {
    fn active_alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.alerts
            .lock()
            .expect("alerts lock")
            .iter()
            .filter(|alert| filter.matches(alert))
            .cloned()
            .collect()
    }

    fn acknowledge(&self, id: &str) -> Result<(), AlertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut alerts = self.alerts.lock().expect("alerts lock");
        let alert = alerts
            .iter_mut()
            .find(|alert| alert.id == id)
            .ok_or_else(|| AlertError::NotFound { id: id.to_owned() })?;
        alert.acknowledged = true;
        Ok(())
    }

    fn dismiss(&self, id: &str) -> Result<(), AlertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut alerts = self.alerts.lock().expect("alerts lock");
        let before = alerts.len();
        alerts.retain(|alert| alert.id != id);
        if alerts.len() == before {
            return Err(AlertError::NotFound { id: id.to_owned() });
        }
        Ok(())
    }
}

/// Monitor returning a fixed snapshot.
#[derive(Default)]
pub struct StaticMonitor {
    snapshot: HealthSnapshot,
    calls: AtomicUsize,
}

impl StaticMonitor {
    #[must_use]
    pub fn new(snapshot: HealthSnapshot) -> Self {
        Self {
            snapshot,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HealthMonitor for StaticMonitor {
    fn health_snapshot(&self) -> HealthSnapshot {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot.clone()
    }
}

/// Process control counting shutdown requests.
#[derive(Default)]
pub struct RecordingProcessControl {
    requests: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingProcessControl {
    /// Process control whose requests always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            requests: AtomicUsize::new(0),
            fail: AtomicBool::new(true),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl ProcessControl for RecordingProcessControl {
    fn request_shutdown(&self) -> Result<(), ShutdownRequestError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ShutdownRequestError::new("signal handle already closed"));
        }
        Ok(())
    }
}
