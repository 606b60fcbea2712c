use serde::{Deserialize, Serialize};

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Informational notice.
    Info,
    /// A warning threshold was crossed.
    Warning,
    /// A critical threshold was crossed.
    Critical,
}

/// Alert raised by the monitor and held by the alert manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Alert {
    /// Stable identifier used by acknowledge and dismiss.
    pub id: String,
    /// Severity of the condition.
    pub severity: AlertSeverity,
    /// Short summary.
    pub title: String,
    /// Detailed description.
    pub message: String,
    /// Whether an operator acknowledged the alert.
    pub acknowledged: bool,
    /// Unix timestamp (seconds) at which the alert was raised.
    pub raised_at: u64,
}

/// Optional filter accepted by `alerts.get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertFilter {
    /// Only return alerts of this severity.
    pub severity: Option<AlertSeverity>,
    /// Include alerts that were already acknowledged.
    pub include_acknowledged: bool,
}

impl Default for AlertFilter {
    fn default() -> Self {
        Self {
            severity: None,
            include_acknowledged: true,
        }
    }
}

impl AlertFilter {
    /// Returns `true` when `alert` passes the filter.
    #[must_use]
    pub fn matches(&self, alert: &Alert) -> bool {
        let severity_matches = self
            .severity
            .is_none_or(|severity| severity == alert.severity);
        severity_matches && (self.include_acknowledged || !alert.acknowledged)
    }
}

/// Parameters naming a single alert.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AlertTarget {
    /// Identifier of the targeted alert.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(severity: AlertSeverity, acknowledged: bool) -> Alert {
        Alert {
            id: "cpu-1".to_owned(),
            severity,
            title: "CPU high".to_owned(),
            message: "CPU above warning threshold".to_owned(),
            acknowledged,
            raised_at: 0,
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = AlertFilter::default();
        assert!(filter.matches(&alert(AlertSeverity::Info, true)));
        assert!(filter.matches(&alert(AlertSeverity::Critical, false)));
    }

    #[test]
    fn filter_by_severity_and_acknowledgement() {
        let filter = AlertFilter {
            severity: Some(AlertSeverity::Warning),
            include_acknowledged: false,
        };
        assert!(filter.matches(&alert(AlertSeverity::Warning, false)));
        assert!(!filter.matches(&alert(AlertSeverity::Warning, true)));
        assert!(!filter.matches(&alert(AlertSeverity::Critical, false)));
    }

    #[test]
    fn filter_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<AlertFilter>(r#"{"severty":"warning"}"#);
        assert!(parsed.is_err());
    }
}
