//! Validation rules applied to every configuration candidate.
//!
//! The same rules run for the initial load and for every reload. The first
//! violated rule is reported and the whole candidate is rejected.

use std::fmt;

use thiserror::Error;

use crate::{Config, LogLevel, Thresholds};

/// Monitored system resources carrying threshold pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Processor utilisation.
    Cpu,
    /// Memory utilisation.
    Memory,
    /// Disk utilisation.
    Disk,
}

impl Resource {
    /// All resources in reporting order.
    pub const ALL: [Self; 3] = [Self::Cpu, Self::Memory, Self::Disk];
}

impl fmt::Display for Resource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Disk => "disk",
        };
        formatter.write_str(label)
    }
}

/// Reasons a configuration candidate is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The socket path is empty.
    #[error("socket.path must not be empty")]
    EmptySocketPath,
    /// A count or duration that must be positive is zero.
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
    /// The log level lies outside 0..=4.
    #[error("log_level must be between 0 and {max}, got {level}", max = LogLevel::MAX)]
    LogLevelOutOfRange { level: u8 },
    /// A threshold lies outside the 0..=100 percentage range.
    #[error(
        "{resource} thresholds must be between 0 and 100 (warning {warning}, critical {critical})"
    )]
    ThresholdOutOfRange {
        resource: Resource,
        warning: f64,
        critical: f64,
    },
    /// A warning threshold is not below its critical threshold.
    #[error(
        "{resource} warning threshold ({warning}) must be less than critical threshold ({critical})"
    )]
    ThresholdOrder {
        resource: Resource,
        warning: f64,
        critical: f64,
    },
}

pub(crate) fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.socket.path.as_str().trim().is_empty() {
        return Err(ValidationError::EmptySocketPath);
    }
    require_positive("socket.backlog", u64::from(config.socket.backlog))?;
    require_positive("socket.timeout_ms", config.socket.timeout_ms)?;
    require_positive(
        "rate_limit.max_requests_per_sec",
        u64::from(config.rate_limit.max_requests_per_sec),
    )?;
    if config.log_level > LogLevel::MAX {
        return Err(ValidationError::LogLevelOutOfRange {
            level: config.log_level,
        });
    }
    for resource in Resource::ALL {
        validate_thresholds(resource, config.monitoring.thresholds(resource))?;
    }
    require_positive(
        "monitoring.check_interval_seconds",
        config.monitoring.check_interval_seconds,
    )
}

fn require_positive(field: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}

fn validate_thresholds(resource: Resource, thresholds: &Thresholds) -> Result<(), ValidationError> {
    let Thresholds {
        warning_threshold: warning,
        critical_threshold: critical,
    } = *thresholds;
    // NaN fails the range check as well.
    if !is_percentage(warning) || !is_percentage(critical) {
        return Err(ValidationError::ThresholdOutOfRange {
            resource,
            warning,
            critical,
        });
    }
    if warning >= critical {
        return Err(ValidationError::ThresholdOrder {
            resource,
            warning,
            critical,
        });
    }
    Ok(())
}

fn is_percentage(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[rstest]
    #[case::backlog(|config: &mut Config| config.socket.backlog = 0, "socket.backlog")]
    #[case::timeout(|config: &mut Config| config.socket.timeout_ms = 0, "socket.timeout_ms")]
    #[case::rate(
        |config: &mut Config| config.rate_limit.max_requests_per_sec = 0,
        "rate_limit.max_requests_per_sec"
    )]
    #[case::interval(
        |config: &mut Config| config.monitoring.check_interval_seconds = 0,
        "monitoring.check_interval_seconds"
    )]
    fn zero_counts_are_rejected(#[case] mutate: fn(&mut Config), #[case] field: &str) {
        let mut config = Config::default();
        mutate(&mut config);
        let error = config.validate().expect_err("zero must be rejected");
        assert_eq!(error.to_string(), format!("{field} must be positive"));
    }

    #[rstest]
    #[case(0, true)]
    #[case(4, true)]
    #[case(5, false)]
    #[case(255, false)]
    fn log_level_bounds(#[case] level: u8, #[case] valid: bool) {
        let config = Config {
            log_level: level,
            ..Config::default()
        };
        assert_eq!(config.validate().is_ok(), valid);
    }

    #[rstest]
    #[case(Resource::Cpu)]
    #[case(Resource::Memory)]
    #[case(Resource::Disk)]
    fn warning_must_be_below_critical(#[case] resource: Resource) {
        let mut config = Config::default();
        let thresholds = match resource {
            Resource::Cpu => &mut config.monitoring.cpu,
            Resource::Memory => &mut config.monitoring.memory,
            Resource::Disk => &mut config.monitoring.disk,
        };
        *thresholds = Thresholds::new(95.0, 90.0);

        let error = config.validate().expect_err("inverted pair must fail");
        assert!(matches!(
            error,
            ValidationError::ThresholdOrder { resource: failed, .. } if failed == resource
        ));
    }

    #[test]
    fn equal_thresholds_are_rejected() {
        let mut config = Config::default();
        config.monitoring.disk = Thresholds::new(90.0, 90.0);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ThresholdOrder {
                resource: Resource::Disk,
                ..
            })
        ));
    }

    #[rstest]
    #[case(-1.0, 90.0)]
    #[case(70.0, 100.5)]
    #[case(f64::NAN, 90.0)]
    fn thresholds_outside_percentage_range_are_rejected(
        #[case] warning: f64,
        #[case] critical: f64,
    ) {
        let mut config = Config::default();
        config.monitoring.memory = Thresholds::new(warning, critical);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ThresholdOutOfRange {
                resource: Resource::Memory,
                ..
            })
        ));
    }

    #[test]
    fn boundary_percentages_are_accepted() {
        let mut config = Config::default();
        config.monitoring.cpu = Thresholds::new(0.0, 100.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn empty_socket_path_is_rejected() {
        let mut config = Config::default();
        config.socket.path = Utf8PathBuf::from("  ");
        assert_eq!(config.validate(), Err(ValidationError::EmptySocketPath));
    }

    mod properties {
        use proptest::prelude::*;

        use crate::validation::{Resource, ValidationError};
        use crate::{Config, Thresholds};

        proptest! {
            #[test]
            fn ordered_percentages_are_accepted(
                warning in 0.0..100.0_f64,
                gap in 0.001..100.0_f64,
            ) {
                let critical = (warning + gap).min(100.0);
                prop_assume!(warning < critical);
                let mut config = Config::default();
                config.monitoring.cpu = Thresholds::new(warning, critical);
                prop_assert_eq!(config.validate(), Ok(()));
            }

            #[test]
            fn warning_at_or_above_critical_is_rejected(
                critical in 0.0..=100.0_f64,
                excess in 0.0..=100.0_f64,
            ) {
                let warning = (critical + excess).min(100.0);
                let mut config = Config::default();
                config.monitoring.disk = Thresholds::new(warning, critical);
                let rejected = matches!(
                    config.validate(),
                    Err(ValidationError::ThresholdOrder { resource: Resource::Disk, .. })
                );
                prop_assert!(rejected);
            }
        }
    }
}
