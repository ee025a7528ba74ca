//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and clap handle syntactic)
//! - Validate value ranges (min <= max for sizes and delays)
//! - Reject header entries that cannot become HTTP headers
//! - Keep the three status code families disjoint and non-empty
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BehaviorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::BehaviorConfig;
use crate::generators::codes::{CodeFamily, CodeSet, CodeSetError};
use crate::http::headers::{parse_entry, HeaderError};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("min_body_size ({min}) exceeds max_body_size ({max})")]
    BodySizeRange { min: u64, max: u64 },

    #[error("min_delay ({min:?}) exceeds max_delay ({max:?})")]
    DelayRange { min: Duration, max: Duration },

    #[error("header #{index}: {source}")]
    Header {
        index: usize,
        #[source]
        source: HeaderError,
    },

    #[error("{family} codes: {source}")]
    Codes {
        family: CodeFamily,
        #[source]
        source: CodeSetError,
    },

    #[error("jitter_port {0} is already used by the manual-kill listener")]
    PortCollision(u16),

    #[error("metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check a merged configuration, collecting every problem found.
pub fn validate_config(config: &BehaviorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if config.min_body_size > config.max_body_size {
        errors.push(ValidationError::BodySizeRange {
            min: config.min_body_size,
            max: config.max_body_size,
        });
    }

    if config.min_delay > config.max_delay {
        errors.push(ValidationError::DelayRange {
            min: config.min_delay,
            max: config.max_delay,
        });
    }

    for (index, entry) in config.headers.iter().enumerate() {
        if let Err(source) = parse_entry(entry) {
            errors.push(ValidationError::Header { index, source });
        }
    }

    for family in CodeFamily::ALL {
        if let Err(source) = CodeSet::new(family, config.codes.codes(family)) {
            errors.push(ValidationError::Codes { family, source });
        }
    }

    if config.jitter_enabled()
        && config.port != 0
        && config.port == config.jitter_port
    {
        errors.push(ValidationError::PortCollision(config.jitter_port));
    }

    if let Some(address) = &config.metrics_address {
        if address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::MetricsAddress(address.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&BehaviorConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = BehaviorConfig {
            host: " ".into(),
            min_body_size: 10,
            max_body_size: 5,
            min_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(1),
            headers: vec!["Age:1".into(), "no-separator".into()],
            jitter_interval: Duration::from_secs(1),
            port: 9000,
            jitter_port: 9000,
            metrics_address: Some("nowhere".into()),
            ..BehaviorConfig::default()
        };
        config.codes.server_error = vec![500, 404];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::EmptyHost));
        assert!(errors.contains(&ValidationError::BodySizeRange { min: 10, max: 5 }));
        assert!(errors.contains(&ValidationError::PortCollision(9000)));
        assert!(errors.contains(&ValidationError::Header {
            index: 1,
            source: HeaderError::MissingSeparator("no-separator".into()),
        }));
        assert!(errors.contains(&ValidationError::Codes {
            family: CodeFamily::ServerError,
            source: CodeSetError::OutOfFamily { code: 404, family: CodeFamily::ServerError },
        }));
    }

    #[test]
    fn shared_port_is_fine_when_jitter_is_disabled() {
        let config = BehaviorConfig {
            port: 9000,
            jitter_port: 9000,
            ..BehaviorConfig::default()
        };
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let config = BehaviorConfig {
            min_body_size: 64,
            max_body_size: 64,
            min_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(5),
            ..BehaviorConfig::default()
        };
        assert_eq!(validate_config(&config), Ok(()));
    }
}
