// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as plausible bind addresses, positive timeouts, and
//! well-formed operator entries. Collects all errors instead of failing fast.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::HubConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &HubConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.server.host.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{addr}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !config.telegram.api_base.starts_with("http://")
        && !config.telegram.api_base.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "telegram.api_base must be an http(s) URL, got `{}`",
                config.telegram.api_base
            ),
        });
    }

    if config.telegram.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "telegram.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.dispatch.send_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.send_timeout_secs must be at least 1".to_string(),
        });
    }

    let mut seen_tokens = HashSet::new();
    for (i, operator) in config.auth.operators.iter().enumerate() {
        if operator.token.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("auth.operators[{i}].token must not be empty"),
            });
        } else if !seen_tokens.insert(&operator.token) {
            errors.push(ConfigError::Validation {
                message: format!("auth.operators[{i}].token duplicates an earlier operator"),
            });
        }

        if !relayhub_core::id::is_well_formed(&operator.tenant_id) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "auth.operators[{i}].tenant_id must be a 24-hex identifier, got `{}`",
                    operator.tenant_id
                ),
            });
        }

        if operator.roles.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("auth.operators[{i}].roles must not be empty"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperatorConfig;

    fn operator(token: &str, tenant_id: &str) -> OperatorConfig {
        OperatorConfig {
            token: token.to_string(),
            tenant_id: tenant_id.to_string(),
            roles: vec!["operator".to_string()],
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&HubConfig::default()).is_ok());
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut config = HubConfig::default();
        config.server.host = "   ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("server.host")));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let mut config = HubConfig::default();
        config.telegram.request_timeout_secs = 0;
        config.dispatch.send_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn non_http_api_base_is_rejected() {
        let mut config = HubConfig::default();
        config.telegram.api_base = "ftp://api.telegram.org".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn malformed_operator_tenant_is_rejected() {
        let mut config = HubConfig::default();
        config.auth.operators = vec![operator("tok", "not-an-id")];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("tenant_id")));
    }

    #[test]
    fn duplicate_operator_tokens_are_rejected() {
        let mut config = HubConfig::default();
        config.auth.operators = vec![
            operator("same", "0123456789abcdef01234567"),
            operator("same", "fedcba9876543210fedcba98"),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("duplicates")));
    }

    #[test]
    fn well_formed_operators_validate() {
        let mut config = HubConfig::default();
        config.auth.operators = vec![
            operator("tok-a", "0123456789abcdef01234567"),
            operator("tok-b", "fedcba9876543210fedcba98"),
        ];
        assert!(validate_config(&config).is_ok());
    }
}
