//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::is_valid_email;
use super::{DatabaseDriver, Settings};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;

    if settings.mail.reset_url_base.is_empty() {
        return Err(EventHubError::Config(
            "Password reset URL base is required".to_string()
        ));
    }

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventHubError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.client_url.is_empty() {
        return Err(EventHubError::Config(
            "Client URL is required for CORS".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.driver == DatabaseDriver::Reference {
        return Ok(());
    }

    if config.url.is_empty() {
        return Err(EventHubError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EventHubError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventHubError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate token and credential configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < 16 {
        return Err(EventHubError::Config(
            "JWT secret must be at least 16 characters".to_string()
        ));
    }

    if config.user_token_ttl_secs == 0 || config.admin_token_ttl_secs == 0 || config.reset_token_ttl_secs == 0 {
        return Err(EventHubError::Config(
            "Token lifetimes must be greater than 0".to_string()
        ));
    }

    if !(4..=31).contains(&config.bcrypt_cost) {
        return Err(EventHubError::Config(
            format!("Invalid bcrypt cost: {}. Must be between 4 and 31", config.bcrypt_cost)
        ));
    }

    if let Some(ref admin) = config.bootstrap_admin {
        if !is_valid_email(&admin.email) {
            return Err(EventHubError::Config(
                "Bootstrap admin email is invalid".to_string()
            ));
        }
        if admin.password.len() < 8 {
            return Err(EventHubError::Config(
                "Bootstrap admin password must be at least 8 characters".to_string()
            ));
        }
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventHubError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventHubError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
