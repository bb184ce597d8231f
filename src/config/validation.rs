use crate::config::types::{Config, ListingConfig, OutputConfig, RenderConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_listing_config(&config.listing)?;
    validate_render_config(&config.render)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the listing base URL
fn validate_listing_config(config: &ListingConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates page loading configuration
fn validate_render_config(config: &RenderConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("load_timeout_ms", config.load_timeout_ms),
        ("connect_timeout_ms", config.connect_timeout_ms),
        ("wait_timeout_ms", config.wait_timeout_ms),
        ("poll_interval_ms", config.poll_interval_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{} must be greater than 0",
                name
            )));
        }
    }

    if config.poll_interval_ms > config.wait_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms ({}) cannot exceed wait_timeout_ms ({})",
            config.poll_interval_ms, config.wait_timeout_ms
        )));
    }

    if config.max_redirects < 1 || config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be between 1 and 20, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
