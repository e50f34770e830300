use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, RenderConfig, UserAgentConfig, MAX_DELAY_SECONDS,
};
use crate::render::consent::accept_texts;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_render_config(&config.render)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !(0.0..=MAX_DELAY_SECONDS).contains(&config.delay_seconds) {
        return Err(ConfigError::Validation(format!(
            "delay_seconds must be between 0 and {}, got {}",
            MAX_DELAY_SECONDS, config.delay_seconds
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.document_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "document_timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.concurrent_downloads < 1 || config.concurrent_downloads > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrent_downloads must be between 1 and 32, got {}",
            config.concurrent_downloads
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be at least 1 when set".to_string(),
        ));
    }

    for ext in &config.document_extensions {
        validate_extension(ext)?;
    }

    Ok(())
}

/// Validates a document extension entry (e.g. "pdf", not ".pdf")
fn validate_extension(ext: &str) -> Result<(), ConfigError> {
    if ext.is_empty() {
        return Err(ConfigError::Validation(
            "document extension cannot be empty".to_string(),
        ));
    }

    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "document extension must be alphanumeric without a leading dot, got '{}'",
            ext
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // The name doubles as the robots.txt product token
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates render configuration
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.max_page_bytes == 0 {
        return Err(ConfigError::Validation(
            "max_page_bytes must be greater than 0".to_string(),
        ));
    }

    if config.dismiss_cookie_banner && accept_texts(&config.consent_patterns).is_empty() {
        return Err(ConfigError::Validation(
            "consent_patterns must contain at least one non-empty pattern when dismiss_cookie_banner is enabled"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.site_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "site_root cannot be empty".to_string(),
        ));
    }

    if config.artifact_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "artifact_root cannot be empty".to_string(),
        ));
    }

    Ok(())
}
