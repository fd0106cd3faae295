//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{ChannelMode, Config, PayloadEncoding};

/// Recommended enrichment budget, in milliseconds.
const ENRICHMENT_TIMEOUT_RANGE: (u64, u64) = (1_500, 2_500);

/// Recommended global budget, in milliseconds.
const GLOBAL_TIMEOUT_RANGE: (u64, u64) = (5_000, 10_000);

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) if err.missing => Err(ConfigError::MissingField(err.path)),
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    /// The setting is absent rather than wrong.
    pub missing: bool,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            missing: false,
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            message: format!("{} must be set", path),
            path,
            missing: true,
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_endpoint(config, &mut result);
        Self::validate_timeouts(config, &mut result);
        Self::validate_channel(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_endpoint(config: &Config, result: &mut ValidationResult) {
        let endpoint = config.submission.endpoint.trim();
        if endpoint.is_empty() {
            result.add_error(ValidationError::missing("submission.endpoint"));
        } else if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "submission.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if config.submission.success_url.trim().is_empty() {
            result.add_error(ValidationError::new(
                "submission.success_url",
                "success_url cannot be empty",
            ));
        }

        if config.submission.enable_enrichment {
            let url = &config.enrichment.provider_url;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "enrichment.provider_url",
                    "provider_url must start with http:// or https://",
                ));
            }
        }
    }

    fn validate_timeouts(config: &Config, result: &mut ValidationResult) {
        let submission = &config.submission;

        if submission.global_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "submission.global_timeout_ms",
                "global_timeout_ms must be greater than 0",
            ));
        } else if submission.global_timeout_ms < GLOBAL_TIMEOUT_RANGE.0
            || submission.global_timeout_ms > GLOBAL_TIMEOUT_RANGE.1
        {
            result.add_warning(ValidationWarning::new(
                "submission.global_timeout_ms",
                format!(
                    "global_timeout_ms {} is outside the recommended {}-{} ms",
                    submission.global_timeout_ms, GLOBAL_TIMEOUT_RANGE.0, GLOBAL_TIMEOUT_RANGE.1
                ),
            ));
        }

        if submission.enrichment_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "submission.enrichment_timeout_ms",
                "enrichment_timeout_ms must be greater than 0",
            ));
        } else if submission.enrichment_timeout_ms >= submission.global_timeout_ms {
            result.add_error(ValidationError::new(
                "submission.enrichment_timeout_ms",
                "enrichment_timeout_ms must be smaller than global_timeout_ms",
            ));
        } else if submission.enable_enrichment
            && (submission.enrichment_timeout_ms < ENRICHMENT_TIMEOUT_RANGE.0
                || submission.enrichment_timeout_ms > ENRICHMENT_TIMEOUT_RANGE.1)
        {
            result.add_warning(ValidationWarning::new(
                "submission.enrichment_timeout_ms",
                format!(
                    "enrichment_timeout_ms {} is outside the recommended {}-{} ms",
                    submission.enrichment_timeout_ms,
                    ENRICHMENT_TIMEOUT_RANGE.0,
                    ENRICHMENT_TIMEOUT_RANGE.1
                ),
            ));
        }

        if submission.channel_mode == ChannelMode::BestEffort
            && submission.best_effort_delay_ms >= submission.global_timeout_ms
        {
            result.add_error(ValidationError::new(
                "submission.best_effort_delay_ms",
                "best_effort_delay_ms must be smaller than global_timeout_ms",
            ));
        }
    }

    fn validate_channel(config: &Config, result: &mut ValidationResult) {
        let encoding = config
            .channel
            .effective_encoding(config.submission.channel_mode);

        if config.channel.form_name.is_some() && encoding != PayloadEncoding::FormUrlencoded {
            result.add_warning(ValidationWarning::new(
                "channel.form_name",
                "form_name is only sent with the form_urlencoded encoding",
            ));
        }

        if config.channel.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "channel.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        } else if config.channel.timeout_seconds.saturating_mul(1_000)
            < config.submission.global_timeout_ms
        {
            result.add_warning(ValidationWarning::new(
                "channel.timeout_seconds",
                "requests are cut off before the global timeout elapses",
            ));
        }

        for name in config.channel.headers.keys() {
            if name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "channel.headers",
                    "header names cannot be empty",
                ));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
