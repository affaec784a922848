//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

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
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
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

        Self::validate_server(config, &mut result);
        Self::validate_monitor(config, &mut result);
        Self::validate_timeouts(config, &mut result);
        Self::validate_endpoints(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_monitor(config: &Config, result: &mut ValidationResult) {
        if config.monitor.interval_secs == 0 {
            result.add_error(ValidationError::new(
                "monitor.interval_secs",
                "interval_secs must be greater than 0",
            ));
        } else if config.monitor.interval_secs < 10 {
            result.add_warning(ValidationWarning::new(
                "monitor.interval_secs",
                "interval is very short (<10s), cycles may overlap the dial timeout",
            ));
        }

        if config.monitor.workers > 256 {
            result.add_warning(ValidationWarning::new(
                "monitor.workers",
                "more than 256 workers per pool",
            ));
        }
    }

    fn validate_timeouts(config: &Config, result: &mut ValidationResult) {
        let timeouts = [
            ("prober.dial_timeout_secs", config.prober.dial_timeout_secs),
            ("prober.status_ttl_secs", config.prober.status_ttl_secs),
            ("notify.http_timeout_secs", config.notify.http_timeout_secs),
            ("chains.http_timeout_secs", config.chains.http_timeout_secs),
            ("control_plane.timeout_secs", config.control_plane.timeout_secs),
        ];

        for (path, value) in timeouts {
            if value == 0 {
                result.add_error(ValidationError::new(path, "must be greater than 0"));
            }
        }
    }

    fn validate_endpoints(config: &Config, result: &mut ValidationResult) {
        if config.notify.username.trim().is_empty() {
            result.add_error(ValidationError::new(
                "notify.username",
                "Webhook username cannot be empty",
            ));
        }

        if config.chains.token_marker.is_empty() {
            result.add_warning(ValidationWarning::new(
                "chains.token_marker",
                "empty token marker matches every string response value",
            ));
        }

        let host = &config.control_plane.docker_host;
        if !host.starts_with("http://") && !host.starts_with("https://") {
            result.add_error(ValidationError::new(
                "control_plane.docker_host",
                "docker_host must start with http:// or https://",
            ));
        }

        if config.storage.sqlite_path.trim().is_empty() {
            result.add_error(ValidationError::new(
                "storage.sqlite_path",
                "sqlite_path cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
