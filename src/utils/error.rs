use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::HttpError(_) | FeedError::UrlError(_) => ErrorCategory::Network,
            FeedError::ConfigError { .. }
            | FeedError::InvalidConfigValueError { .. }
            | FeedError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            FeedError::SerializationError(_) => ErrorCategory::Data,
            FeedError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // The upstream site is often only briefly unavailable.
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FeedError::HttpError(e) if e.is_timeout() => {
                "The obituary site did not answer in time".to_string()
            }
            FeedError::HttpError(e) => match e.status() {
                Some(status) => format!("The obituary site answered with status {}", status),
                None => "Could not reach the obituary site".to_string(),
            },
            FeedError::UrlError(_) => "A page address could not be understood".to_string(),
            FeedError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            FeedError::ConfigError { message }
            | FeedError::ConfigValidationError { message, .. } => {
                format!("Configuration problem: {}", message)
            }
            FeedError::SerializationError(_) => "The feed data was malformed".to_string(),
            FeedError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the listing URL and network access, then retry",
            ErrorCategory::Configuration => "Fix the flag or TOML value named above",
            ErrorCategory::Data => "The upstream page or feed changed shape; check the selectors",
            ErrorCategory::System => "Check that the output directory exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = FeedError::InvalidConfigValueError {
            field: "window_days".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("window_days"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = FeedError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_url_errors_are_network() {
        let err: FeedError = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_malformed_feed_is_a_data_error() {
        let err: FeedError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "The feed data was malformed");
    }
}
