use url::Url;
use crate::error::{ConfigError, Result};

/// Centralized configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a URL string
    pub fn validate_url(url: &str, field_name: &str) -> Result<()> {
        Url::parse(url)
            .map_err(|e| ConfigError::invalid_value(field_name, format!("'{}' is not a URL ({})", url, e)))?;
        Ok(())
    }

    /// Validate numeric range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ConfigError::invalid_value(
                field_name,
                format!("{} (must be between {} and {})", value, min, max),
            )
            .into());
        }
        Ok(())
    }

    /// Validate a likeliness threshold, which must lie in (0, 1]
    pub fn validate_threshold(value: f64) -> Result<()> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ConfigError::invalid_value(
                "likeliness_threshold",
                format!("{} (must be in (0, 1])", value),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EarwormError;

    #[test]
    fn test_validate_url() {
        assert!(ConfigValidator::validate_url("https://api.genius.com", "Genius API").is_ok());
        assert!(ConfigValidator::validate_url("not-a-url", "Genius API").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(ConfigValidator::validate_range(5u64, 1u64, 10u64, "test").is_ok());
        assert!(ConfigValidator::validate_range(15u64, 1u64, 10u64, "test").is_err());
        assert!(ConfigValidator::validate_range(0u64, 1u64, 10u64, "test").is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert!(ConfigValidator::validate_threshold(0.8).is_ok());
        assert!(ConfigValidator::validate_threshold(1.0).is_ok());
        assert!(ConfigValidator::validate_threshold(0.0).is_err());
        assert!(ConfigValidator::validate_threshold(1.5).is_err());
        assert!(ConfigValidator::validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_violations_name_the_field() {
        let err = ConfigValidator::validate_range(80usize, 1, 50, "library_page_size").unwrap_err();
        assert!(matches!(
            err,
            EarwormError::Config(ConfigError::InvalidValue { ref field, ref value })
                if field == "library_page_size" && value.starts_with("80")
        ));

        let err = ConfigValidator::validate_url("genius", "genius_api_url").unwrap_err();
        assert!(matches!(
            err,
            EarwormError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "genius_api_url"
        ));
    }
}
