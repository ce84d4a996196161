//! Error types for the yard billing engine.
//!
//! The calculation engines themselves never fail: malformed numeric input is
//! coerced and reported as an audit warning instead. The errors here cover
//! configuration loading and structural problems with a billing form, such as
//! an unknown billing-method tag or an out-of-range line index.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::BillingMode;

/// The main error type for the yard billing engine.
///
/// # Example
///
/// ```
/// use yard_billing::error::BillingError;
///
/// let error = BillingError::ConfigNotFound {
///     path: "/missing/yard.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/yard.yaml");
/// ```
#[derive(Debug, Error)]
pub enum BillingError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was parsed but is not acceptable.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// No tax rate file is effective on the given date.
    #[error("No tax rates effective on {date}")]
    TaxRatesNotFound {
        /// The bill date for which rates were requested.
        date: NaiveDate,
    },

    /// A billing-method tag was not one of the known modes.
    #[error("Unknown billing method: {tag}")]
    UnknownBillingMode {
        /// The tag as received.
        tag: String,
    },

    /// A material name was not one of the known materials.
    #[error("Unknown material: {name}")]
    UnknownMaterial {
        /// The material name as received.
        name: String,
    },

    /// The active-method tags and the method detail objects disagree.
    #[error("Inconsistent billing method '{mode}': {message}")]
    InconsistentMethod {
        /// The billing mode concerned.
        mode: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// An operation addressed a billing method that is not active.
    #[error("Billing method '{mode}' is not active")]
    MethodNotActive {
        /// The inactive mode.
        mode: BillingMode,
    },

    /// A line operation was requested on a mode without line items.
    #[error("Billing method '{mode}' has no line items")]
    LinesNotSupported {
        /// The mode without lines.
        mode: BillingMode,
    },

    /// A line field was addressed on a mode whose lines do not have it.
    #[error("'{mode}' billing lines have no field '{field}'")]
    FieldNotSupported {
        /// The mode whose lines were addressed.
        mode: BillingMode,
        /// The field name as sent.
        field: String,
    },

    /// A line index was outside the line list.
    #[error("Line {index} out of range for '{mode}' billing ({len} lines)")]
    LineIndexOutOfRange {
        /// The mode whose lines were addressed.
        mode: BillingMode,
        /// The requested index.
        index: usize,
        /// The number of lines present.
        len: usize,
    },
}

/// A type alias for Results that return BillingError.
pub type BillingResult<T> = Result<T, BillingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = BillingError::ConfigNotFound {
            path: "/missing/policy.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/policy.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = BillingError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_tax_rates_not_found_displays_date() {
        let error = BillingError::TaxRatesNotFound {
            date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
        };
        assert_eq!(error.to_string(), "No tax rates effective on 2010-01-01");
    }

    #[test]
    fn test_unknown_billing_mode_displays_tag() {
        let error = BillingError::UnknownBillingMode {
            tag: "quarter".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown billing method: quarter");
    }

    #[test]
    fn test_method_not_active_displays_mode_tag() {
        let error = BillingError::MethodNotActive {
            mode: BillingMode::Weight,
        };
        assert_eq!(error.to_string(), "Billing method 'weight' is not active");
    }

    #[test]
    fn test_line_index_out_of_range_displays_bounds() {
        let error = BillingError::LineIndexOutOfRange {
            mode: BillingMode::Different,
            index: 4,
            len: 2,
        };
        assert_eq!(
            error.to_string(),
            "Line 4 out of range for 'different' billing (2 lines)"
        );
    }

    #[test]
    fn test_field_not_supported_names_field() {
        let error = BillingError::FieldNotSupported {
            mode: BillingMode::Different,
            field: "loading".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "'different' billing lines have no field 'loading'"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<BillingError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_unknown_material() -> BillingResult<()> {
            Err(BillingError::UnknownMaterial {
                name: "ANTHRACITE".to_string(),
            })
        }

        fn propagates_error() -> BillingResult<()> {
            returns_unknown_material()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
