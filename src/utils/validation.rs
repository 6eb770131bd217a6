use crate::utils::error::{CuppingError, Result};
use std::collections::HashSet;

pub const MIN_SECTION_SCORE: f64 = 0.0;
pub const MAX_SECTION_SCORE: f64 = 10.0;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Section scores live on the closed interval [0, 10]; NaN never does.
pub fn validate_score(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(MIN_SECTION_SCORE..=MAX_SECTION_SCORE).contains(&value) {
        return Err(CuppingError::out_of_range(
            field_name,
            value,
            format!(
                "score must be between {} and {}",
                MIN_SECTION_SCORE, MAX_SECTION_SCORE
            ),
        ));
    }
    Ok(())
}

pub fn validate_count(field_name: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(CuppingError::out_of_range(
            field_name,
            value,
            "count must be non-negative",
        ));
    }
    u32::try_from(value)
        .map_err(|_| CuppingError::out_of_range(field_name, value, "count is too large"))
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CuppingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CuppingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => {}
            Some(extension) => {
                return Err(CuppingError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(CuppingError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CuppingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CuppingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_score_bounds_are_inclusive() {
        assert!(validate_score("aroma", 0.0).is_ok());
        assert!(validate_score("aroma", 10.0).is_ok());
        assert!(validate_score("aroma", 10.0001).is_err());
        assert!(validate_score("aroma", -0.1).is_err());
        assert!(validate_score("aroma", f64::NAN).is_err());
        assert!(validate_score("aroma", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_count() {
        assert_eq!(validate_count("defective", 3).unwrap(), 3);
        assert!(matches!(
            validate_count("defective", -1),
            Err(CuppingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["sheet.csv".to_string(), "SALES.CSV".to_string()];
        assert!(validate_file_extensions("input", &files, &["csv"]).is_ok());

        let invalid_files = vec!["sheet.xlsx".to_string()];
        assert!(validate_file_extensions("input", &invalid_files, &["csv"]).is_err());

        let no_extension = vec!["sheet".to_string()];
        assert!(validate_file_extensions("input", &no_extension, &["csv"]).is_err());
    }

    #[test]
    fn test_validate_range_and_strings() {
        assert!(validate_range("decimals", 2u32, 0, 6).is_ok());
        assert!(validate_range("decimals", 9u32, 0, 6).is_err());
        assert!(validate_non_empty_string("name", "  ").is_err());
        assert!(validate_path("output_path", "").is_err());
    }
}
