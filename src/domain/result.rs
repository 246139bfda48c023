//! Result type alias for geoexport
//!
//! This module provides a convenient Result type alias that uses GeoExportError
//! as the error type.

use super::errors::GeoExportError;

/// Result type alias for geoexport operations
///
/// # Examples
///
/// ```
/// use geoexport::domain::result::Result;
/// use geoexport::domain::errors::GeoExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(GeoExportError::InvalidParameter("negative patch size".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, GeoExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(GeoExportError::Storage("bucket missing".to_string()));
        assert!(result.is_err());
    }
}
