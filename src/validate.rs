use crate::error::ReviewError;
use crate::types::ReviewRequest;

/// Minimum number of characters for a reviewable submission
pub const MIN_CODE_CHARS: usize = 10;

pub const CODE_TOO_SHORT_MESSAGE: &str = "Please provide some code to review";
pub const FILE_NAME_REQUIRED_MESSAGE: &str = "File name is required";

/// Validate raw form fields into a review request.
///
/// Pure function. Returns the first applicable field error; the code error
/// takes precedence over the file-name error.
pub fn validate(file_name: &str, code: &str) -> Result<ReviewRequest, ReviewError> {
    if code.chars().count() < MIN_CODE_CHARS {
        return Err(ReviewError::Validation(CODE_TOO_SHORT_MESSAGE.to_string()));
    }
    if file_name.is_empty() {
        return Err(ReviewError::Validation(
            FILE_NAME_REQUIRED_MESSAGE.to_string(),
        ));
    }
    Ok(ReviewRequest {
        file_name: file_name.to_string(),
        code: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission() {
        let request = validate("a.ts", "const x=1;const x=1;").unwrap();
        assert_eq!(request.file_name, "a.ts");
        assert_eq!(request.code, "const x=1;const x=1;");
    }

    #[test]
    fn test_code_under_threshold() {
        // 9 spaces: one short of the minimum, whitespace still counts
        let err = validate("a.ts", "         ").unwrap_err();
        assert_eq!(err.user_message(), CODE_TOO_SHORT_MESSAGE);
    }

    #[test]
    fn test_code_at_threshold_passes() {
        assert!(validate("a.ts", "0123456789").is_ok());
    }

    #[test]
    fn test_empty_file_name() {
        let err = validate("", "const x=1;const x=1;").unwrap_err();
        assert_eq!(err.user_message(), FILE_NAME_REQUIRED_MESSAGE);
    }

    #[test]
    fn test_code_error_takes_precedence() {
        // Both fields invalid: the code message wins
        let err = validate("", "short").unwrap_err();
        assert_eq!(err.user_message(), CODE_TOO_SHORT_MESSAGE);
    }

    #[test]
    fn test_multibyte_code_counts_chars_not_bytes() {
        // 10 chars, more than 10 bytes
        assert!(validate("a.ts", "日本語のコードです。x").is_ok());
    }
}
