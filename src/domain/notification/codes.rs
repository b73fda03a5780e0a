//! Processor status codes.

/// `ReturnCode` value meaning the processor handled the request.
pub const RETURN_CODE_OK: i64 = 1;

/// `PayResult` value meaning the payment itself succeeded.
pub const PAY_RESULT_SUCCESS: i64 = 3;

/// Compares a processor code against `expected`.
///
/// Codes arrive as text or numbers ("1", 1, "1.0", " 1 "); anything
/// missing or non-numeric is not equal.
pub fn code_equals(text: &str, expected: i64) -> bool {
    text.trim()
        .parse::<f64>()
        .map(|v| v == expected as f64)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_equals_handles_text_forms() {
        assert!(code_equals("1", RETURN_CODE_OK));
        assert!(code_equals(" 1 ", RETURN_CODE_OK));
        assert!(code_equals("1.0", RETURN_CODE_OK));
        assert!(code_equals("3", PAY_RESULT_SUCCESS));
        assert!(!code_equals("", RETURN_CODE_OK));
        assert!(!code_equals("one", RETURN_CODE_OK));
        assert!(!code_equals("2", RETURN_CODE_OK));
    }
}
