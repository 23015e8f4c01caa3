//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest display name accepted, in characters.
pub const MAX_NAME_CHARS: usize = 24;
/// Longest guess accepted, in characters.
pub const MAX_GUESS_CHARS: usize = 120;
/// Longest room code accepted before lookup.
pub const MAX_CODE_CHARS: usize = 8;
/// Longest catalog search query accepted.
pub const MAX_QUERY_CHARS: usize = 200;

/// Validates that a room code is a short run of ASCII letters and digits.
///
/// # Examples
///
/// ```ignore
/// validate_room_code("AB12") // Ok
/// validate_room_code("ab12") // Ok - codes are upper-cased later
/// validate_room_code("AB-12") // Err - punctuation
/// ```
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.is_empty() || code.len() > MAX_CODE_CHARS {
        let mut err = ValidationError::new("room_code_length");
        err.message = Some(
            format!(
                "Room code must be between 1 and {MAX_CODE_CHARS} characters (got {})",
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("Room code must contain only letters and digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name fits the scoreboard once trimmed.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let count = name.trim().chars().count();
    if count > MAX_NAME_CHARS {
        let mut err = ValidationError::new("display_name_length");
        err.message =
            Some(format!("Display name must be at most {MAX_NAME_CHARS} characters (got {count})").into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a guess is not absurdly long.
pub fn validate_guess(guess: &str) -> Result<(), ValidationError> {
    if guess.chars().count() > MAX_GUESS_CHARS {
        let mut err = ValidationError::new("guess_length");
        err.message = Some(format!("Guess must be at most {MAX_GUESS_CHARS} characters").into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a catalog search query is present and reasonably short.
pub fn validate_search_query(query: &str) -> Result<(), ValidationError> {
    let count = query.trim().chars().count();
    if count == 0 || count > MAX_QUERY_CHARS {
        let mut err = ValidationError::new("search_query_length");
        err.message = Some(
            format!("Query parameter `q` must be between 1 and {MAX_QUERY_CHARS} characters").into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_code_valid() {
        assert!(validate_room_code("AB12").is_ok());
        assert!(validate_room_code("ab12").is_ok());
        assert!(validate_room_code(" Z9X0 ").is_ok());
    }

    #[test]
    fn test_validate_room_code_invalid() {
        assert!(validate_room_code("").is_err());
        assert!(validate_room_code("   ").is_err());
        assert!(validate_room_code("ABCDEFGHIJ").is_err()); // too long
        assert!(validate_room_code("AB-12").is_err()); // punctuation
        assert!(validate_room_code("ÀB12").is_err()); // non-ascii
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Alice").is_ok());
        assert!(validate_display_name("").is_ok()); // falls back to a default
        assert!(validate_display_name(&"é".repeat(MAX_NAME_CHARS)).is_ok());
        assert!(validate_display_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_guess() {
        assert!(validate_guess("The Eminem Show").is_ok());
        assert!(validate_guess(&"x".repeat(MAX_GUESS_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert!(validate_search_query("daft punk").is_ok());
        assert!(validate_search_query("").is_err());
        assert!(validate_search_query("  ").is_err());
        assert!(validate_search_query(&"q".repeat(MAX_QUERY_CHARS + 1)).is_err());
    }
}
