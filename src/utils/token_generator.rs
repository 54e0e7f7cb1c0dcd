//! Short token generation.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of generated tokens.
pub const TOKEN_LENGTH: usize = 8;

/// Generates a random token from the ASCII alphanumeric alphabet.
///
/// Uniqueness is statistical only; the relational backend rejects a
/// colliding token through its `short_url` unique constraint.
///
/// # Examples
///
/// ```ignore
/// let token = generate_token();
/// assert_eq!(token.len(), 8);
/// assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_token_has_correct_length() {
        assert_eq!(generate_token().len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_generate_token_alphanumeric_only() {
        let token = generate_token();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_token_produces_unique_tokens() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_token()).collect();

        assert_eq!(tokens.len(), 1000);
    }
}
