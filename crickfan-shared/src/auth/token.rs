/// Single-use password reset tokens
///
/// Tokens are handed to the user once and only their SHA-256 hash is stored,
/// so a leaked database row cannot be replayed.
///
/// # Format
///
/// `pwr_{40_chars}`: the `pwr_` prefix followed by 40 base62 characters.
///
/// ```
/// use crickfan_shared::auth::token::{generate_reset_token, hash_token, is_reset_token_format};
///
/// let (token, hash) = generate_reset_token();
/// assert!(token.starts_with("pwr_"));
/// assert!(is_reset_token_format(&token));
/// assert_eq!(hash, hash_token(&token));
/// ```
use rand::Rng;
use sha2::{Digest, Sha256};

const TOKEN_RANDOM_LENGTH: usize = 40;

/// Reset token prefix
pub const RESET_TOKEN_PREFIX: &str = "pwr_";

/// Total length of a reset token
pub const RESET_TOKEN_LENGTH: usize = RESET_TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a reset token, returning `(plaintext, sha256_hex)`
pub fn generate_reset_token() -> (String, String) {
    let token = format!("{}{}", RESET_TOKEN_PREFIX, random_base62(TOKEN_RANDOM_LENGTH));
    let hash = hash_token(&token);

    (token, hash)
}

fn random_base62(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Hex-encoded SHA-256 of a token (64 characters)
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap shape check before touching the database
pub fn is_reset_token_format(token: &str) -> bool {
    token.len() == RESET_TOKEN_LENGTH
        && token
            .strip_prefix(RESET_TOKEN_PREFIX)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_alphanumeric()))
}
