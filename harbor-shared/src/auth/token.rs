/// Opaque token utilities for invitations and email confirmation
///
/// Invitation links and email-confirmation links carry server-generated
/// random tokens, opaque to the client. The plaintext is handed out exactly
/// once; only its SHA-256 hash is stored, and lookup is always by hash.
///
/// # Token Format
///
/// - Invitation tokens: `hinv_{32_chars}` (prefix + 32 base62 chars)
/// - Confirmation tokens: `hconf_{32_chars}`
///
/// # Example
///
/// ```
/// use harbor_shared::auth::token::{generate_invite_token, hash_token};
///
/// let (token, hash) = generate_invite_token();
/// assert!(token.starts_with("hinv_"));
/// assert_eq!(hash.len(), 64); // SHA-256 hex
/// assert_eq!(hash, hash_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of a token (characters)
const TOKEN_RANDOM_LENGTH: usize = 32;

/// Prefix for workspace invitation tokens
const INVITE_PREFIX: &str = "hinv_";

/// Prefix for email-confirmation tokens
const CONFIRM_PREFIX: &str = "hconf_";

/// Generates a new workspace invitation token
///
/// # Returns
///
/// Tuple of (plaintext_token, sha256_hash). The plaintext goes into the
/// invitation link; the hash goes into the database.
///
/// # Security
///
/// - Uses `rand::thread_rng()` for cryptographic randomness
/// - Key space: 62^32 ≈ 2^190 combinations
pub fn generate_invite_token() -> (String, String) {
    generate_prefixed(INVITE_PREFIX)
}

/// Generates a new email-confirmation token
///
/// Same construction as invitation tokens, distinct prefix.
pub fn generate_confirmation_token() -> (String, String) {
    generate_prefixed(CONFIRM_PREFIX)
}

fn generate_prefixed(prefix: &str) -> (String, String) {
    let random_part = generate_random_string(TOKEN_RANDOM_LENGTH);
    let token = format!("{}{}", prefix, random_part);
    let hash = hash_token(&token);

    (token, hash)
}

/// Generates a random alphanumeric string
///
/// Base62 (A-Z, a-z, 0-9) keeps tokens URL-safe.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a token with SHA-256
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters). Deterministic, so the stored
/// hash can be matched against a presented plaintext.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
