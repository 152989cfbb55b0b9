/// Authentication and session utilities
///
/// This module provides the security primitives for Harbor:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`token`]: Opaque invitation and email-confirmation tokens
/// - [`context`]: Authenticated request context
/// - [`gate`]: Session gate decision (sign-in / verify-email / allow)
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Opaque Tokens**: Secure random generation with SHA-256 hashing;
///   plaintext never stored

pub mod context;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod token;
