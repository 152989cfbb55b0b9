/// Middleware modules for the API server
///
/// - `session`: session gate (bearer validation + email-confirmation check)
/// - `security`: OWASP security headers

pub mod security;
pub mod session;
