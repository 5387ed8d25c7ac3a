//! Participant bearer token generation.

use uuid::Uuid;

/// Generate an unpredictable participant token.
///
/// Tokens are 32 lowercase hex characters drawn from a random v4 UUID,
/// which is sourced from the operating system's CSPRNG.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
