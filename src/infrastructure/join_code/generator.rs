//! Join-code generation
//!
//! Generates the bearer secrets that gate invitation-based team joins.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Target length of a generated join code in characters.
///
/// Long enough that guessing a live code is infeasible even without rate
/// limiting on the join endpoint.
pub const JOIN_CODE_LENGTH: usize = 200;

// 4 base64 characters per 3 bytes, no padding.
const CODE_BYTES: usize = JOIN_CODE_LENGTH * 3 / 4;

/// Generator for team join codes
///
/// Codes are drawn from the OS-seeded CSPRNG and encoded with the URL-safe
/// base64 alphabet, so they can travel in invite links unescaped.
#[derive(Debug, Clone, Default)]
pub struct JoinCodeGenerator;

impl JoinCodeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a new join code
    pub fn generate(&self) -> String {
        let mut random_bytes = [0u8; CODE_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        URL_SAFE_NO_PAD.encode(random_bytes)
    }
}
