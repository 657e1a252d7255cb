use crate::error::{CsrfError, Result};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use std::fmt;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Secrets shorter than this are accepted but logged as weak
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Process-wide signing key.
///
/// The key is absorbed into an HMAC state once at construction; signing
/// clones that state, so the raw bytes are not kept around. `Debug` never
/// prints key material.
#[derive(Clone)]
pub struct Secret {
    mac: HmacSha256,
}

impl Secret {
    /// Create a secret from raw key bytes. Empty input is rejected.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(CsrfError::MissingSecret);
        }

        if key.len() < RECOMMENDED_SECRET_LEN {
            warn!(
                len = key.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "CSRF secret is shorter than recommended"
            );
        }

        // HMAC takes keys of any length; longer ones are hashed down
        let mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");

        Ok(Self { mac })
    }

    /// Generate a random 32-byte secret from the operating system.
    ///
    /// Only useful when a single process both issues and verifies tokens;
    /// tokens signed with it die with the process.
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; RECOMMENDED_SECRET_LEN];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| CsrfError::Entropy(e.to_string()))?;
        Self::new(key)
    }

    /// HMAC-SHA256 of `message`, lowercase hex (64 characters)
    pub(crate) fn sign(&self, message: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}
