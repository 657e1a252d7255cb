//! Token codec: random generation, signing and wire-format splitting.
//!
//! A wire token is `<raw-token-hex>.<signature-hex>` where the raw token is
//! 32 random bytes (64 hex characters) and the signature is
//! HMAC-SHA256(secret, raw-token-hex), also hex.

use crate::error::{CsrfError, Result};
use crate::secret::Secret;
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Number of random bytes in a raw token
pub const RAW_TOKEN_BYTES: usize = 32;

/// Separator between the raw token and its signature
pub const SEPARATOR: char = '.';

/// A token value as sent in the cookie and echoed in the header
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WireToken(String);

impl WireToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for WireToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens are bearer credentials; keep them out of debug logs.
impl fmt::Debug for WireToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WireToken(<redacted>)")
    }
}

impl AsRef<str> for WireToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<WireToken> for String {
    fn from(token: WireToken) -> Self {
        token.0
    }
}

impl PartialEq<str> for WireToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// The value does not have the `<token>.<signature>` shape
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed CSRF token")]
pub struct MalformedToken;

/// Split a wire token into `(token, signature)`.
///
/// Exactly one separator and two non-empty segments are accepted; nothing
/// cryptographic happens here.
pub fn split(wire: &str) -> std::result::Result<(&str, &str), MalformedToken> {
    let (token, signature) = wire.split_once(SEPARATOR).ok_or(MalformedToken)?;

    if token.is_empty() || signature.is_empty() || signature.contains(SEPARATOR) {
        return Err(MalformedToken);
    }

    Ok((token, signature))
}

/// Where raw token bytes come from.
///
/// Implementations must be cryptographically secure and report failure
/// instead of degrading.
pub trait EntropySource: fmt::Debug + Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> std::result::Result<(), rand::Error>;
}

/// The operating system's random source
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// Generates and signs tokens with the shared secret
#[derive(Clone, Debug)]
pub struct TokenCodec {
    secret: Arc<Secret>,
    entropy: Arc<dyn EntropySource>,
}

impl TokenCodec {
    pub fn new(secret: Arc<Secret>) -> Self {
        Self::with_entropy(secret, Arc::new(OsEntropy))
    }

    /// Use a specific random source instead of the operating system's
    pub fn with_entropy(secret: Arc<Secret>, entropy: Arc<dyn EntropySource>) -> Self {
        Self { secret, entropy }
    }

    /// Produce a fresh signed wire token.
    ///
    /// Fails only if the random source fails; there is no fallback to a
    /// weaker generator.
    pub fn generate(&self) -> Result<WireToken> {
        let mut raw = [0u8; RAW_TOKEN_BYTES];
        self.entropy
            .fill(&mut raw)
            .map_err(|e| CsrfError::Entropy(e.to_string()))?;

        let token = hex::encode(raw);
        let signature = self.sign(&token);

        Ok(WireToken(format!("{}{}{}", token, SEPARATOR, signature)))
    }

    /// HMAC-SHA256 over the token's text, hex-encoded
    pub fn sign(&self, token: &str) -> String {
        self.secret.sign(token.as_bytes())
    }
}

/// Random source that always fails
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct FailingEntropy;

#[cfg(test)]
impl EntropySource for FailingEntropy {
    fn fill(&self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        Err(rand::Error::new("entropy pool unavailable"))
    }
}
