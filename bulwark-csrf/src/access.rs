use crate::verifier::Verifier;
use std::fmt;

/// Why a state-changing request was refused.
///
/// Only ever logged; clients see one uniform message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Cookie or header absent (an empty value counts as absent)
    MissingToken,
    /// Cookie and header differ
    Mismatch,
    /// Cookie and header agree but the signature does not verify
    InvalidSignature,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MissingToken => "missing token",
            DenyReason::Mismatch => "mismatch",
            DenyReason::InvalidSignature => "invalid signature",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Double-submit check: cookie and header must both be present, identical,
/// and carry a valid signature.
#[derive(Clone, Debug)]
pub struct AccessPolicy {
    verifier: Verifier,
}

impl AccessPolicy {
    pub fn new(verifier: Verifier) -> Self {
        Self { verifier }
    }

    /// Decide on a request given its cookie and header values.
    ///
    /// Checks run in a fixed order and the first failure is reported.
    /// Cookie and header are compared with plain equality; they are both
    /// attacker-visible to the client that sent them.
    pub fn check(&self, cookie: Option<&str>, header: Option<&str>) -> AccessDecision {
        let (Some(cookie), Some(header)) = (
            cookie.filter(|v| !v.is_empty()),
            header.filter(|v| !v.is_empty()),
        ) else {
            return AccessDecision::Deny(DenyReason::MissingToken);
        };

        if cookie != header {
            return AccessDecision::Deny(DenyReason::Mismatch);
        }

        if !self.verifier.verify(cookie) {
            return AccessDecision::Deny(DenyReason::InvalidSignature);
        }

        AccessDecision::Allow
    }
}
