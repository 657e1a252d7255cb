use crate::config::CookieOptions;
use crate::error::Result;
use crate::token::{TokenCodec, WireToken};

/// Outcome of the issuance check for one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueDecision {
    /// The client already holds a token; leave it alone
    Keep,
    /// Attach this freshly generated token as a cookie
    Issue(WireToken),
}

impl IssueDecision {
    pub fn should_issue(&self) -> bool {
        matches!(self, IssueDecision::Issue(_))
    }

    pub fn wire_token(&self) -> Option<&WireToken> {
        match self {
            IssueDecision::Issue(token) => Some(token),
            IssueDecision::Keep => None,
        }
    }
}

/// Decides whether a response must carry a new token cookie.
///
/// A token is issued only when the request had none. An existing cookie is
/// never replaced, even if it no longer verifies; the access check rejects
/// it on the next state-changing request.
#[derive(Clone, Debug)]
pub struct IssuancePolicy {
    codec: TokenCodec,
    cookie: CookieOptions,
}

impl IssuancePolicy {
    pub fn new(codec: TokenCodec, cookie: CookieOptions) -> Self {
        Self { codec, cookie }
    }

    /// Issue a fresh token unless the request already carried one
    pub fn ensure_token(&self, has_cookie: bool) -> Result<IssueDecision> {
        if has_cookie {
            return Ok(IssueDecision::Keep);
        }
        Ok(IssueDecision::Issue(self.codec.generate()?))
    }

    /// `Set-Cookie` header value carrying `token`
    pub fn set_cookie_value(&self, token: &WireToken) -> String {
        self.cookie.to_set_cookie(token.as_str())
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;
    use crate::verifier::Verifier;
    use std::sync::Arc;

    fn codec() -> TokenCodec {
        TokenCodec::new(Arc::new(Secret::new("test-secret").unwrap()))
    }

    #[test]
    fn test_keep_existing_cookie() {
        let policy = IssuancePolicy::new(codec(), CookieOptions::default());
        let decision = policy.ensure_token(true).unwrap();

        assert_eq!(decision, IssueDecision::Keep);
        assert!(!decision.should_issue());
        assert!(decision.wire_token().is_none());
    }

    #[test]
    fn test_issue_when_absent() {
        let codec = codec();
        let verifier = Verifier::new(codec.clone());
        let policy = IssuancePolicy::new(codec, CookieOptions::default());

        let decision = policy.ensure_token(false).unwrap();
        assert!(decision.should_issue());

        let token = decision.wire_token().unwrap();
        assert!(verifier.verify(token.as_str()));
    }

    #[test]
    fn test_each_issue_is_fresh() {
        let policy = IssuancePolicy::new(codec(), CookieOptions::default());
        let a = policy.ensure_token(false).unwrap();
        let b = policy.ensure_token(false).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_set_cookie_value() {
        let policy = IssuancePolicy::new(codec(), CookieOptions::default());
        let decision = policy.ensure_token(false).unwrap();
        let token = decision.wire_token().unwrap();

        let cookie = policy.set_cookie_value(token);
        assert_eq!(
            cookie,
            format!("csrf={}; Path=/; Secure; SameSite=Strict", token)
        );
        assert!(!cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Expires"));
        assert!(!cookie.contains("Max-Age"));
        assert_eq!(policy.cookie_name(), "csrf");
    }
}
