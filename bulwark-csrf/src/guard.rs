use crate::access::{AccessDecision, AccessPolicy};
use crate::config::CsrfConfig;
use crate::token::TokenCodec;
use crate::verifier::Verifier;
use async_trait::async_trait;
use bulwark_core::{Error, Guard, GuardContext};
use tracing::{trace, warn};

/// Message returned to the client on any denial
pub const DENIED_MESSAGE: &str = "Invalid CSRF token";

/// Route guard enforcing the double-submit check on state-changing methods.
///
/// Denials become `403 Forbidden` with a fixed message; the specific reason
/// goes to the log only.
#[derive(Clone, Debug)]
pub struct CsrfGuard {
    access: AccessPolicy,
    cookie_name: String,
    header_name: String,
    safe_methods: Vec<String>,
}

impl CsrfGuard {
    pub fn new(config: &CsrfConfig) -> Self {
        let verifier = Verifier::new(TokenCodec::new(config.secret.clone()));
        Self::from_policy(AccessPolicy::new(verifier), config)
    }

    /// Build around an existing policy, taking names and safe methods from `config`
    pub fn from_policy(access: AccessPolicy, config: &CsrfConfig) -> Self {
        Self {
            access,
            cookie_name: config.cookie.name.clone(),
            header_name: config.header_name.clone(),
            safe_methods: config.safe_methods.clone(),
        }
    }

    /// Whether requests with `method` are subject to the check
    pub fn needs_protection(&self, method: &str) -> bool {
        !self
            .safe_methods
            .iter()
            .any(|safe| safe.eq_ignore_ascii_case(method))
    }
}

#[async_trait]
impl Guard for CsrfGuard {
    async fn can_activate(&self, context: &GuardContext<'_>) -> Result<bool, Error> {
        if !self.needs_protection(context.method()) {
            trace!(method = context.method(), "Safe method, skipping CSRF check");
            return Ok(true);
        }

        let decision = self.access.check(
            context.get_cookie(&self.cookie_name),
            context.get_header(&self.header_name),
        );

        match decision {
            AccessDecision::Allow => Ok(true),
            AccessDecision::Deny(reason) => {
                warn!(
                    %reason,
                    method = context.method(),
                    path = context.path(),
                    "CSRF check failed"
                );
                Err(Error::Forbidden(DENIED_MESSAGE.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;
    use bulwark_core::HttpRequest;

    fn setup() -> (CsrfConfig, CsrfGuard) {
        let config = CsrfConfig::new(Secret::new("test-secret").unwrap());
        let guard = CsrfGuard::new(&config);
        (config, guard)
    }

    fn token(config: &CsrfConfig) -> String {
        TokenCodec::new(config.secret.clone())
            .generate()
            .unwrap()
            .into_string()
    }

    #[test]
    fn test_needs_protection() {
        let (_, guard) = setup();

        assert!(!guard.needs_protection("GET"));
        assert!(!guard.needs_protection("head"));
        assert!(!guard.needs_protection("OPTIONS"));
        assert!(guard.needs_protection("POST"));
        assert!(guard.needs_protection("PUT"));
        assert!(guard.needs_protection("PATCH"));
        assert!(guard.needs_protection("DELETE"));
    }

    #[tokio::test]
    async fn test_safe_method_passes_without_token() {
        let (_, guard) = setup();
        let req = HttpRequest::new("GET", "/");
        assert!(guard.can_activate(&GuardContext::new(&req)).await.unwrap());
    }

    #[tokio::test]
    async fn test_allows_matching_token() {
        let (config, guard) = setup();
        let token = token(&config);
        let req = HttpRequest::new("POST", "/")
            .with_header("Cookie", format!("csrf={}", token))
            .with_header("X-CSRF-Token", token.clone());

        assert!(guard.can_activate(&GuardContext::new(&req)).await.unwrap());
    }

    #[tokio::test]
    async fn test_denies_missing_header() {
        let (config, guard) = setup();
        let req = HttpRequest::new("POST", "/")
            .with_header("Cookie", format!("csrf={}", token(&config)));

        let err = guard
            .can_activate(&GuardContext::new(&req))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(err.to_string().contains(DENIED_MESSAGE));
    }

    #[tokio::test]
    async fn test_denies_mismatch_with_same_message() {
        let (config, guard) = setup();
        let req = HttpRequest::new("DELETE", "/items/1")
            .with_header("Cookie", format!("csrf={}", token(&config)))
            .with_header("x-csrf-token", token(&config));

        let err = guard
            .can_activate(&GuardContext::new(&req))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Forbidden: {}", DENIED_MESSAGE));
    }

    #[tokio::test]
    async fn test_empty_safe_methods_guards_get() {
        let config = CsrfConfig::new(Secret::new("test-secret").unwrap()).with_safe_methods(vec![]);
        let guard = CsrfGuard::new(&config);
        let req = HttpRequest::new("GET", "/");

        assert!(guard.can_activate(&GuardContext::new(&req)).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_names() {
        let config = CsrfConfig::new(Secret::new("test-secret").unwrap())
            .with_cookie_name("xsrf")
            .with_header_name("x-xsrf-token");
        let guard = CsrfGuard::new(&config);
        let token = token(&config);

        let req = HttpRequest::new("POST", "/")
            .with_header("Cookie", format!("xsrf={}", token))
            .with_header("x-xsrf-token", token.clone());
        assert!(guard.can_activate(&GuardContext::new(&req)).await.unwrap());

        let default_names = HttpRequest::new("POST", "/")
            .with_header("Cookie", format!("csrf={}", token))
            .with_header("x-csrf-token", token);
        assert!(guard
            .can_activate(&GuardContext::new(&default_names))
            .await
            .is_err());
    }
}
