//! # Bulwark CSRF Protection
//!
//! Stateless Cross-Site Request Forgery protection using the double-submit
//! cookie pattern with HMAC-SHA256 signed tokens.
//!
//! ## How it works
//!
//! - A client without a `csrf` cookie gets one on its next response.
//! - Client script reads the cookie and echoes it in the `x-csrf-token` header.
//! - State-changing requests pass only if cookie and header are present,
//!   identical, and signed with the server secret.
//!
//! No server-side token storage is involved; every process sharing the
//! secret accepts every other's tokens.
//!
//! ## Quick Start
//!
//! ```rust
//! use bulwark_csrf::{CsrfConfig, CsrfProtection, Secret};
//!
//! let config = CsrfConfig::new(Secret::new("a-long-random-server-secret").unwrap());
//! let csrf = CsrfProtection::new(config);
//!
//! let token = csrf.codec().generate().unwrap();
//! assert!(csrf.verifier().verify(token.as_str()));
//! assert!(csrf.access().check(Some(token.as_str()), Some(token.as_str())).is_allowed());
//! ```
//!
//! ## Usage with a Router
//!
//! ```ignore
//! use bulwark_core::{HttpMethod, Route, Router, handler};
//! use std::sync::Arc;
//!
//! let csrf = CsrfProtection::new(CsrfConfig::from_env()?);
//!
//! let router = Router::new()
//!     .use_middleware(Arc::new(csrf.middleware()))
//!     .route_with(
//!         Route::new(HttpMethod::POST, "/protected", handler(create))
//!             .with_guard(Arc::new(csrf.guard())),
//!     );
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod guard;
pub mod issuance;
pub mod middleware;
pub mod secret;
pub mod token;
pub mod verifier;

pub use access::{AccessDecision, AccessPolicy, DenyReason};
pub use config::{CookieOptions, CsrfConfig, SameSite};
pub use error::{CsrfError, Result};
pub use guard::CsrfGuard;
pub use issuance::{IssuancePolicy, IssueDecision};
pub use middleware::CsrfCookieMiddleware;
pub use secret::Secret;
pub use token::{EntropySource, MalformedToken, OsEntropy, TokenCodec, WireToken, split};
pub use verifier::{Verifier, constant_time_eq};

/// One configuration wired into every CSRF component.
///
/// All parts share the same secret, so a token issued by `middleware()`
/// is accepted by `guard()`.
#[derive(Clone, Debug)]
pub struct CsrfProtection {
    config: CsrfConfig,
    codec: TokenCodec,
}

impl CsrfProtection {
    pub fn new(config: CsrfConfig) -> Self {
        let codec = TokenCodec::new(config.secret.clone());
        Self { config, codec }
    }

    /// Load from the environment; fails if `CSRF_SECRET` is unset or empty
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(CsrfConfig::from_env()?))
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    pub fn codec(&self) -> TokenCodec {
        self.codec.clone()
    }

    pub fn verifier(&self) -> Verifier {
        Verifier::new(self.codec())
    }

    pub fn issuance(&self) -> IssuancePolicy {
        IssuancePolicy::new(self.codec(), self.config.cookie.clone())
    }

    pub fn access(&self) -> AccessPolicy {
        AccessPolicy::new(self.verifier())
    }

    /// Cookie issuing middleware; install it on the whole router
    pub fn middleware(&self) -> CsrfCookieMiddleware {
        CsrfCookieMiddleware::from_policy(self.issuance())
    }

    /// Guard for state-changing routes
    pub fn guard(&self) -> CsrfGuard {
        CsrfGuard::from_policy(self.access(), &self.config)
    }
}
