use crate::config::CsrfConfig;
use crate::issuance::{IssuancePolicy, IssueDecision};
use crate::token::TokenCodec;
use async_trait::async_trait;
use bulwark_core::{Error, HttpRequest, HttpResponse, Middleware, Next, into_response};
use tracing::{debug, error};

/// Attaches a token cookie to responses for clients that do not have one.
///
/// Runs on every request regardless of method. The cookie is written even
/// when the downstream handler fails, so a client's first request always
/// leaves it able to make a protected one.
///
/// When a cookie is issued, downstream errors come back already rendered as
/// `Ok` responses; when the client already holds one, they pass through as
/// `Err`. Middleware installed outside this one sees both shapes.
///
/// If the random source fails, the request is answered with a 500 and no
/// cookie.
#[derive(Clone, Debug)]
pub struct CsrfCookieMiddleware {
    issuance: IssuancePolicy,
}

impl CsrfCookieMiddleware {
    pub fn new(config: &CsrfConfig) -> Self {
        let codec = TokenCodec::new(config.secret.clone());
        Self::from_policy(IssuancePolicy::new(codec, config.cookie.clone()))
    }

    pub fn from_policy(issuance: IssuancePolicy) -> Self {
        Self { issuance }
    }

    fn has_cookie(&self, req: &HttpRequest) -> bool {
        req.cookie(self.issuance.cookie_name())
            .is_some_and(|value| !value.is_empty())
    }
}

#[async_trait]
impl Middleware for CsrfCookieMiddleware {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let decision = self.issuance.ensure_token(self.has_cookie(&req)).map_err(|e| {
            error!(error = %e, "Failed to generate CSRF token");
            Error::from(e)
        })?;

        let IssueDecision::Issue(token) = decision else {
            return next(req).await;
        };

        let path = req.path.clone();
        let mut response = into_response(next(req).await);
        response.add_cookie(self.issuance.set_cookie_value(&token));

        debug!(
            %path,
            cookie = self.issuance.cookie_name(),
            status = response.status,
            "Issued CSRF cookie"
        );

        Ok(response)
    }
}
