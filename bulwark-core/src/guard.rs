// Guards for route protection

use crate::{Error, HttpRequest};
use async_trait::async_trait;

/// Execution context for guards
pub struct GuardContext<'a> {
    pub request: &'a HttpRequest,
}

impl<'a> GuardContext<'a> {
    pub fn new(request: &'a HttpRequest) -> Self {
        Self { request }
    }

    pub fn get_header(&self, name: &str) -> Option<&'a str> {
        self.request.header(name)
    }

    pub fn get_cookie(&self, name: &str) -> Option<&'a str> {
        self.request.cookie(name)
    }

    pub fn method(&self) -> &'a str {
        &self.request.method
    }

    pub fn path(&self) -> &'a str {
        &self.request.path
    }
}

/// Guard trait for protecting routes
///
/// Returning `Ok(false)` rejects the request with a generic 403; returning
/// an `Err` lets the guard pick the error (and so the status) itself.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Determine if the request can proceed
    async fn can_activate(&self, context: &GuardContext<'_>) -> Result<bool, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HeaderPresentGuard(&'static str);

    #[async_trait]
    impl Guard for HeaderPresentGuard {
        async fn can_activate(&self, context: &GuardContext<'_>) -> Result<bool, Error> {
            Ok(context.get_header(self.0).is_some())
        }
    }

    #[tokio::test]
    async fn test_guard_reads_context() {
        let guard = HeaderPresentGuard("x-api-key");

        let request = HttpRequest::new("POST", "/test").with_header("X-Api-Key", "k");
        assert!(guard.can_activate(&GuardContext::new(&request)).await.unwrap());

        let request = HttpRequest::new("POST", "/test");
        assert!(!guard.can_activate(&GuardContext::new(&request)).await.unwrap());
    }

    #[test]
    fn test_context_accessors() {
        let request = HttpRequest::new("DELETE", "/items/1").with_header("Cookie", "csrf=a.b");
        let context = GuardContext::new(&request);

        assert_eq!(context.method(), "DELETE");
        assert_eq!(context.path(), "/items/1");
        assert_eq!(context.get_cookie("csrf"), Some("a.b"));
    }
}
