// Routing system for HTTP requests

use crate::{Error, Guard, GuardContext, HandlerFn, HttpRequest, HttpResponse, Middleware, MiddlewareChain};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// HTTP methods
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

/// Wrap an async function as a route handler
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Route definition with handler and guards
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerFn,
    pub guards: Vec<Arc<dyn Guard>>,
}

impl Route {
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: HandlerFn) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            guards: Vec::new(),
        }
    }

    /// Protect this route with a guard; guards run in the order added
    pub fn with_guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }
}

/// Router for managing routes and dispatching requests
#[derive(Clone, Default)]
pub struct Router {
    routes: Arc<Vec<Route>>,
    middleware: MiddlewareChain,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route to the router
    pub fn add_route(&mut self, route: Route) {
        Arc::make_mut(&mut self.routes).push(route);
    }

    /// Register a GET route
    pub fn get(mut self, path: &str, handler: HandlerFn) -> Self {
        self.add_route(Route::new(HttpMethod::GET, path, handler));
        self
    }

    /// Register a POST route
    pub fn post(mut self, path: &str, handler: HandlerFn) -> Self {
        self.add_route(Route::new(HttpMethod::POST, path, handler));
        self
    }

    /// Register a fully built route
    pub fn route_with(mut self, route: Route) -> Self {
        self.add_route(route);
        self
    }

    /// Add middleware that wraps every request, matched or not
    pub fn use_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Run the middleware chain and dispatch the request to its route
    pub async fn route(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let routes = self.routes.clone();
        let dispatcher: HandlerFn = Arc::new(move |req| Box::pin(dispatch(routes.clone(), req)));
        self.middleware.apply(request, dispatcher).await
    }
}

/// Find a route that matches the request, run its guards, then its handler
async fn dispatch(routes: Arc<Vec<Route>>, mut request: HttpRequest) -> Result<HttpResponse, Error> {
    let (path, query_string) = match request.path.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (request.path.clone(), None),
    };

    if let Some(query) = query_string {
        request.query_params = parse_query_string(&query);
    }

    let mut path_matched = false;
    for route in routes.iter() {
        let Some(params) = match_path(&route.path, &path) else {
            continue;
        };

        if !route.method.as_str().eq_ignore_ascii_case(&request.method) {
            path_matched = true;
            continue;
        }

        request.path_params = params;

        for guard in &route.guards {
            let context = GuardContext::new(&request);
            if !guard.can_activate(&context).await? {
                debug!(method = %request.method, %path, "Guard rejected request");
                return Err(Error::Forbidden("Access denied".to_string()));
            }
        }

        return (route.handler)(request).await;
    }

    if path_matched {
        Err(Error::MethodNotAllowed(format!("{} {}", request.method, path)))
    } else {
        Err(Error::RouteNotFound(format!("{} {}", request.method, path)))
    }
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parse a query string into a map of parameters
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct DenyAll;

    #[async_trait]
    impl Guard for DenyAll {
        async fn can_activate(&self, _context: &GuardContext<'_>) -> Result<bool, Error> {
            Ok(false)
        }
    }

    fn ok_handler() -> HandlerFn {
        handler(|_req| async { Ok(HttpResponse::ok()) })
    }

    #[test]
    fn test_match_path_with_param() {
        let params = match_path("/users/:id", "/users/123").unwrap();
        assert_eq!(params.get("id"), Some(&"123".to_string()));
    }

    #[test]
    fn test_match_path_no_match() {
        assert!(match_path("/users/:id", "/posts/123").is_none());
        assert!(match_path("/users", "/users/123").is_none());
    }

    #[test]
    fn test_match_path_root() {
        assert!(match_path("/", "/").is_some());
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("name=john&flag&age=30");
        assert_eq!(params.get("name"), Some(&"john".to_string()));
        assert_eq!(params.get("flag"), Some(&String::new()));
        assert_eq!(params.get("age"), Some(&"30".to_string()));
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn test_method_round_trip() {
        assert_eq!(HttpMethod::from_str("post"), Some(HttpMethod::POST));
        assert_eq!(HttpMethod::POST.as_str(), "POST");
        assert_eq!(HttpMethod::from_str("BREW"), None);
    }

    #[tokio::test]
    async fn test_router_dispatches() {
        let router = Router::new()
            .get("/public", ok_handler())
            .post("/items/:id", handler(|req| async move {
                let id = req.param("id").cloned().unwrap_or_default();
                Ok(HttpResponse::created().with_body(id.into_bytes()))
            }));

        let response = router.route(HttpRequest::new("GET", "/public?x=1")).await.unwrap();
        assert_eq!(response.status, 200);

        let response = router.route(HttpRequest::new("POST", "/items/42")).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, b"42");
    }

    #[tokio::test]
    async fn test_router_not_found_and_method_not_allowed() {
        let router = Router::new().get("/public", ok_handler());

        let err = router.route(HttpRequest::new("GET", "/missing")).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = router.route(HttpRequest::new("POST", "/public")).await.unwrap_err();
        assert_eq!(err.status_code(), 405);
    }

    #[tokio::test]
    async fn test_guard_rejection_is_forbidden() {
        let router = Router::new().route_with(
            Route::new(HttpMethod::POST, "/protected", ok_handler()).with_guard(Arc::new(DenyAll)),
        );

        let err = router.route(HttpRequest::new("POST", "/protected")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
