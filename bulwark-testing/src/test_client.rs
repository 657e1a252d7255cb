// Test HTTP Client

use bulwark_core::{Error, HttpMethod, HttpRequest, HttpResponse, Router};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Test HTTP client routing requests in-process, without sockets
#[derive(Clone)]
pub struct TestClient {
    router: Arc<Router>,
    jar: Option<Arc<Mutex<BTreeMap<String, String>>>>,
}

impl TestClient {
    /// Create a stateless client; every request goes out exactly as built
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            jar: None,
        }
    }

    /// Create a client that remembers cookies between requests.
    ///
    /// `Set-Cookie` values from responses are stored by name and replayed as
    /// a `Cookie` header on later requests that do not set one themselves.
    pub fn agent(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            jar: Some(Arc::new(Mutex::new(BTreeMap::new()))),
        }
    }

    /// Value of a cookie held by the agent
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar.as_ref()?.lock().get(name).cloned()
    }

    /// Forget all stored cookies
    pub fn clear_cookies(&self) {
        if let Some(jar) = &self.jar {
            jar.lock().clear();
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::GET, path, None).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::POST, path, Some(body)).await
    }

    /// Make a request with custom method
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        let req = TestRequestBuilder::new(method, path)
            .body(body.unwrap_or_default())
            .build();
        self.send(req).await
    }

    /// Send a fully built request
    pub async fn send(&self, mut req: HttpRequest) -> TestResponse {
        if let Some(jar) = &self.jar {
            let jar = jar.lock();
            if !jar.is_empty() && req.header("cookie").is_none() {
                let cookie = jar
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("; ");
                req.headers.insert("Cookie".to_string(), cookie);
            }
        }

        let response = match self.router.route(req).await {
            Ok(response) => TestResponse::Success(response),
            Err(error) => TestResponse::Error(error),
        };

        if let (Some(jar), TestResponse::Success(response)) = (&self.jar, &response) {
            let mut jar = jar.lock();
            for set_cookie in &response.cookies {
                if let Some((name, value)) = parse_set_cookie(set_cookie) {
                    jar.insert(name.to_string(), value.to_string());
                }
            }
        }

        response
    }
}

/// Name and value from a `Set-Cookie` header value, attributes dropped
fn parse_set_cookie(set_cookie: &str) -> Option<(&str, &str)> {
    let (name, value) = set_cookie.split(';').next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// Builder for test requests
pub struct TestRequestBuilder {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, String>,
    cookies: Vec<(String, String)>,
    body: Vec<u8>,
    query_params: BTreeMap<String, String>,
}

impl TestRequestBuilder {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HashMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
            query_params: BTreeMap::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Add a cookie; all cookies are sent in one `Cookie` header
    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.insert(key.to_string(), value.to_string());
        self
    }

    /// Build the request
    pub fn build(self) -> HttpRequest {
        let query_string = if !self.query_params.is_empty() {
            let params: Vec<String> = self
                .query_params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            format!("?{}", params.join("&"))
        } else {
            String::new()
        };

        let mut req = HttpRequest::new(
            self.method.as_str(),
            format!("{}{}", self.path, query_string),
        );
        req.headers = self.headers;
        req.body = self.body;

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            req.headers.insert("Cookie".to_string(), cookie);
        }

        req
    }
}

/// Response from a test request
#[derive(Debug)]
pub enum TestResponse {
    Success(HttpResponse),
    Error(Error),
}

impl TestResponse {
    /// Assert the response is successful
    pub fn assert_success(&self) -> &HttpResponse {
        match self {
            TestResponse::Success(response) => response,
            TestResponse::Error(error) => {
                panic!("Expected success response, got error: {:?}", error)
            }
        }
    }

    /// Assert the response is an error
    pub fn assert_error(&self) -> &Error {
        match self {
            TestResponse::Error(error) => error,
            TestResponse::Success(_) => {
                panic!("Expected error response, got success")
            }
        }
    }

    /// Status code; errors report the status they would be served with
    pub fn status(&self) -> u16 {
        match self {
            TestResponse::Success(response) => response.status,
            TestResponse::Error(error) => error.status_code(),
        }
    }

    /// Get the response body as string
    pub fn body_string(&self) -> Option<String> {
        match self {
            TestResponse::Success(response) => String::from_utf8(response.body.clone()).ok(),
            TestResponse::Error(_) => None,
        }
    }

    /// Get the response body as JSON
    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, String> {
        match self {
            TestResponse::Success(response) => serde_json::from_slice(&response.body)
                .map_err(|e| format!("Serialization error: {}", e)),
            TestResponse::Error(error) => Err(format!("{:?}", error)),
        }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        match self {
            TestResponse::Success(response) => response.headers.get(key),
            TestResponse::Error(_) => None,
        }
    }

    /// Value of a cookie set by this response
    pub fn set_cookie(&self, name: &str) -> Option<&str> {
        self.set_cookie_header(name)
            .and_then(parse_set_cookie)
            .map(|(_, value)| value)
    }

    /// Full `Set-Cookie` value, attributes included, for cookie `name`
    pub fn set_cookie_header(&self, name: &str) -> Option<&str> {
        let TestResponse::Success(response) = self else {
            return None;
        };
        response
            .cookies
            .iter()
            .map(String::as_str)
            .find(|c| parse_set_cookie(c).is_some_and(|(n, _)| n == name))
    }
}
