//! Testing utilities for Bulwark routers.
//!
//! Requests are routed in-process, with no sockets involved.
//!
//! - **TestClient** - drives a `Router`; `TestClient::agent` keeps cookies
//!   between requests like a browser would
//! - **TestRequestBuilder** - headers, cookies, query and body in one chain
//! - **Assertions** - status, header, JSON and cookie checks
//!
//! ## Quick Start
//!
//! ```no_run
//! use bulwark_testing::*;
//! use bulwark_core::{HttpResponse, Router, handler};
//!
//! # tokio_test::block_on(async {
//! let router = Router::new().get("/hello", handler(|_req| async {
//!     Ok(HttpResponse::ok().with_body(b"Hello!".to_vec()))
//! }));
//!
//! let client = TestClient::new(router);
//! let response = client.get("/hello").await;
//! assert_status(&response, 200);
//! assert_eq!(response.body_string(), Some("Hello!".to_string()));
//! # });
//! ```

pub mod assertions;
pub mod test_client;

pub use assertions::*;
pub use test_client::{TestClient, TestRequestBuilder, TestResponse};
