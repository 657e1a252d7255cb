// Core library for the Bulwark HTTP plumbing
// Request/response types, middleware, guards, routing and the hyper server

pub mod application;
pub mod error;
pub mod guard;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod routing;
pub mod status;

// Re-export commonly used types
pub use application::*;
pub use error::*;
pub use guard::*;
pub use http::*;
pub use middleware::*;
pub use routing::{HttpMethod, Route, Router, handler};
pub use status::*;
