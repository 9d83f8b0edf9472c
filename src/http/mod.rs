//! HTTP protocol layer module
//!
//! Response builders, MIME detection, caching headers and CORS, decoupled
//! from the report routes.

pub mod cache;
pub mod cors;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cors::CorsRequest;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_cached_response, build_health_response, error_response, json_response,
};
