//! Tower Middleware Stack
//!
//! Layers wrapped around the gateway router.

pub mod auth;
pub mod routes;
pub mod tracing;

pub use auth::{Admission, AuthFilter, AuthLayer, AuthService, Rejection, bearer_token};
pub use routes::{BypassList, RouteMatcher};
pub use tracing::TracingLayer;
