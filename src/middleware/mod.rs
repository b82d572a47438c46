/// Middleware module
///
/// Access token authentication and request metrics.

mod jwt_middleware;
mod request_metrics;

pub use jwt_middleware::{AuthenticatedUser, JwtMiddleware};
pub use request_metrics::{RequestCounter, RequestMetrics};
