mod jwt_auth;

pub use jwt_auth::{JwtAuthMiddlewareFactory, JwtAuthMiddlewareService};
