pub mod admin;
pub mod jwt_auth;

pub use admin::admin_middleware;
pub use jwt_auth::jwt_auth_middleware;
