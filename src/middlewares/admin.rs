use std::sync::Arc;

use axum::{Extension, body::Body, extract::Request, middleware::Next, response::Response};

use crate::{error::Error, model::User};

/// Gate for routes only administrators may reach. Runs after the jwt
/// middleware, which put the authenticated user into the extensions.
#[tracing::instrument(name = "[MIDDLEWARE] require admin", skip_all, fields(user_id = %user.id))]
pub async fn admin_middleware(
    Extension(user): Extension<Arc<User>>,
    req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    Ok(next.run(req).await)
}
