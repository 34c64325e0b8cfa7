use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{decode_jwt, error::AuthError},
    db::user::get_user_by_id_optional,
    error::Error,
    state::SharedAppState,
};

fn bearer_token(req: &Request) -> Result<String, Error> {
    let auth_header = match req.headers().get(axum::http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|e| Error::Other(e.into()))?,
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    let mut parts = auth_header.split_whitespace();
    let (scheme_option, token_option) = (parts.next(), parts.next());

    let scheme = match scheme_option {
        Some(value) => value.to_lowercase(),
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    if scheme != *"bearer" {
        return Err(Error::Auth(AuthError::Unauthenticated));
    }

    match token_option {
        Some(value) => Ok(value.to_string()),
        None => Err(Error::Auth(AuthError::Unauthenticated)),
    }
}

/// Resolves the bearer token to a fresh user record and stores it as an
/// extension. Role and existence checks downstream see the current state
/// of the user, not the state captured in the token.
#[tracing::instrument(name = "[MIDDLEWARE] jwt auth", skip_all)]
pub async fn jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let token = bearer_token(&req)?;

    let token_data = decode_jwt(token, &app_state.config.jwt)
        .map_err(|_| Error::Auth(AuthError::Unauthenticated))?;

    let user_optional = get_user_by_id_optional(&app_state.pool, token_data.claims.user_id).await?;
    let user = match user_optional {
        Some(user) => Arc::new(user),
        None => {
            return Err(Error::Auth(AuthError::Unauthenticated));
        }
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
