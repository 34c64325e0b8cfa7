use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, Request, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    middlewares::{admin_middleware, jwt_auth_middleware},
    state::AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);

    let manga_admin_route = Router::new()
        .route("/{id}/publish", post(crate::controllers::manga::publish))
        .route("/{id}/draft", post(crate::controllers::manga::draft))
        .layer(middleware::from_fn(admin_middleware));

    let manga_route = Router::new()
        .route(
            "/",
            get(crate::controllers::manga::index).post(crate::controllers::manga::store),
        )
        .route("/featured", get(crate::controllers::manga::featured))
        .route("/search", get(crate::controllers::manga::search))
        .route("/statistics", get(crate::controllers::manga::statistics))
        .route("/recent", get(crate::controllers::manga::recent))
        .route("/popular", get(crate::controllers::manga::popular))
        .route(
            "/by-status/{status}",
            get(crate::controllers::manga::by_status),
        )
        .route(
            "/by-rating/{rating}",
            get(crate::controllers::manga::by_rating),
        )
        .route("/by-author/{id}", get(crate::controllers::manga::by_author))
        .route("/by-tag/{id}", get(crate::controllers::manga::by_tag))
        .route(
            "/{id}",
            get(crate::controllers::manga::show)
                .put(crate::controllers::manga::update)
                .patch(crate::controllers::manga::update)
                .delete(crate::controllers::manga::destroy),
        )
        .route(
            "/{id}/follow",
            post(crate::controllers::manga::follow).delete(crate::controllers::manga::unfollow),
        )
        .merge(manga_admin_route)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let chapter_route = Router::new()
        .route(
            "/",
            get(crate::controllers::chapter::index).post(crate::controllers::chapter::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::chapter::show)
                .put(crate::controllers::chapter::update)
                .patch(crate::controllers::chapter::update)
                .delete(crate::controllers::chapter::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let author_route = Router::new()
        .route(
            "/",
            get(crate::controllers::author::index).post(crate::controllers::author::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::author::show)
                .put(crate::controllers::author::update)
                .patch(crate::controllers::author::update)
                .delete(crate::controllers::author::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let tag_route = Router::new()
        .route(
            "/",
            get(crate::controllers::tag::index).post(crate::controllers::tag::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::tag::show)
                .put(crate::controllers::tag::update)
                .patch(crate::controllers::tag::update)
                .delete(crate::controllers::tag::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let group_route = Router::new()
        .route(
            "/",
            get(crate::controllers::group::index).post(crate::controllers::group::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::group::show)
                .put(crate::controllers::group::update)
                .patch(crate::controllers::group::update)
                .delete(crate::controllers::group::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let cover_route = Router::new()
        .route(
            "/",
            get(crate::controllers::cover::index).post(crate::controllers::cover::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::cover::show)
                .put(crate::controllers::cover::update)
                .patch(crate::controllers::cover::update)
                .delete(crate::controllers::cover::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let list_route = Router::new()
        .route(
            "/",
            get(crate::controllers::list::index).post(crate::controllers::list::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::list::show)
                .put(crate::controllers::list::update)
                .patch(crate::controllers::list::update)
                .delete(crate::controllers::list::destroy),
        )
        .route(
            "/{id}/manga/{mangaId}",
            post(crate::controllers::list::add_manga)
                .delete(crate::controllers::list::remove_manga),
        )
        .route(
            "/{id}/follow",
            post(crate::controllers::list::follow).delete(crate::controllers::list::unfollow),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let report_route = Router::new()
        .route(
            "/",
            get(crate::controllers::report::index).post(crate::controllers::report::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::report::show)
                .put(crate::controllers::report::update)
                .patch(crate::controllers::report::update)
                .delete(crate::controllers::report::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let relation_route = Router::new()
        .route(
            "/",
            get(crate::controllers::relation::index).post(crate::controllers::relation::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::relation::show)
                .put(crate::controllers::relation::update)
                .patch(crate::controllers::relation::update)
                .delete(crate::controllers::relation::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let recommendation_route = Router::new()
        .route(
            "/",
            get(crate::controllers::recommendation::index)
                .post(crate::controllers::recommendation::store),
        )
        .route(
            "/{id}",
            get(crate::controllers::recommendation::show)
                .put(crate::controllers::recommendation::update)
                .patch(crate::controllers::recommendation::update)
                .delete(crate::controllers::recommendation::destroy),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    // Registration on the collection path stays public; the rest of the user
    // routes sit behind the jwt middleware like every other resource.
    let user_route = Router::new()
        .route(
            "/{id}",
            get(crate::controllers::user::show)
                .put(crate::controllers::user::update)
                .patch(crate::controllers::user::update)
                .delete(crate::controllers::user::destroy),
        )
        .route(
            "/{id}/follow",
            post(crate::controllers::user::follow).delete(crate::controllers::user::unfollow),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ))
        .route(
            "/",
            get(crate::controllers::user::index)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_middleware,
                ))
                .post(crate::controllers::user::store),
        );

    let api_route = Router::new()
        .route("/refresh", post(crate::controllers::auth::refresh))
        .route("/me", get(crate::controllers::me::index))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ))
        .route("/login", post(crate::controllers::auth::login))
        .route("/logout", post(crate::controllers::auth::logout))
        .nest("/manga", manga_route)
        .nest("/chapters", chapter_route)
        .nest("/authors", author_route)
        .nest("/tags", tag_route)
        .nest("/groups", group_route)
        .nest("/covers", cover_route)
        .nest("/lists", list_route)
        .nest("/reports", report_route)
        .nest("/users", user_route)
        .nest("/relations", relation_route)
        .nest("/recommendations", recommendation_route);

    let app = Router::new()
        .route("/", get(crate::controllers::home::index))
        .nest("/api", api_route);

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = match request.headers().get(REQUEST_ID_HEADER) {
                    Some(val) => val.to_str().unwrap(),
                    None => "",
                };
                let user_agent = match request.headers().get(header::USER_AGENT) {
                    Some(val) => val.to_str().unwrap(),
                    None => "",
                };

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.layer(CompressionLayer::new())
        .layer(request_id_middleware)
        .with_state(state)
}
