use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router {
    let auth = auth_routes();
    let public_read = public_read_routes();
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: register, login.
fn auth_routes() -> Router {
    Router::new()
        .route("/register", routing::post(handlers::register))
        .route("/login", routing::post(handlers::login))
}

/// Public read routes.
fn public_read_routes() -> Router {
    Router::new()
        // Posts
        .route("/posts", routing::get(handlers::post::list_posts))
        .route("/posts/{id}", routing::get(handlers::post::get_post))
        // Comments
        .route(
            "/posts/{id}/comments",
            routing::get(handlers::comment::list_comments),
        )
        // Users
        .route(
            "/users/{id}",
            routing::get(handlers::user::get_user_profile),
        )
        // Follow (public reads)
        .route(
            "/users/{id}/followers",
            routing::get(handlers::follow::list_followers),
        )
        .route(
            "/users/{id}/following",
            routing::get(handlers::follow::list_following),
        )
}

/// Protected routes: everything that needs a verified caller.
fn protected_routes() -> Router {
    Router::new()
        .route("/me", routing::get(handlers::get_current_user))
        // Posts
        .route("/posts", routing::post(handlers::post::create_post))
        .route(
            "/posts/{id}",
            routing::put(handlers::post::update_post).delete(handlers::post::delete_post),
        )
        // Votes
        .route(
            "/posts/{id}/vote",
            routing::post(handlers::vote::vote_post).get(handlers::vote::get_vote),
        )
        // Comments
        .route(
            "/posts/{id}/comments",
            routing::post(handlers::comment::create_comment),
        )
        .route(
            "/comments/{id}",
            routing::put(handlers::comment::update_comment)
                .delete(handlers::comment::delete_comment),
        )
        // Users
        .route("/users/{id}", routing::put(handlers::user::update_user))
        // Follow
        .route(
            "/users/{id}/follow",
            routing::post(handlers::follow::follow_user).delete(handlers::follow::unfollow_user),
        )
}
