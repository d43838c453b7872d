use agora::{config, migration, routes, utils};
use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        agora::handlers::register,
        agora::handlers::login,
        agora::handlers::get_current_user,
        // User routes
        agora::handlers::user::get_user_profile,
        agora::handlers::user::update_user,
        // Post routes
        agora::handlers::post::list_posts,
        agora::handlers::post::get_post,
        agora::handlers::post::create_post,
        agora::handlers::post::update_post,
        agora::handlers::post::delete_post,
        // Comment routes
        agora::handlers::comment::list_comments,
        agora::handlers::comment::create_comment,
        agora::handlers::comment::update_comment,
        agora::handlers::comment::delete_comment,
        // Vote routes
        agora::handlers::vote::vote_post,
        agora::handlers::vote::get_vote,
        // Follow routes
        agora::handlers::follow::follow_user,
        agora::handlers::follow::unfollow_user,
        agora::handlers::follow::list_followers,
        agora::handlers::follow::list_following,
    ),
    components(
        schemas(
            agora::response::ApiResponse<serde_json::Value>,
            agora::error::AppError,
            // Auth
            agora::handlers::auth::RegisterRequest,
            agora::handlers::auth::LoginRequest,
            agora::handlers::auth::AuthResponse,
            agora::handlers::auth::UserResponse,
            // User
            agora::handlers::user::PublicUserResponse,
            agora::handlers::user::UserProfileResponse,
            agora::handlers::user::UpdateUserRequest,
            // Post
            agora::handlers::post::AuthorSummary,
            agora::handlers::post::PostResponse,
            agora::handlers::post::CreatePostRequest,
            agora::handlers::post::UpdatePostRequest,
            // Comment
            agora::handlers::comment::CommentResponse,
            agora::handlers::comment::CreateCommentRequest,
            agora::handlers::comment::UpdateCommentRequest,
            // Vote
            agora::handlers::vote::VoteRequest,
            agora::handlers::vote::VoteResponse,
            agora::handlers::vote::VoteStateResponse,
            agora::services::vote::VoteOutcome,
            // Follow
            agora::handlers::follow::FollowResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication operations"),
        (name = "users", description = "User profile operations"),
        (name = "posts", description = "Post management operations"),
        (name = "comments", description = "Comment management operations"),
        (name = "votes", description = "Voting operations"),
        (name = "follows", description = "Follow operations"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    init_tracing();

    // Validate configuration before doing anything else
    let (jwt_config, db_config) = validate_config()?;

    utils::jwt::init_jwt_config(jwt_config)?;
    config::database::init_query_timeout(db_config.query_timeout);

    tracing::info!("Starting Agora API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::connect(&db_config).await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app().layer(Extension(db.clone()));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db.close().await?;
    tracing::info!("Server shut down gracefully");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agora=debug,tower_http=debug,axum=debug".into());

    let json = env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<(
    config::jwt::JwtConfig,
    config::database::DatabaseConfig,
)> {
    let jwt_config = config::jwt::JwtConfig::from_env()?;
    let db_config = config::database::DatabaseConfig::from_env()?;

    Ok((jwt_config, db_config))
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer()),
        )
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Agora API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
