pub mod api;
pub mod auth;
pub mod authoring;
pub mod config;
pub mod database;
pub mod error;
pub mod grading;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod policy;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the full application router. Shared by the server binary and the
/// integration tests.
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        // Quiz resources
        .merge(quiz_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn quiz_routes() -> Router {
    use handlers::{favorites, notes, questions, ratings, titles};

    Router::new()
        .route(
            "/api/quiz/titles",
            get(titles::list).post(titles::create),
        )
        .route(
            "/api/quiz/titles/:id",
            get(titles::retrieve)
                .put(titles::update)
                .patch(titles::patch)
                .delete(titles::destroy),
        )
        .route("/api/quiz/titles/:id/questions", get(titles::list_questions))
        .route(
            "/api/quiz/questions",
            get(questions::list).post(questions::create),
        )
        .route(
            "/api/quiz/questions/:id",
            get(questions::retrieve)
                .put(questions::update)
                .patch(questions::patch)
                .delete(questions::destroy),
        )
        .route("/api/quiz/questions/:id/check", post(questions::check))
        .route(
            "/api/quiz/questions/:id/note",
            get(questions::note_get)
                .post(questions::note_post)
                .put(questions::note_put)
                .patch(questions::note_patch)
                .delete(questions::note_delete),
        )
        .route(
            "/api/quiz/favorites/titles",
            get(favorites::list_titles).post(favorites::create_title),
        )
        .route(
            "/api/quiz/favorites/titles/:id",
            get(favorites::retrieve_title).delete(favorites::destroy_title),
        )
        .route(
            "/api/quiz/favorites/questions",
            get(favorites::list_questions).post(favorites::create_question),
        )
        .route(
            "/api/quiz/favorites/questions/:id",
            get(favorites::retrieve_question).delete(favorites::destroy_question),
        )
        .route(
            "/api/quiz/ratings",
            get(ratings::list).post(ratings::create),
        )
        .route(
            "/api/quiz/ratings/:id",
            get(ratings::retrieve)
                .put(ratings::update)
                .patch(ratings::patch)
                .delete(ratings::destroy),
        )
        .route("/api/quiz/notes", get(notes::list))
        .route(
            "/api/quiz/notes/:id",
            get(notes::retrieve)
                .put(notes::update)
                .patch(notes::patch)
                .delete(notes::destroy),
        )
}

fn cors_layer() -> CorsLayer {
    let origins = &config::config().security.cors_origins;
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "QuizDeck API",
            "version": version,
            "description": "Quiz authoring and solving backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public), /api/auth/whoami (protected)",
                "titles": "/api/quiz/titles[/:id], /api/quiz/titles/:id/questions",
                "questions": "/api/quiz/questions[/:id], /api/quiz/questions/:id/check, /api/quiz/questions/:id/note",
                "favorites": "/api/quiz/favorites/titles[/:id], /api/quiz/favorites/questions[/:id]",
                "ratings": "/api/quiz/ratings[/:id]",
                "notes": "/api/quiz/notes[/:id]",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
