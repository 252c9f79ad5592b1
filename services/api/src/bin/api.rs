//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, OpenAiTextAdapter},
    config::Config,
    error::ApiError,
    web::{classes, feedback, guides, middleware::require_auth, quizzes, remediation, state::AppState, ApiDoc},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let llm = Arc::new(OpenAiTextAdapter::new(
        openai_client.clone(),
        config.generation_model.clone(),
    ));
    let feedback_llm = Arc::new(OpenAiTextAdapter::new(
        openai_client.clone(),
        config.feedback_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        llm,
        feedback_llm,
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("invalid CORS_ORIGIN: {e}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Every workflow operation requires an authenticated principal.
    let protected_routes = Router::new()
        .route("/classes", post(classes::create_class_handler))
        .route("/classes/{class_id}", get(classes::class_detail_handler))
        .route("/classes/guide/generate", post(guides::generate_guide_handler))
        .route("/classes/guide/approve", post(guides::approve_guide_handler))
        .route("/quizzes/generate", post(quizzes::generate_quiz_handler))
        .route("/quizzes/publish", post(quizzes::publish_quiz_handler))
        .route("/quizzes/reading", post(quizzes::edit_reading_handler))
        .route(
            "/quizzes/questions/regenerate",
            post(quizzes::regenerate_questions_handler),
        )
        .route("/questions/edit", post(quizzes::edit_question_handler))
        .route("/questions/modify", post(quizzes::modify_question_handler))
        .route(
            "/classes/pre-quiz/analyze",
            post(remediation::process_pre_quiz_handler),
        )
        .route(
            "/classes/recommendations/apply",
            post(remediation::apply_recommendations_handler),
        )
        .route(
            "/classes/feedback/generate",
            post(feedback::generate_feedback_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
