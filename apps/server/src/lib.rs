pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use hsk_core::{accounts, OrderingBank, UserStore, Vocabulary};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::{DbError, SqliteRepository};
use crate::error::{ApiError, Result};
use crate::services::generator::{ExerciseGenerator, GeminiClient};
use crate::services::quiz_sessions::QuizSessions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Mutex<SqliteRepository>>,
    pub vocabulary: Arc<Vocabulary>,
    pub ordering: Arc<OrderingBank>,
    pub quizzes: Arc<QuizSessions>,
    pub generator: Option<Arc<dyn ExerciseGenerator>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        repo: SqliteRepository,
        vocabulary: Vocabulary,
        ordering: OrderingBank,
        config: Config,
        generator: Option<Arc<dyn ExerciseGenerator>>,
    ) -> Self {
        Self {
            repo: Arc::new(Mutex::new(repo)),
            vocabulary: Arc::new(vocabulary),
            ordering: Arc::new(ordering),
            quizzes: Arc::new(QuizSessions::new()),
            generator,
            config: Arc::new(config),
        }
    }

    /// Lock the repository. Do not hold the guard across an `.await`.
    pub fn repo(&self) -> Result<MutexGuard<'_, SqliteRepository>> {
        self.repo
            .lock()
            .map_err(|_| ApiError::Database(DbError::Poisoned))
    }

    pub fn generator(&self) -> Result<&dyn ExerciseGenerator> {
        self.generator
            .as_deref()
            .ok_or(ApiError::GenerationUnavailable)
    }

    pub fn admin_username(&self) -> &str {
        &self.config.admin_username
    }
}

/// Build the full router.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Account routes
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/account", get(routes::account::get))
        .route("/api/account/password", put(routes::account::change_password))
        .route(
            "/api/account/devices/:device_id",
            delete(routes::account::deregister_device),
        )
        // Vocabulary routes
        .route("/api/levels", get(routes::vocabulary::levels))
        .route(
            "/api/levels/:level/lessons/:lesson",
            get(routes::vocabulary::lesson),
        )
        .route("/api/search", get(routes::vocabulary::search))
        .route(
            "/api/search/recent",
            get(routes::vocabulary::recent)
                .post(routes::vocabulary::record_recent)
                .delete(routes::vocabulary::clear_recent),
        )
        // Progress routes
        .route("/api/progress", get(routes::progress::get))
        .route("/api/progress/mastery", post(routes::progress::update_mastery))
        .route("/api/progress/levels/:level", get(routes::progress::level_summary))
        // Activity routes
        .route(
            "/api/activity",
            get(routes::activity::history).post(routes::activity::log),
        )
        // Quiz routes
        .route("/api/quiz/matching", post(routes::quiz::start_matching))
        .route("/api/quiz/matching/:id/select", post(routes::quiz::select))
        .route("/api/quiz/matching/:id/advance", post(routes::quiz::advance))
        .route("/api/quiz/choice", post(routes::quiz::choice))
        .route("/api/quiz/building", post(routes::quiz::building))
        // Practice routes
        .route("/api/practice/exercise", post(routes::practice::exercise))
        .route("/api/practice/feedback", post(routes::practice::feedback))
        .route("/api/practice/essay", post(routes::practice::essay))
        .route("/api/practice/ordering/:id", post(routes::practice::check_ordering))
        // Admin routes
        .route("/api/admin/users", get(routes::admin::list_users))
        .route(
            "/api/admin/users/:username",
            put(routes::admin::update_user).delete(routes::admin::delete_user),
        )
        .route("/api/admin/activity", get(routes::admin::all_activity_log))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn load_vocabulary(config: &Config) -> anyhow::Result<Vocabulary> {
    match &config.vocabulary_path {
        Some(path) => {
            tracing::info!("Loading vocabulary from {}", path);
            let json = std::fs::read_to_string(path)?;
            Ok(Vocabulary::from_json(&json)?)
        }
        None => Ok(Vocabulary::bundled()?),
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load();

    tracing::info!("Opening database at {}...", config.database_path);
    let repo = SqliteRepository::open(&config.database_path)?;

    match &config.admin_password {
        Some(password) => {
            accounts::ensure_admin(&repo, &config.admin_username, password, Utc::now())?;
        }
        None if repo.get_user(&config.admin_username)?.is_none() => {
            tracing::warn!(
                "ADMIN_PASSWORD not set and no '{}' account exists; admin routes are unavailable",
                config.admin_username
            );
        }
        None => {}
    }

    let vocabulary = load_vocabulary(&config)?;
    let ordering = OrderingBank::bundled()?;
    tracing::info!("Loaded {} sentence-ordering exercises", ordering.len());

    let generator: Option<Arc<dyn ExerciseGenerator>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(key.clone(), config.gemini_model.clone()))),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, practice generation disabled");
            None
        }
    };

    let addr = config.addr();
    let state = AppState::new(repo, vocabulary, ordering, config, generator);
    let app = app(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
