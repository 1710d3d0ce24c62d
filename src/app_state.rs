use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuizAttemptRepository, MongoQuizRepository, MongoUserRepository, QuizAttemptRepository,
        QuizRepository, UserRepository,
    },
    services::{AuthService, QuizAttemptService, QuizService},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub attempt_service: Arc<QuizAttemptService>,
    pub auth_service: Arc<AuthService>,
    pub jwt_service: Arc<JwtService>,
    pub config: Arc<Config>,
    /// `None` when running on non-Mongo repositories (tests).
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db, &config.quizzes_collection));
        quiz_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoQuizAttemptRepository::new(&db, &config.attempts_collection));
        attempt_repository.ensure_indexes().await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db, &config.users_collection));
        user_repository.ensure_indexes().await?;

        Ok(Self::from_repositories(
            config,
            quiz_repository,
            attempt_repository,
            user_repository,
            Some(db),
        ))
    }

    pub fn from_repositories(
        config: Config,
        quiz_repository: Arc<dyn QuizRepository>,
        attempt_repository: Arc<dyn QuizAttemptRepository>,
        user_repository: Arc<dyn UserRepository>,
        db: Option<Database>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiration_hours));

        let quiz_service = Arc::new(QuizService::new(
            quiz_repository.clone(),
            attempt_repository.clone(),
        ));
        let attempt_service = Arc::new(QuizAttemptService::new(attempt_repository, quiz_repository));
        let auth_service = Arc::new(AuthService::new(
            user_repository,
            jwt_service.clone(),
            config.admin_signup_code.clone(),
        ));

        Self {
            quiz_service,
            attempt_service,
            auth_service,
            jwt_service,
            config: Arc::new(config),
            db,
        }
    }
}
