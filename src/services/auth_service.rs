use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use validator::Validate;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        Claims, JwtService,
    },
    errors::{AppError, AppResult},
    models::{
        domain::{quiz_attempt::normalize_email, Role, User},
        dto::request::{LoginRequest, RegisterRequest},
    },
    repositories::UserRepository,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A freshly issued session: the user and their signed token.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    admin_signup_code: Option<SecretString>,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        admin_signup_code: Option<SecretString>,
    ) -> Self {
        Self {
            repository,
            jwt_service,
            admin_signup_code,
        }
    }

    /// Registers a user. `forced_role` overrides whatever role the body asks for.
    pub async fn register(&self, request: RegisterRequest, forced_role: Option<Role>) -> AppResult<Session> {
        let request = request.normalized();
        request.validate()?;

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }

        let role = match (forced_role, request.role.as_deref()) {
            (Some(role), _) => role,
            (None, None) => Role::Student,
            (None, Some(requested)) => Role::parse(requested)
                .ok_or_else(|| AppError::ValidationError("Invalid role".to_string()))?,
        };

        match role {
            Role::Admin => self.authorize_admin_signup(request.admin_code.as_deref()).await?,
            Role::Student => {}
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .repository
            .create(User::new(&request.name, &request.email, password_hash, role))
            .await?;
        log::info!("Registered {} as {}", user.email, user.role.as_str());

        self.issue_session(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<Session> {
        request.validate()?;

        let user = self
            .repository
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            log::debug!("Password mismatch for {}", user.email);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.issue_session(user)
    }

    pub async fn current_user(&self, claims: &Claims) -> AppResult<User> {
        self.repository
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// With a configured code the code must match; without one only the first admin may sign up.
    async fn authorize_admin_signup(&self, provided_code: Option<&str>) -> AppResult<()> {
        match &self.admin_signup_code {
            Some(expected) => {
                if provided_code != Some(expected.expose_secret()) {
                    return Err(AppError::Forbidden(
                        "Invalid or missing admin access code".to_string(),
                    ));
                }
            }
            None => {
                if self.repository.admin_exists().await? {
                    return Err(AppError::Forbidden(
                        "Admin creation is restricted. Set ADMIN_SIGNUP_CODE in environment."
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn issue_session(&self, user: User) -> AppResult<Session> {
        let token = self.jwt_service.create_token(&user)?;
        Ok(Session { user, token })
    }
}
