#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use examly_server::{
    app_state::AppState,
    auth::Claims,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{quiz_attempt::AttemptStatus, Question, Quiz, QuizAttempt, Role, User},
    repositories::{QuizAttemptRepository, QuizRepository, UserRepository},
};

pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self {
            quizzes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.contains_key(&quiz.id) {
            return Err(AppError::AlreadyExists("Duplicate value for field(s): id".to_string()));
        }
        if quizzes.values().any(|q| q.url_slug == quiz.url_slug) {
            return Err(AppError::AlreadyExists(
                "Duplicate value for field(s): url_slug".to_string(),
            ));
        }

        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(ids.iter().filter_map(|id| quizzes.get(id).cloned()).collect())
    }

    async fn find_active_by_slug(&self, slug: &str) -> AppResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .values()
            .find(|q| q.url_slug == slug && q.is_active)
            .cloned())
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Quiz>> {
        let quizzes = self.quizzes.read().await;
        let mut items: Vec<Quiz> = quizzes
            .values()
            .filter(|q| !active_only || q.is_active)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if !quizzes.contains_key(&quiz.id) {
            return Err(AppError::NotFound(format!("Quiz not found with id of {}", quiz.id)));
        }

        quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.quizzes
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Quiz not found with id of {}", id)))
    }
}

/// Mirrors the Mongo repository, including the open-attempt unique index
/// and the open-only conditional writes.
pub struct InMemoryQuizAttemptRepository {
    attempts: Arc<RwLock<HashMap<String, QuizAttempt>>>,
}

impl InMemoryQuizAttemptRepository {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn newest_first(mut items: Vec<QuizAttempt>) -> Vec<QuizAttempt> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let mut attempts = self.attempts.write().await;
        if attempts.contains_key(&attempt.id) {
            return Err(AppError::AlreadyExists("Duplicate value for field(s): id".to_string()));
        }

        let open_duplicate = attempt.status == AttemptStatus::Open
            && attempts.values().any(|a| {
                a.status == AttemptStatus::Open
                    && a.quiz_id == attempt.quiz_id
                    && a.student_email == attempt.student_email
            });
        if open_duplicate {
            return Err(AppError::AlreadyExists(
                "Duplicate value for field(s): quiz_id".to_string(),
            ));
        }

        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        Ok(self.attempts.read().await.get(id).cloned())
    }

    async fn find_open(&self, quiz_id: &str, student_email: &str) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .find(|a| {
                a.status == AttemptStatus::Open
                    && a.quiz_id == quiz_id
                    && a.student_email == student_email
            })
            .cloned())
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(newest_first(
            attempts.values().filter(|a| a.quiz_id == quiz_id).cloned().collect(),
        ))
    }

    async fn list_for_student(&self, user_id: &str, email: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(newest_first(
            attempts
                .values()
                .filter(|a| a.student_user_id.as_deref() == Some(user_id) || a.student_email == email)
                .cloned()
                .collect(),
        ))
    }

    async fn count_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let attempts = self.attempts.read().await;
        Ok(attempts.values().filter(|a| a.quiz_id == quiz_id).count() as u64)
    }

    async fn increment_tab_switch(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let mut attempts = self.attempts.write().await;
        Ok(attempts
            .get_mut(id)
            .filter(|a| a.status == AttemptStatus::Open)
            .map(|a| {
                a.tab_switch_count += 1;
                a.clone()
            }))
    }

    async fn close(&self, attempt: &QuizAttempt) -> AppResult<bool> {
        let mut attempts = self.attempts.write().await;
        match attempts.get_mut(&attempt.id) {
            Some(stored) if stored.status == AttemptStatus::Open => {
                // Same field set as the Mongo `$set`.
                stored.answers = attempt.answers.clone();
                stored.score = attempt.score;
                stored.end_time = attempt.end_time;
                stored.time_spent = attempt.time_spent;
                stored.status = attempt.status;
                stored.is_terminated_due_to_tab_switch = attempt.is_terminated_due_to_tab_switch;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_feedback(&self, id: &str, feedback: &str) -> AppResult<Option<QuizAttempt>> {
        let mut attempts = self.attempts.write().await;
        Ok(attempts.get_mut(id).map(|a| {
            a.feedback = Some(feedback.to_string());
            a.clone()
        }))
    }
}

pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists(
                "Duplicate value for field(s): email".to_string(),
            ));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.role == Role::Admin))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("User '{}' not found", user.email)));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

pub struct TestRepositories {
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub attempts: Arc<InMemoryQuizAttemptRepository>,
    pub users: Arc<InMemoryUserRepository>,
}

impl TestRepositories {
    pub fn new() -> Self {
        Self {
            quizzes: Arc::new(InMemoryQuizRepository::new()),
            attempts: Arc::new(InMemoryQuizAttemptRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState::from_repositories(
            Config::test_config(),
            self.quizzes.clone(),
            self.attempts.clone(),
            self.users.clone(),
            None,
        )
    }
}

pub fn make_question(text: &str, correct_option_index: i32, marks: i32) -> Question {
    Question::new(
        text,
        vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_option_index,
        marks,
    )
}

pub fn make_quiz(title: &str, created_by: &str, tab_switch_limit: i32) -> Quiz {
    Quiz::new(
        title,
        Some(format!("{} description", title)),
        created_by,
        vec![
            make_question("First", 2, 5),
            make_question("Second", 0, 3),
            make_question("Third", 1, 2),
        ],
        10,
        tab_switch_limit,
        &format!("{}-slug", title.to_lowercase().replace(' ', "-")),
    )
}

pub fn make_user(name: &str, role: Role) -> User {
    User::new(
        name,
        &format!("{}@example.com", name.to_lowercase()),
        "not-a-real-hash".to_string(),
        role,
    )
}

pub fn claims_for(user: &User) -> Claims {
    Claims::new(user, 1)
}
