//! Role and ownership rules for quizzes and attempts.
//!
//! Every rule matches on [`Role`] exhaustively so adding a role forces a
//! decision here.

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::{Quiz, QuizAttempt, Role},
};

pub fn is_admin(role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::Student => false,
    }
}

pub fn require_admin(claims: &Claims) -> AppResult<()> {
    match claims.role {
        Role::Admin => Ok(()),
        Role::Student => Err(AppError::Unauthorized(
            "User role student is not authorized to access this route".to_string(),
        )),
    }
}

/// Inactive quizzes are hidden from everyone but admins.
pub fn can_view_inactive_quizzes(role: Role) -> bool {
    is_admin(role)
}

/// Whether the caller receives `correctOptionIndex` in quiz payloads.
pub fn can_see_answer_key(role: Role) -> bool {
    is_admin(role)
}

/// Owner first, then any admin, then the admin who authored the quiz.
pub fn can_view_attempt(claims: &Claims, attempt: &QuizAttempt, quiz: Option<&Quiz>) -> bool {
    if attempt.belongs_to(&claims.sub, &claims.email) {
        return true;
    }

    is_admin(claims.role) || quiz.is_some_and(|quiz| is_quiz_owner_admin(claims, quiz))
}

pub fn can_view_quiz_attempts(claims: &Claims, quiz: &Quiz) -> bool {
    quiz.created_by == claims.sub || is_admin(claims.role)
}

pub fn can_manage_quiz(claims: &Claims, quiz: &Quiz) -> bool {
    match claims.role {
        Role::Admin => true,
        Role::Student => quiz.created_by == claims.sub,
    }
}

fn is_quiz_owner_admin(claims: &Claims, quiz: &Quiz) -> bool {
    match claims.role {
        Role::Admin => quiz.created_by == claims.sub,
        Role::Student => false,
    }
}
