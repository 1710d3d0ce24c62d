use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    domain::{Answer, AttemptStatus, Quiz, QuizAttempt},
    dto::quiz_dto::QuizSummaryDto,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDto {
    pub question_id: String,
    pub selected_option_index: i32,
    pub is_correct: bool,
    pub marks_awarded: i32,
}

impl From<Answer> for AnswerDto {
    fn from(answer: Answer) -> Self {
        AnswerDto {
            question_id: answer.question_id,
            selected_option_index: answer.selected_option_index,
            is_correct: answer.is_correct,
            marks_awarded: answer.marks_awarded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptDto {
    pub id: String,
    pub quiz_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizSummaryDto>,
    pub student_name: String,
    pub student_email: String,
    pub student_user_id: Option<String>,
    pub score: i32,
    pub max_score: i32,
    pub tab_switch_count: i32,
    pub tab_switch_limit: i32,
    pub is_terminated_due_to_tab_switch: bool,
    pub status: AttemptStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub time_spent: i64,
    pub answers: Vec<AnswerDto>,
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl AttemptDto {
    /// Attaches the quiz summary and, for open attempts, the advisory countdown.
    pub fn with_quiz(attempt: QuizAttempt, quiz: &Quiz, now: DateTime<Utc>) -> Self {
        let remaining_seconds = attempt
            .is_open()
            .then(|| attempt.remaining_seconds(quiz.exam_duration, now));

        AttemptDto {
            quiz: Some(QuizSummaryDto::from(quiz)),
            remaining_seconds,
            ..AttemptDto::from(attempt)
        }
    }
}

impl From<QuizAttempt> for AttemptDto {
    fn from(attempt: QuizAttempt) -> Self {
        AttemptDto {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            quiz: None,
            student_name: attempt.student_name,
            student_email: attempt.student_email,
            student_user_id: attempt.student_user_id,
            score: attempt.score,
            max_score: attempt.max_score,
            tab_switch_count: attempt.tab_switch_count,
            tab_switch_limit: attempt.tab_switch_limit,
            is_terminated_due_to_tab_switch: attempt.is_terminated_due_to_tab_switch,
            status: attempt.status,
            start_time: attempt.start_time,
            end_time: attempt.end_time,
            time_spent: attempt.time_spent,
            answers: attempt.answers.into_iter().map(AnswerDto::from).collect(),
            feedback: attempt.feedback,
            remaining_seconds: None,
            created_at: attempt.created_at,
        }
    }
}
