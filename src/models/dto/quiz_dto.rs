use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Question, Quiz};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_index: Option<i32>,
    pub marks: i32,
}

impl QuestionDto {
    fn with_answer_key(question: Question) -> Self {
        QuestionDto {
            id: question.id,
            question_text: question.question_text,
            options: question.options,
            correct_option_index: Some(question.correct_option_index),
            marks: question.marks,
        }
    }

    fn without_answer_key(question: Question) -> Self {
        QuestionDto {
            correct_option_index: None,
            ..QuestionDto::with_answer_key(question)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_by: String,
    pub questions: Vec<QuestionDto>,
    pub total_marks: i32,
    pub exam_duration: i32,
    pub tab_switch_limit: i32,
    pub is_active: bool,
    pub url_slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizDto {
    /// Full view including the answer key, for admins.
    pub fn full(quiz: Quiz) -> Self {
        Self::build(quiz, QuestionDto::with_answer_key)
    }

    pub fn without_answer_key(quiz: Quiz) -> Self {
        Self::build(quiz, QuestionDto::without_answer_key)
    }

    fn build(quiz: Quiz, map_question: fn(Question) -> QuestionDto) -> Self {
        QuizDto {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            created_by: quiz.created_by,
            questions: quiz.questions.into_iter().map(map_question).collect(),
            total_marks: quiz.total_marks,
            exam_duration: quiz.exam_duration,
            tab_switch_limit: quiz.tab_switch_limit,
            is_active: quiz.is_active,
            url_slug: quiz.url_slug,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        }
    }
}

/// Public "take" view served to students before they start.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizForTaking {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub exam_duration: i32,
    pub tab_switch_limit: i32,
    pub total_marks: i32,
    pub questions: Vec<QuestionDto>,
}

impl From<Quiz> for QuizForTaking {
    fn from(quiz: Quiz) -> Self {
        QuizForTaking {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            exam_duration: quiz.exam_duration,
            tab_switch_limit: quiz.tab_switch_limit,
            total_marks: quiz.total_marks,
            questions: quiz
                .questions
                .into_iter()
                .map(QuestionDto::without_answer_key)
                .collect(),
        }
    }
}

/// Landing-page view for public links: no questions at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBySlugDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub total_marks: i32,
    pub exam_duration: i32,
    pub tab_switch_limit: i32,
    pub url_slug: String,
    pub question_count: usize,
}

impl From<Quiz> for QuizBySlugDto {
    fn from(quiz: Quiz) -> Self {
        QuizBySlugDto {
            question_count: quiz.questions.len(),
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            total_marks: quiz.total_marks,
            exam_duration: quiz.exam_duration,
            tab_switch_limit: quiz.tab_switch_limit,
            url_slug: quiz.url_slug,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummaryDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub total_marks: i32,
    pub exam_duration: i32,
    pub url_slug: String,
}

impl From<&Quiz> for QuizSummaryDto {
    fn from(quiz: &Quiz) -> Self {
        QuizSummaryDto {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            total_marks: quiz.total_marks,
            exam_duration: quiz.exam_duration,
            url_slug: quiz.url_slug.clone(),
        }
    }
}
