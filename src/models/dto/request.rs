use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::{quiz::DEFAULT_TAB_SWITCH_LIMIT, quiz_attempt::normalize_email, Question};

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn default_tab_switch_limit() -> i32 {
    DEFAULT_TAB_SWITCH_LIMIT
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[validate(
        length(min = 1, message = "Please provide question text"),
        custom(function = "validate_not_blank", message = "Please provide question text")
    )]
    pub question_text: String,

    #[validate(length(equal = 4, message = "There must be exactly 4 options"))]
    pub options: Vec<String>,

    #[validate(range(min = 0, max = 3, message = "Correct option index must be between 0 and 3"))]
    pub correct_option_index: i32,

    #[validate(range(min = 1, max = 1000, message = "Marks must be between 1 and 1000"))]
    pub marks: i32,
}

impl From<QuestionInput> for Question {
    fn from(input: QuestionInput) -> Self {
        Question::new(
            &input.question_text,
            input.options,
            input.correct_option_index,
            input.marks,
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(
        length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"),
        custom(function = "validate_not_blank", message = "Please provide a title for the quiz")
    )]
    pub title: String,

    #[validate(length(max = 500, message = "Description cannot be more than 500 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,

    #[validate(range(min = 1, message = "Exam duration must be at least 1 minute"))]
    pub exam_duration: i32,

    #[serde(default = "default_tab_switch_limit")]
    #[validate(range(min = 0, message = "Tab switch limit cannot be negative"))]
    pub tab_switch_limit: i32,

    pub is_active: Option<bool>,

    #[validate(length(min = 1, max = 120, message = "Slug must be between 1 and 120 characters"))]
    pub url_slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateQuizRequest {
    #[validate(
        length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"),
        custom(function = "validate_not_blank", message = "Please provide a title for the quiz")
    )]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Description cannot be more than 500 characters"))]
    pub description: Option<String>,

    #[validate(nested)]
    pub questions: Option<Vec<QuestionInput>>,

    #[validate(range(min = 1, message = "Exam duration must be at least 1 minute"))]
    pub exam_duration: Option<i32>,

    #[validate(range(min = 0, message = "Tab switch limit cannot be negative"))]
    pub tab_switch_limit: Option<i32>,

    pub is_active: Option<bool>,

    #[validate(length(min = 1, max = 120, message = "Slug must be between 1 and 120 characters"))]
    pub url_slug: Option<String>,
}

impl UpdateQuizRequest {
    /// True when the only field present is `isActive`.
    pub fn touches_only_active_flag(&self) -> bool {
        self.is_active.is_some()
            && self.title.is_none()
            && self.description.is_none()
            && self.questions.is_none()
            && self.exam_duration.is_none()
            && self.tab_switch_limit.is_none()
            && self.url_slug.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartAttemptRequest {
    #[validate(length(min = 1, message = "Please provide a quiz id"))]
    pub quiz_id: String,

    #[validate(
        length(min = 1, max = 100, message = "Please provide student name"),
        custom(function = "validate_not_blank", message = "Please provide student name")
    )]
    pub name: String,

    #[validate(email(message = "Please provide a valid student email"))]
    pub email: String,
}

impl StartAttemptRequest {
    /// Trimmed name and canonical email, as stored. Validate after this.
    pub fn normalized(self) -> Self {
        StartAttemptRequest {
            quiz_id: self.quiz_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: String,

    #[validate(range(min = 0, max = 3, message = "Selected option index must be between 0 and 3"))]
    pub selected_option_index: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(max = 2000, message = "Feedback cannot be more than 2000 characters"))]
    pub feedback: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 50, message = "Please provide a name"),
        custom(function = "validate_not_blank", message = "Please provide a name")
    )]
    pub name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Option<String>,

    pub admin_code: Option<String>,
}

impl RegisterRequest {
    pub fn normalized(self) -> Self {
        RegisterRequest {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            ..self
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide an email and password"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide an email and password"))]
    pub password: String,
}
