use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::Question;

pub const DEFAULT_TAB_SWITCH_LIMIT: i32 = 3;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: String, // user id of the authoring admin
    pub questions: Vec<Question>,
    pub total_marks: i32,   // derived, see recompute_total_marks
    pub exam_duration: i32, // minutes
    pub tab_switch_limit: i32,
    pub is_active: bool,
    pub url_slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sum of `marks`, or `None` if it overflows.
pub fn checked_total_marks(marks: impl IntoIterator<Item = i32>) -> Option<i32> {
    marks.into_iter().try_fold(0i32, i32::checked_add)
}

impl Quiz {
    pub fn new(
        title: &str,
        description: Option<String>,
        created_by: &str,
        questions: Vec<Question>,
        exam_duration: i32,
        tab_switch_limit: i32,
        url_slug: &str,
    ) -> Self {
        let now = Utc::now();
        let mut quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            created_by: created_by.to_string(),
            questions,
            total_marks: 0,
            exam_duration,
            tab_switch_limit,
            is_active: true,
            url_slug: url_slug.to_string(),
            created_at: now,
            updated_at: now,
        };
        quiz.recompute_total_marks();
        quiz
    }

    /// Must run after every change to `questions`. Saturates at `i32::MAX`;
    /// callers reject such question sets through [`checked_total_marks`] first.
    pub fn recompute_total_marks(&mut self) {
        self.total_marks = checked_total_marks(self.questions.iter().map(|q| q.marks)).unwrap_or(i32::MAX);
    }

    pub fn replace_questions(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.recompute_total_marks();
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
