use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz::Quiz;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Open,
    Submitted,
    Terminated,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Open => "open",
            AttemptStatus::Submitted => "submitted",
            AttemptStatus::Terminated => "terminated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Answer {
    pub question_id: String,
    pub selected_option_index: i32,
    pub is_correct: bool,
    pub marks_awarded: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub quiz_id: String,
    pub student_name: String,
    pub student_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_user_id: Option<String>,
    pub score: i32,
    pub max_score: i32,
    pub tab_switch_count: i32,
    pub tab_switch_limit: i32,
    pub is_terminated_due_to_tab_switch: bool,
    // Stored so the open-attempt unique index can filter on it.
    pub status: AttemptStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub time_spent: i64, // seconds
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl QuizAttempt {
    /// Opens a new attempt, snapshotting the quiz's scoring and tab-switch policy.
    pub fn start(quiz: &Quiz, student_name: &str, student_email: &str, student_user_id: Option<String>) -> Self {
        let now = Utc::now();
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz.id.clone(),
            student_name: student_name.trim().to_string(),
            student_email: normalize_email(student_email),
            student_user_id,
            score: 0,
            max_score: quiz.total_marks,
            tab_switch_count: 0,
            tab_switch_limit: quiz.tab_switch_limit,
            is_terminated_due_to_tab_switch: false,
            status: AttemptStatus::Open,
            start_time: now,
            end_time: None,
            time_spent: 0,
            answers: Vec::new(),
            feedback: None,
            created_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none() && !self.is_terminated_due_to_tab_switch
    }

    pub fn exceeds_tab_switch_limit(&self) -> bool {
        self.tab_switch_count > self.tab_switch_limit
    }

    /// Recomputes `status` and `time_spent`; called before every write.
    pub fn refresh_derived(&mut self) {
        self.status = if self.is_terminated_due_to_tab_switch {
            AttemptStatus::Terminated
        } else if self.end_time.is_some() {
            AttemptStatus::Submitted
        } else {
            AttemptStatus::Open
        };

        if let Some(end_time) = self.end_time {
            self.time_spent = (end_time - self.start_time).num_seconds().max(0);
        }
    }

    pub fn terminate_for_tab_switching(&mut self, now: DateTime<Utc>) {
        self.is_terminated_due_to_tab_switch = true;
        self.score = 0;
        self.end_time = Some(now);
        self.refresh_derived();
    }

    pub fn submit(&mut self, score: i32, answers: Vec<Answer>, now: DateTime<Utc>) {
        self.answers = answers;
        self.score = score;
        self.end_time = Some(now);
        self.refresh_derived();
    }

    /// Advisory only; the server does not close attempts when the timer runs out.
    pub fn remaining_seconds(&self, exam_duration_minutes: i32, now: DateTime<Utc>) -> i64 {
        if !self.is_open() {
            return 0;
        }
        let elapsed = (now - self.start_time).num_seconds();
        (i64::from(exam_duration_minutes) * 60 - elapsed).max(0)
    }

    pub fn belongs_to(&self, user_id: &str, email: &str) -> bool {
        self.student_user_id.as_deref() == Some(user_id) || self.student_email == normalize_email(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::question::Question;
    use chrono::Duration;

    fn quiz(limit: i32) -> Quiz {
        Quiz::new(
            "Sample",
            None,
            "admin-1",
            vec![Question::new(
                "2 + 2?",
                vec!["1".into(), "2".into(), "3".into(), "4".into()],
                3,
                2,
            )],
            10,
            limit,
            "sample-abc",
        )
    }

    #[test]
    fn start_copies_policy_and_normalizes_email() {
        let attempt = QuizAttempt::start(&quiz(2), " Ada ", "  Ada@Example.COM ", None);

        assert_eq!(attempt.student_name, "Ada");
        assert_eq!(attempt.student_email, "ada@example.com");
        assert_eq!(attempt.max_score, 2);
        assert_eq!(attempt.tab_switch_limit, 2);
        assert_eq!(attempt.status, AttemptStatus::Open);
        assert!(attempt.is_open());
    }

    #[test]
    fn tab_switch_limit_is_exceeded_only_past_limit() {
        let mut attempt = QuizAttempt::start(&quiz(2), "Ada", "ada@example.com", None);

        attempt.tab_switch_count = 2;
        assert!(!attempt.exceeds_tab_switch_limit());

        attempt.tab_switch_count = 3;
        assert!(attempt.exceeds_tab_switch_limit());
    }

    #[test]
    fn zero_limit_is_exceeded_on_first_switch() {
        let mut attempt = QuizAttempt::start(&quiz(0), "Ada", "ada@example.com", None);
        attempt.tab_switch_count = 1;
        assert!(attempt.exceeds_tab_switch_limit());
    }

    #[test]
    fn termination_zeroes_score_and_closes() {
        let mut attempt = QuizAttempt::start(&quiz(2), "Ada", "ada@example.com", None);
        attempt.score = 2;

        attempt.terminate_for_tab_switching(Utc::now());

        assert!(attempt.is_terminated_due_to_tab_switch);
        assert_eq!(attempt.status, AttemptStatus::Terminated);
        assert_eq!(attempt.score, 0);
        assert!(attempt.end_time.is_some());
        assert!(!attempt.is_open());
    }

    #[test]
    fn submit_derives_time_spent_and_status() {
        let mut attempt = QuizAttempt::start(&quiz(3), "Ada", "ada@example.com", None);
        let end = attempt.start_time + Duration::seconds(95);

        attempt.submit(2, vec![], end);

        assert_eq!(attempt.status, AttemptStatus::Submitted);
        assert_eq!(attempt.time_spent, 95);
        assert!(!attempt.is_open());
    }

    #[test]
    fn remaining_seconds_counts_down_and_stops_at_zero() {
        let attempt = QuizAttempt::start(&quiz(3), "Ada", "ada@example.com", None);

        let later = attempt.start_time + Duration::seconds(60);
        assert_eq!(attempt.remaining_seconds(10, later), 540);

        let much_later = attempt.start_time + Duration::minutes(30);
        assert_eq!(attempt.remaining_seconds(10, much_later), 0);
    }

    #[test]
    fn ownership_matches_user_id_or_email() {
        let attempt = QuizAttempt::start(&quiz(3), "Ada", "ada@example.com", Some("user-1".into()));

        assert!(attempt.belongs_to("user-1", "other@example.com"));
        assert!(attempt.belongs_to("user-2", "ADA@example.com"));
        assert!(!attempt.belongs_to("user-2", "other@example.com"));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&AttemptStatus::Terminated).expect("status should serialize");
        assert_eq!(json, "\"terminated\"");
        assert_eq!(AttemptStatus::Open.as_str(), "open");
    }
}
