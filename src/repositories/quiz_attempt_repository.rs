use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_document, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{quiz_attempt::AttemptStatus, QuizAttempt},
};

/// Fields set when an attempt is submitted or terminated.
pub const CLOSE_FIELDS: [&str; 6] = [
    "answers",
    "score",
    "end_time",
    "time_spent",
    "status",
    "is_terminated_due_to_tab_switch",
];

/// Writes after creation are conditional on the stored attempt still being open.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    /// Fails with `AlreadyExists` if an open attempt for the same quiz and email is stored.
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    async fn find_open(&self, quiz_id: &str, student_email: &str) -> AppResult<Option<QuizAttempt>>;
    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn list_for_student(&self, user_id: &str, email: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn count_by_quiz(&self, quiz_id: &str) -> AppResult<u64>;
    /// Atomically bumps the counter of an open attempt; `None` if absent or closed.
    async fn increment_tab_switch(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    /// Writes the closing fields ([`CLOSE_FIELDS`]) of an attempt that is still open
    /// in storage; returns false if it was already closed. Other fields are untouched.
    async fn close(&self, attempt: &QuizAttempt) -> AppResult<bool>;
    async fn set_feedback(&self, id: &str, feedback: &str) -> AppResult<Option<QuizAttempt>>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let open_attempt_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "student_email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "status": AttemptStatus::Open.as_str() })
                    .name("open_attempt_unique".to_string())
                    .build(),
            )
            .build();

        let quiz_id_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("quiz_created".to_string())
                    .build(),
            )
            .build();

        let student_index = IndexModel::builder()
            .keys(doc! { "student_email": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_email".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(open_attempt_index).await?;
        self.collection.create_index(quiz_id_index).await?;
        self.collection.create_index(student_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_open(&self, quiz_id: &str, student_email: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "quiz_id": quiz_id,
                "student_email": student_email,
                "status": AttemptStatus::Open.as_str(),
            })
            .await?;
        Ok(attempt)
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "quiz_id": quiz_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn list_for_student(&self, user_id: &str, email: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! {
                "$or": [
                    { "student_user_id": user_id },
                    { "student_email": email },
                ]
            })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn count_by_quiz(&self, quiz_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "quiz_id": quiz_id })
            .await?;
        Ok(count)
    }

    async fn increment_tab_switch(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one_and_update(
                doc! { "id": id, "status": AttemptStatus::Open.as_str() },
                doc! { "$inc": { "tab_switch_count": 1 } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(attempt)
    }

    async fn close(&self, attempt: &QuizAttempt) -> AppResult<bool> {
        let stored = to_document(attempt)?;
        let mut fields = Document::new();
        for field in CLOSE_FIELDS {
            if let Some(value) = stored.get(field) {
                fields.insert(field, value.clone());
            }
        }

        let result = self
            .collection
            .update_one(
                doc! { "id": &attempt.id, "status": AttemptStatus::Open.as_str() },
                doc! { "$set": fields },
            )
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn set_feedback(&self, id: &str, feedback: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": { "feedback": feedback } })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(attempt)
    }
}
