use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{policy, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{quiz::checked_total_marks, Question, Quiz},
        dto::{
            quiz_dto::{QuizBySlugDto, QuizDto, QuizForTaking},
            request::{CreateQuizRequest, QuestionInput, UpdateQuizRequest},
        },
    },
    repositories::{QuizAttemptRepository, QuizRepository},
    services::slug::generate_slug,
};

const SLUG_ATTEMPTS: usize = 3;

fn ensure_total_marks_fit(questions: &[QuestionInput]) -> AppResult<()> {
    checked_total_marks(questions.iter().map(|q| q.marks))
        .map(|_| ())
        .ok_or_else(|| AppError::ValidationError("Total marks exceed the supported range".to_string()))
}

pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
    attempt_repository: Arc<dyn QuizAttemptRepository>,
}

impl QuizService {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        attempt_repository: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            repository,
            attempt_repository,
        }
    }

    pub async fn create_quiz(&self, request: CreateQuizRequest, caller: &Claims) -> AppResult<QuizDto> {
        policy::require_admin(caller)?;
        request.validate()?;
        ensure_total_marks_fit(&request.questions)?;

        let explicit_slug = request
            .url_slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .map(str::to_string);
        let questions: Vec<Question> = request.questions.into_iter().map(Question::from).collect();

        let mut quiz = Quiz::new(
            &request.title,
            request.description,
            &caller.sub,
            questions,
            request.exam_duration,
            request.tab_switch_limit,
            &explicit_slug.clone().unwrap_or_else(|| generate_slug(&request.title)),
        );
        if let Some(is_active) = request.is_active {
            quiz.is_active = is_active;
        }

        // Generated slugs can collide; retry with a fresh suffix.
        let mut remaining = SLUG_ATTEMPTS;
        loop {
            match self.repository.create(quiz.clone()).await {
                Ok(created) => {
                    log::info!("Quiz {} created by {}", created.id, caller.sub);
                    return Ok(QuizDto::full(created));
                }
                Err(AppError::AlreadyExists(msg)) if explicit_slug.is_none() && remaining > 1 => {
                    log::warn!("Slug {} collided ({}), regenerating", quiz.url_slug, msg);
                    remaining -= 1;
                    quiz.url_slug = generate_slug(&quiz.title);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn list_quizzes(&self, caller: &Claims) -> AppResult<Vec<QuizDto>> {
        let active_only = !policy::can_view_inactive_quizzes(caller.role);
        let quizzes = self.repository.list(active_only).await?;

        Ok(quizzes
            .into_iter()
            .map(|quiz| Self::view_for(caller, quiz))
            .collect())
    }

    pub async fn get_quiz(&self, id: &str, caller: &Claims) -> AppResult<QuizDto> {
        let quiz = self.find_quiz(id).await?;

        if !quiz.is_active && !policy::can_view_inactive_quizzes(caller.role) {
            return Err(AppError::Unauthorized(
                "Not authorized to access this quiz".to_string(),
            ));
        }

        Ok(Self::view_for(caller, quiz))
    }

    pub async fn get_quiz_by_slug(&self, slug: &str) -> AppResult<QuizBySlugDto> {
        let quiz = self
            .repository
            .find_active_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz not found with slug of {}", slug)))?;

        Ok(QuizBySlugDto::from(quiz))
    }

    pub async fn get_quiz_for_taking(&self, id: &str) -> AppResult<QuizForTaking> {
        let quiz = self.find_quiz(id).await?;

        if !quiz.is_active {
            return Err(AppError::InvalidState(
                "This quiz is not currently active".to_string(),
            ));
        }

        Ok(QuizForTaking::from(quiz))
    }

    pub async fn update_quiz(
        &self,
        id: &str,
        request: UpdateQuizRequest,
        caller: &Claims,
    ) -> AppResult<QuizDto> {
        policy::require_admin(caller)?;
        request.validate()?;
        if let Some(questions) = &request.questions {
            ensure_total_marks_fit(questions)?;
        }

        let mut quiz = self.find_quiz(id).await?;
        if !policy::can_manage_quiz(caller, &quiz) {
            return Err(AppError::Unauthorized(format!(
                "User {} is not authorized to update this quiz",
                caller.sub
            )));
        }

        if !request.touches_only_active_flag() && self.attempt_repository.count_by_quiz(id).await? > 0 {
            return Err(AppError::InvalidState(
                "Cannot update quiz with existing attempts".to_string(),
            ));
        }

        Self::apply_update(&mut quiz, request);
        quiz.touch();

        let updated = self.repository.update(quiz).await?;
        log::info!("Quiz {} updated by {}", updated.id, caller.sub);
        Ok(QuizDto::full(updated))
    }

    /// Removes only the quiz document; its attempts stay for the record.
    pub async fn delete_quiz(&self, id: &str, caller: &Claims) -> AppResult<()> {
        policy::require_admin(caller)?;

        let quiz = self.find_quiz(id).await?;
        if !policy::can_manage_quiz(caller, &quiz) {
            return Err(AppError::Unauthorized(format!(
                "User {} is not authorized to delete this quiz",
                caller.sub
            )));
        }

        self.repository.delete(id).await?;
        log::info!("Quiz {} deleted by {}", id, caller.sub);
        Ok(())
    }

    fn apply_update(quiz: &mut Quiz, request: UpdateQuizRequest) {
        if let Some(title) = request.title {
            quiz.title = title.trim().to_string();
        }
        if let Some(description) = request.description {
            quiz.description = Some(description.trim().to_string());
        }
        if let Some(questions) = request.questions {
            quiz.replace_questions(questions.into_iter().map(Question::from).collect());
        }
        if let Some(exam_duration) = request.exam_duration {
            quiz.exam_duration = exam_duration;
        }
        if let Some(tab_switch_limit) = request.tab_switch_limit {
            quiz.tab_switch_limit = tab_switch_limit;
        }
        if let Some(is_active) = request.is_active {
            quiz.is_active = is_active;
        }
        if let Some(url_slug) = request.url_slug {
            quiz.url_slug = url_slug.trim().to_string();
        }
    }

    fn view_for(caller: &Claims, quiz: Quiz) -> QuizDto {
        if policy::can_see_answer_key(caller.role) {
            QuizDto::full(quiz)
        } else {
            QuizDto::without_answer_key(quiz)
        }
    }

    async fn find_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz not found with id of {}", id)))
    }
}
