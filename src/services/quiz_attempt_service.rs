use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{policy, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{quiz_attempt::normalize_email, Answer, Quiz, QuizAttempt},
        dto::{
            attempt_dto::AttemptDto,
            request::{AnswerInput, FeedbackRequest, StartAttemptRequest, SubmitAnswersRequest},
        },
    },
    repositories::{QuizAttemptRepository, QuizRepository},
};

const ATTEMPT_CLOSED: &str = "This attempt has already been submitted or terminated";

#[derive(Debug)]
pub enum StartOutcome {
    Created(QuizAttempt),
    Resumed(QuizAttempt),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Graded(QuizAttempt),
    AlreadySubmitted(QuizAttempt),
    Terminated(QuizAttempt),
}

impl SubmitOutcome {
    fn from_closed(attempt: QuizAttempt) -> Self {
        if attempt.is_terminated_due_to_tab_switch {
            SubmitOutcome::Terminated(attempt)
        } else {
            SubmitOutcome::AlreadySubmitted(attempt)
        }
    }

    pub fn attempt(&self) -> &QuizAttempt {
        match self {
            SubmitOutcome::Graded(attempt)
            | SubmitOutcome::AlreadySubmitted(attempt)
            | SubmitOutcome::Terminated(attempt) => attempt,
        }
    }

    pub fn into_attempt(self) -> QuizAttempt {
        match self {
            SubmitOutcome::Graded(attempt)
            | SubmitOutcome::AlreadySubmitted(attempt)
            | SubmitOutcome::Terminated(attempt) => attempt,
        }
    }
}

#[derive(Debug)]
pub struct TabSwitchOutcome {
    pub attempt: QuizAttempt,
    pub terminated: bool,
}

/// Grades `answers` against the quiz's answer key.
///
/// Every answer to a known question is graded and kept; unknown question ids are dropped.
pub fn grade_answers(quiz: &Quiz, answers: &[AnswerInput]) -> AppResult<(i32, Vec<Answer>)> {
    let graded: Vec<Answer> = answers
        .iter()
        .filter_map(|input| {
            let question = quiz.question(&input.question_id)?;
            Some(Answer {
                question_id: question.id.clone(),
                selected_option_index: input.selected_option_index,
                is_correct: question.is_correct(input.selected_option_index),
                marks_awarded: question.marks_for(input.selected_option_index),
            })
        })
        .collect();

    let score = graded
        .iter()
        .try_fold(0i32, |total, answer| total.checked_add(answer.marks_awarded))
        .ok_or_else(|| AppError::ValidationError("Score exceeds the supported range".to_string()))?;
    Ok((score, graded))
}

pub struct QuizAttemptService {
    attempt_repository: Arc<dyn QuizAttemptRepository>,
    quiz_repository: Arc<dyn QuizRepository>,
}

impl QuizAttemptService {
    pub fn new(
        attempt_repository: Arc<dyn QuizAttemptRepository>,
        quiz_repository: Arc<dyn QuizRepository>,
    ) -> Self {
        Self {
            attempt_repository,
            quiz_repository,
        }
    }

    pub async fn start_attempt(
        &self,
        request: StartAttemptRequest,
        caller: Option<&Claims>,
    ) -> AppResult<(StartOutcome, Quiz)> {
        let request = request.normalized();
        request.validate()?;

        let quiz = self
            .quiz_repository
            .find_by_id(&request.quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        if !quiz.is_active {
            return Err(AppError::InvalidState(
                "This quiz is not currently active".to_string(),
            ));
        }

        let email = request.email;
        if let Some(existing) = self.attempt_repository.find_open(&quiz.id, &email).await? {
            log::debug!("Resuming attempt {} for {}", existing.id, email);
            return Ok((StartOutcome::Resumed(existing), quiz));
        }

        let attempt = QuizAttempt::start(
            &quiz,
            &request.name,
            &email,
            caller.map(|claims| claims.sub.clone()),
        );

        match self.attempt_repository.create(attempt).await {
            Ok(created) => {
                log::info!("Started attempt {} on quiz {}", created.id, quiz.id);
                Ok((StartOutcome::Created(created), quiz))
            }
            // A concurrent start won the open-attempt index.
            Err(AppError::AlreadyExists(_)) => {
                let existing = self
                    .attempt_repository
                    .find_open(&quiz.id, &email)
                    .await?
                    .ok_or_else(|| {
                        AppError::InternalError(format!(
                            "Open attempt for {} on quiz {} vanished after conflict",
                            email, quiz.id
                        ))
                    })?;
                Ok((StartOutcome::Resumed(existing), quiz))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn record_tab_switch(&self, attempt_id: &str) -> AppResult<TabSwitchOutcome> {
        let attempt = self.find_attempt(attempt_id).await?;
        if !attempt.is_open() {
            return Err(AppError::InvalidState(ATTEMPT_CLOSED.to_string()));
        }

        let mut attempt = self
            .attempt_repository
            .increment_tab_switch(attempt_id)
            .await?
            .ok_or_else(|| AppError::InvalidState(ATTEMPT_CLOSED.to_string()))?;

        if !attempt.exceeds_tab_switch_limit() {
            return Ok(TabSwitchOutcome {
                attempt,
                terminated: false,
            });
        }

        attempt.terminate_for_tab_switching(Utc::now());
        if self.attempt_repository.close(&attempt).await? {
            log::info!(
                "Attempt {} terminated after {} tab switches",
                attempt.id,
                attempt.tab_switch_count
            );
            return Ok(TabSwitchOutcome {
                attempt,
                terminated: true,
            });
        }

        let stored = self.find_attempt(attempt_id).await?;
        Ok(TabSwitchOutcome {
            terminated: stored.is_terminated_due_to_tab_switch,
            attempt: stored,
        })
    }

    pub async fn submit_answers(
        &self,
        attempt_id: &str,
        request: SubmitAnswersRequest,
    ) -> AppResult<SubmitOutcome> {
        let mut attempt = self.find_attempt(attempt_id).await?;
        if !attempt.is_open() {
            return Ok(SubmitOutcome::from_closed(attempt));
        }

        request.validate()?;

        let quiz = self
            .quiz_repository
            .find_by_id(&attempt.quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        let (score, answers) = grade_answers(&quiz, &request.answers)?;
        attempt.submit(score, answers, Utc::now());

        if self.attempt_repository.close(&attempt).await? {
            log::info!(
                "Attempt {} submitted with score {}/{}",
                attempt.id,
                attempt.score,
                attempt.max_score
            );
            return Ok(SubmitOutcome::Graded(attempt));
        }

        let stored = self.find_attempt(attempt_id).await?;
        Ok(SubmitOutcome::from_closed(stored))
    }

    pub async fn submit_feedback(
        &self,
        attempt_id: &str,
        request: FeedbackRequest,
    ) -> AppResult<QuizAttempt> {
        request.validate()?;

        self.attempt_repository
            .set_feedback(attempt_id, request.feedback.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))
    }

    pub async fn get_attempt(&self, attempt_id: &str, caller: &Claims) -> AppResult<AttemptDto> {
        let Some(attempt) = self.attempt_repository.find_by_id(attempt_id).await? else {
            // Only admins learn whether an attempt id exists.
            return Err(if policy::is_admin(caller.role) {
                AppError::NotFound("Attempt not found".to_string())
            } else {
                AppError::Unauthorized("Not authorized to view this attempt".to_string())
            });
        };

        let quiz = self.quiz_repository.find_by_id(&attempt.quiz_id).await?;
        if !policy::can_view_attempt(caller, &attempt, quiz.as_ref()) {
            return Err(AppError::Unauthorized(
                "Not authorized to view this attempt".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(match quiz {
            Some(quiz) => AttemptDto::with_quiz(attempt, &quiz, now),
            None => AttemptDto::from(attempt),
        })
    }

    pub async fn list_my_attempts(&self, caller: &Claims) -> AppResult<Vec<AttemptDto>> {
        let attempts = self
            .attempt_repository
            .list_for_student(&caller.sub, &normalize_email(&caller.email))
            .await?;

        let quiz_ids: Vec<String> = attempts
            .iter()
            .map(|a| a.quiz_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let quizzes = self.quiz_repository.find_by_ids(&quiz_ids).await?;

        let now = Utc::now();
        Ok(attempts
            .into_iter()
            .map(|attempt| match quizzes.iter().find(|q| q.id == attempt.quiz_id) {
                Some(quiz) => AttemptDto::with_quiz(attempt, quiz, now),
                None => AttemptDto::from(attempt),
            })
            .collect())
    }

    pub async fn list_quiz_attempts(
        &self,
        quiz_id: &str,
        caller: &Claims,
    ) -> AppResult<Vec<AttemptDto>> {
        let quiz = self
            .quiz_repository
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        if !policy::can_view_quiz_attempts(caller, &quiz) {
            return Err(AppError::Unauthorized(
                "Not authorized to view attempts for this quiz".to_string(),
            ));
        }

        let now = Utc::now();
        let attempts = self.attempt_repository.list_by_quiz(quiz_id).await?;
        Ok(attempts
            .into_iter()
            .map(|attempt| AttemptDto::with_quiz(attempt, &quiz, now))
            .collect())
    }

    async fn find_attempt(&self, attempt_id: &str) -> AppResult<QuizAttempt> {
        self.attempt_repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))
    }
}
