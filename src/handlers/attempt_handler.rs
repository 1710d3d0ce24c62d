use actix_web::{get, patch, post, web, HttpResponse};
use chrono::Utc;

use crate::{
    app_state::AppState,
    auth::{AuthenticatedUser, OptionalUser},
    errors::AppError,
    models::dto::{
        attempt_dto::AttemptDto,
        request::{FeedbackRequest, StartAttemptRequest, SubmitAnswersRequest},
        response::{ApiResponse, TabSwitchDto},
    },
    services::{StartOutcome, SubmitOutcome},
};

#[post("/api/attempts/start")]
async fn start_attempt(
    state: web::Data<AppState>,
    request: web::Json<StartAttemptRequest>,
    caller: OptionalUser,
) -> Result<HttpResponse, AppError> {
    let (outcome, quiz) = state
        .attempt_service
        .start_attempt(request.into_inner(), caller.0.as_ref())
        .await?;

    let now = Utc::now();
    Ok(match outcome {
        StartOutcome::Created(attempt) => {
            HttpResponse::Created().json(ApiResponse::ok(AttemptDto::with_quiz(attempt, &quiz, now)))
        }
        StartOutcome::Resumed(attempt) => HttpResponse::Ok().json(
            ApiResponse::ok(AttemptDto::with_quiz(attempt, &quiz, now)).with_message("Resuming existing attempt"),
        ),
    })
}

#[post("/api/attempts/{attempt_id}/answers")]
async fn submit_answers(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    request: web::Json<SubmitAnswersRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = state
        .attempt_service
        .submit_answers(&attempt_id, request.into_inner())
        .await?;

    let message = match &outcome {
        SubmitOutcome::Graded(_) => None,
        SubmitOutcome::AlreadySubmitted(_) => Some("Attempt was already submitted"),
        SubmitOutcome::Terminated(_) => Some("Exam was terminated due to malpractice"),
    };

    let mut body = ApiResponse::ok(AttemptDto::from(outcome.into_attempt()));
    if let Some(message) = message {
        body = body.with_message(message);
    }
    Ok(HttpResponse::Ok().json(body))
}

#[patch("/api/attempts/{attempt_id}/tabswitch")]
async fn record_tab_switch(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let outcome = state.attempt_service.record_tab_switch(&attempt_id).await?;

    let body = ApiResponse::ok(TabSwitchDto {
        tab_switch_count: outcome.attempt.tab_switch_count,
        tab_switch_limit: outcome.attempt.tab_switch_limit,
        terminated: outcome.terminated,
    });
    Ok(HttpResponse::Ok().json(if outcome.terminated {
        body.with_message("Attempt terminated due to excessive tab switching")
    } else {
        body
    }))
}

#[post("/api/attempts/{attempt_id}/feedback")]
async fn submit_feedback(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    request: web::Json<FeedbackRequest>,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .submit_feedback(&attempt_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(AttemptDto::from(attempt))))
}

#[get("/api/attempts/my-attempts")]
async fn my_attempts(state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let attempts = state.attempt_service.list_my_attempts(&auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list(attempts)))
}

#[get("/api/attempts/{id}")]
async fn get_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state.attempt_service.get_attempt(&id, &auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}

#[get("/api/quizzes/{quiz_id}/attempts")]
async fn quiz_attempts(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state.attempt_service.list_quiz_attempts(&quiz_id, &auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list(attempts)))
}
