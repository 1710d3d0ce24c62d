use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{CreateQuizRequest, UpdateQuizRequest},
        response::{ApiResponse, EmptyData},
    },
};

#[get("/api/quizzes")]
async fn list_quizzes(state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let quizzes = state.quiz_service.list_quizzes(&auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list(quizzes)))
}

#[post("/api/quizzes")]
async fn create_quiz(
    state: web::Data<AppState>,
    request: web::Json<CreateQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.create_quiz(request.into_inner(), &auth.0).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(quiz)))
}

#[get("/api/quizzes/slug/{slug}")]
async fn get_quiz_by_slug(state: web::Data<AppState>, slug: web::Path<String>) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(quiz)))
}

#[get("/api/quizzes/take/{id}")]
async fn get_quiz_for_taking(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz_for_taking(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(quiz)))
}

#[get("/api/quizzes/{id}")]
async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz(&id, &auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(quiz)))
}

#[put("/api/quizzes/{id}")]
async fn update_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .update_quiz(&id, request.into_inner(), &auth.0)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(quiz)))
}

#[delete("/api/quizzes/{id}")]
async fn delete_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    state.quiz_service.delete_quiz(&id, &auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(EmptyData {})))
}
