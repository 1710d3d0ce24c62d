pub mod attempt_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod quiz_handler;

use actix_web::{web, HttpResponse};

use crate::errors::{AppError, ErrorResponse};

/// Registers every route plus the JSON body error handler.
///
/// `my-attempts` must stay ahead of `/api/attempts/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid request body: {}", err)).into()
    }))
    .service(health_handler::health_check)
    .service(health_handler::health_check_ready)
    .service(health_handler::health_check_live)
    .service(auth_handler::register)
    .service(auth_handler::register_student)
    .service(auth_handler::register_admin)
    .service(auth_handler::login)
    .service(auth_handler::me)
    .service(auth_handler::logout)
    .service(attempt_handler::start_attempt)
    .service(attempt_handler::my_attempts)
    .service(attempt_handler::submit_answers)
    .service(attempt_handler::record_tab_switch)
    .service(attempt_handler::submit_feedback)
    .service(attempt_handler::get_attempt)
    .service(attempt_handler::quiz_attempts)
    .service(quiz_handler::list_quizzes)
    .service(quiz_handler::create_quiz)
    .service(quiz_handler::get_quiz_by_slug)
    .service(quiz_handler::get_quiz_for_taking)
    .service(quiz_handler::get_quiz)
    .service(quiz_handler::update_quiz)
    .service(quiz_handler::delete_quiz);
}

pub async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        success: false,
        message: "Route not found".to_string(),
    })
}
