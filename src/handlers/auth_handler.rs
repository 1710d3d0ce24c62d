use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    get, post, web, HttpResponse, HttpResponseBuilder,
};

use crate::{
    app_state::AppState,
    auth::{AuthenticatedUser, TOKEN_COOKIE},
    config::Config,
    errors::AppError,
    models::{
        domain::Role,
        dto::{
            request::{LoginRequest, RegisterRequest},
            response::{ApiResponse, EmptyData, SessionResponse, UserDto},
        },
    },
    services::Session,
};

fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::days(config.jwt_cookie_expire_days))
        .finish()
}

fn session_response(mut builder: HttpResponseBuilder, config: &Config, session: Session) -> HttpResponse {
    builder
        .cookie(session_cookie(config, session.token.clone()))
        .json(SessionResponse::new(session.token, session.user))
}

#[post("/api/auth/register")]
async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state.auth_service.register(request.into_inner(), None).await?;
    Ok(session_response(HttpResponse::Created(), &state.config, session))
}

#[post("/api/auth/register/student")]
async fn register_student(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state
        .auth_service
        .register(request.into_inner(), Some(Role::Student))
        .await?;
    Ok(session_response(HttpResponse::Created(), &state.config, session))
}

#[post("/api/auth/register/admin")]
async fn register_admin(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state
        .auth_service
        .register(request.into_inner(), Some(Role::Admin))
        .await?;
    Ok(session_response(HttpResponse::Created(), &state.config, session))
}

#[post("/api/auth/login")]
async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state.auth_service.login(request.into_inner()).await?;
    Ok(session_response(HttpResponse::Ok(), &state.config, session))
}

#[get("/api/auth/me")]
async fn me(state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.current_user(&auth.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserDto::from(user))))
}

#[get("/api/auth/logout")]
async fn logout(_auth: AuthenticatedUser) -> HttpResponse {
    let cleared = Cookie::build(TOKEN_COOKIE, "none")
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(10))
        .finish();

    HttpResponse::Ok()
        .cookie(cleared)
        .json(ApiResponse::ok(EmptyData {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_logout_requires_session() {
        let app = test::init_service(App::new().service(logout)).await;

        let req = test::TestRequest::get().uri("/api/auth/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_session_cookie_flags() {
        let config = Config::test_config();
        let cookie = session_cookie(&config, "jwt".to_string());

        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::days(config.jwt_cookie_expire_days)));
    }
}
