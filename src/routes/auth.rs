/// Authentication Routes
///
/// Signup, login (JSON and OAuth2 password form) and current-token info.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, Claims};
use crate::error::AppError;
use crate::validators::{is_valid_password, is_valid_role, is_valid_username};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

/// Login body; also the shape of the OAuth2 password form
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub id: i64,
    pub username: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

/// POST /auth/signup
///
/// # Errors
/// - 400: invalid username, role or over-long password
/// - 409: username already registered
pub async fn signup(
    form: web::Json<SignupRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let username = is_valid_username(&form.username)?;
    let role = is_valid_role(form.role.as_deref())?;
    is_valid_password(&form.password)?;

    let credential = auth.signup(&username, &form.password, &role).await?;

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created".to_string(),
        id: credential.id,
        username: credential.subject,
        role: credential.role,
    }))
}

/// POST /auth/login
///
/// # Errors
/// - 401: unknown username or wrong password (same response for both)
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    issue_token(&form, &auth).await
}

/// POST /auth/token
///
/// Same as `/auth/login` for `application/x-www-form-urlencoded` clients.
pub async fn token(
    form: web::Form<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    issue_token(&form, &auth).await
}

async fn issue_token(form: &LoginRequest, auth: &AuthService) -> Result<HttpResponse, AppError> {
    let access_token = auth.login(form.username.trim(), &form.password).await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: auth.token_ttl().num_seconds(),
    }))
}

/// GET /auth/me
///
/// Claims of the presented token; requires `Authorization: Bearer <token>`.
pub async fn get_current_user(claims: web::ReqData<Claims>) -> HttpResponse {
    HttpResponse::Ok().json(claims.into_inner())
}
