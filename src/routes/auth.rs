use crate::{
    auth::{
        middleware::bearer_token, AuthMiddleware, AuthResponse, AuthenticatedUser,
        ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignUpRequest, TokenManager,
        VerifyEmailRequest, SESSION_COOKIE,
    },
    config::Config,
    email::Mailer,
    error::{AppError, INVALID_TOKEN},
    response::ApiResponse,
    services::auth::{self as service, AuthDeps},
};
use actix_web::{http::StatusCode, post, web, HttpRequest, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

fn deps<'a>(
    pool: &'a PgPool,
    tokens: &'a TokenManager,
    mailer: &'a dyn Mailer,
    config: &Config,
) -> AuthDeps<'a> {
    AuthDeps {
        pool,
        tokens,
        mailer,
        otp_ttl: config.otp_ttl,
    }
}

fn message(text: &str) -> HttpResponse {
    ApiResponse::ok(json!({ "message": text }))
}

/// Register a new user
///
/// Creates the account, mails a verification code and returns a session token.
///
/// ## Responses:
/// - `201 Created`: `{ token }`.
/// - `400 Bad Request`: passwords differ.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: field validation failed.
#[post("/signup")]
pub async fn signup(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    mailer: web::Data<dyn Mailer>,
    config: web::Data<Config>,
    signup_data: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AppError> {
    signup_data.validate()?;

    let deps = deps(&pool, &tokens, mailer.get_ref(), &config);
    let token = service::sign_up(&deps, &signup_data).await?;

    Ok(ApiResponse::created(AuthResponse { token }))
}

/// Login user
///
/// Authenticates a user, returns the token and sets the session cookie.
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    mailer: web::Data<dyn Mailer>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    login_data.validate()?;

    let session = req.cookie(SESSION_COOKIE);
    let deps = deps(&pool, &tokens, mailer.get_ref(), &config);
    let token = service::login(
        &deps,
        &login_data.email,
        &login_data.password,
        session.as_ref().map(|cookie| cookie.value()),
    )
    .await?;

    Ok(HttpResponse::Ok()
        .cookie(tokens.session_cookie(&token))
        .json(ApiResponse::success(StatusCode::OK, AuthResponse { token }, None)))
}

/// Confirms the caller's email with the code from the signup mail.
#[post("/verify-email", wrap = "AuthMiddleware::bearer()")]
pub async fn verify_email(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    payload: web::Json<VerifyEmailRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    service::verify_email(&pool, user.user_id(), &payload.token).await?;
    Ok(message("email has been verified"))
}

#[post("/resend-verification", wrap = "AuthMiddleware::bearer()")]
pub async fn resend_verification(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    mailer: web::Data<dyn Mailer>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let deps = deps(&pool, &tokens, mailer.get_ref(), &config);
    service::resend_verification(&deps, user.user_id()).await?;
    Ok(message("verification code has been sent"))
}

/// Starts a password reset. The answer is the same whether or not the account exists.
#[post("/forgot-password")]
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    mailer: web::Data<dyn Mailer>,
    config: web::Data<Config>,
    payload: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let deps = deps(&pool, &tokens, mailer.get_ref(), &config);
    service::forgot_password(&deps, &payload.email).await?;
    Ok(message(
        "if the email is registered, a password reset code has been sent",
    ))
}

#[post("/reset-password")]
pub async fn reset_password(
    pool: web::Data<PgPool>,
    payload: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    service::reset_password(&pool, &payload).await?;
    Ok(message("password has been reset"))
}

/// Exchanges a valid or recently expired token for a usable one.
///
/// The token is read from the `Authorization` header, falling back to the session cookie.
#[post("/refresh")]
pub async fn refresh(
    req: HttpRequest,
    tokens: web::Data<TokenManager>,
) -> Result<HttpResponse, AppError> {
    let presented = bearer_token(req.headers())
        .map(str::to_string)
        .or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.into()))?;

    let refreshed = tokens.refresh(&presented)?;
    Ok(HttpResponse::Ok()
        .cookie(tokens.session_cookie(&refreshed.token))
        .json(ApiResponse::success(
            StatusCode::OK,
            AuthResponse {
                token: refreshed.token,
            },
            None,
        )))
}

#[post("/logout")]
pub async fn logout(tokens: web::Data<TokenManager>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(tokens.removal_cookie())
        .json(ApiResponse::success(
            StatusCode::OK,
            json!({ "message": "logged out" }),
            None,
        ))
}
