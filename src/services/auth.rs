//! Account workflows: signup, login, email verification and password reset.

use chrono::Duration;
use log::{error, info, warn};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    generate_otp, hash_password_blocking, verify_decoy_blocking, verify_password_blocking,
    ResetPasswordRequest, SignUpRequest, TokenManager, OTP_LENGTH,
};
use crate::db;
use crate::email::{Mailer, OutgoingEmail};
use crate::error::AppError;
use crate::models::{OtpAction, User};

pub const PASSWORD_MISMATCH: &str = "mismatched password confirmation";
pub const EMAIL_TAKEN: &str = "this email has been used, please login using your email";
pub const INVALID_CREDENTIALS: &str = "invalid email or password";
pub const INVALID_OTP: &str = "invalid OTP";
pub const ALREADY_VERIFIED: &str = "email is already verified";
pub const BLANK_NAME: &str = "full name must not be blank";

/// Everything the workflows need besides the request itself.
#[derive(Clone, Copy)]
pub struct AuthDeps<'a> {
    pub pool: &'a PgPool,
    pub tokens: &'a TokenManager,
    pub mailer: &'a dyn Mailer,
    pub otp_ttl: Duration,
}

/// Mails a fresh code for `action` and stores it once the mail went out.
async fn send_code(deps: &AuthDeps<'_>, user: &User, action: OtpAction) -> Result<(), AppError> {
    let code = generate_otp(OTP_LENGTH);
    let minutes = deps.otp_ttl.num_minutes();
    let email = match action {
        OtpAction::Signup => OutgoingEmail::verification(&user.email, &code, minutes),
        OtpAction::ForgotPassword => OutgoingEmail::password_reset(&user.email, &code, minutes),
    };

    deps.mailer.send(email).await?;
    db::otps::insert(deps.pool, user.id, &code, action, deps.otp_ttl).await?;
    Ok(())
}

/// Creates the account and returns a session token. The verification mail is best effort.
pub async fn sign_up(deps: &AuthDeps<'_>, request: &SignUpRequest) -> Result<String, AppError> {
    if request.full_name.trim().is_empty() {
        return Err(AppError::BadRequest(BLANK_NAME.into()));
    }
    if request.password != request.confirm_password {
        return Err(AppError::BadRequest(PASSWORD_MISMATCH.into()));
    }

    let password_hash = hash_password_blocking(request.password.clone()).await?;
    let email = request.email.trim().to_lowercase();
    let user = match db::users::insert(deps.pool, request.full_name.trim(), &email, &password_hash).await {
        Ok(user) => user,
        Err(err) => {
            return Err(match AppError::from(err) {
                AppError::Conflict(_) => AppError::Conflict(EMAIL_TAKEN.into()),
                other => other,
            })
        }
    };
    info!("User {} signed up", user.id);

    if let Err(err) = send_code(deps, &user, OtpAction::Signup).await {
        error!("Failed to send verification code to user {}: {}", user.id, err);
    }

    deps.tokens.issue(&user)
}

/// Checks the credentials and returns a session token.
///
/// `session_token` is the cookie the request arrived with, if any. It is handed back as-is
/// when it is still valid and belongs to the same account.
pub async fn login(
    deps: &AuthDeps<'_>,
    email: &str,
    password: &str,
    session_token: Option<&str>,
) -> Result<String, AppError> {
    let invalid = || AppError::Unauthorized(INVALID_CREDENTIALS.into());

    let Some(user) = db::users::find_by_email(deps.pool, email.trim()).await? else {
        verify_decoy_blocking(password.to_string()).await?;
        return Err(invalid());
    };
    if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
        return Err(invalid());
    }
    if !user.can_login() {
        warn!("Login attempt on disabled account {}", user.id);
        return Err(invalid());
    }

    db::users::touch_last_login(deps.pool, user.id).await?;

    if let Some(token) = session_token {
        if let Ok(claims) = deps.tokens.verify(token) {
            if claims.user_id == user.id {
                return Ok(token.to_string());
            }
        }
    }
    deps.tokens.issue(&user)
}

/// Consumes a signup code and marks the account verified.
pub async fn verify_email(pool: &PgPool, user_id: Uuid, code: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    if !db::otps::consume(&mut tx, user_id, code.trim(), OtpAction::Signup).await? {
        return Err(AppError::BadRequest(INVALID_OTP.into()));
    }
    db::users::mark_verified(&mut *tx, user_id).await?;
    tx.commit().await?;

    info!("User {} verified their email", user_id);
    Ok(())
}

/// Revokes outstanding signup codes and mails a new one.
pub async fn resend_verification(deps: &AuthDeps<'_>, user_id: Uuid) -> Result<(), AppError> {
    let user = db::users::find_by_id(deps.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    if user.is_verified {
        return Err(AppError::BadRequest(ALREADY_VERIFIED.into()));
    }

    db::otps::deactivate_outstanding(deps.pool, user.id, OtpAction::Signup).await?;
    send_code(deps, &user, OtpAction::Signup).await
}

/// Mails a reset code to `email` if it belongs to an active account. Callers cannot tell
/// whether it did.
pub async fn forgot_password(deps: &AuthDeps<'_>, email: &str) -> Result<(), AppError> {
    let Some(user) = db::users::find_by_email(deps.pool, email.trim()).await? else {
        info!("Password reset requested for unknown email");
        return Ok(());
    };
    if !user.can_login() {
        return Ok(());
    }

    db::otps::deactivate_outstanding(deps.pool, user.id, OtpAction::ForgotPassword).await?;
    if let Err(err) = send_code(deps, &user, OtpAction::ForgotPassword).await {
        error!("Failed to send password reset code to user {}: {}", user.id, err);
    }
    Ok(())
}

/// Consumes a reset code and stores the new password.
pub async fn reset_password(pool: &PgPool, request: &ResetPasswordRequest) -> Result<(), AppError> {
    if request.password != request.confirm_password {
        return Err(AppError::BadRequest(PASSWORD_MISMATCH.into()));
    }

    let user = db::users::find_by_email(pool, request.email.trim())
        .await?
        .filter(User::can_login)
        .ok_or_else(|| AppError::BadRequest(INVALID_OTP.into()))?;
    let password_hash = hash_password_blocking(request.password.clone()).await?;

    let mut tx = pool.begin().await?;
    if !db::otps::consume(&mut tx, user.id, request.token.trim(), OtpAction::ForgotPassword).await? {
        return Err(AppError::BadRequest(INVALID_OTP.into()));
    }
    db::users::update_password(&mut *tx, user.id, &password_hash).await?;
    db::otps::deactivate_outstanding(&mut *tx, user.id, OtpAction::ForgotPassword).await?;
    tx.commit().await?;

    info!("User {} reset their password", user.id);
    Ok(())
}
