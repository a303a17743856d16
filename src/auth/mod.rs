pub mod extractors;
pub mod middleware;
pub mod otp;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use otp::{generate_otp, OTP_LENGTH};
pub use password::{hash_password_blocking, verify_decoy_blocking, verify_password_blocking};
pub use token::{Claims, Refreshed, TokenManager, SESSION_COOKIE};

/// Credentials posted to `/api/v1/auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Payload of `/api/v1/auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Display name, between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    /// Between 6 and 72 characters; bcrypt ignores anything longer.
    #[validate(length(min = 6, max = 72))]
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
}

/// The one-time code mailed after signup.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, max = 12))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Sets a new password using a code from the forgot-password mail.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 12))]
    pub token: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
    pub confirm_password: String,
}

/// `data` of the signup, login and refresh responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}
