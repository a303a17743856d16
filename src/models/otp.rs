use std::fmt;

/// What a one-time code was issued for. Codes only verify against the action they were
/// created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpAction {
    Signup,
    ForgotPassword,
}

impl OtpAction {
    /// Value stored in `otps.action`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpAction::Signup => "signup",
            OtpAction::ForgotPassword => "forgot_password",
        }
    }
}

impl fmt::Display for OtpAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes() {
        assert_eq!(OtpAction::Signup.as_str(), "signup");
        assert_eq!(OtpAction::ForgotPassword.to_string(), "forgot_password");
    }
}
