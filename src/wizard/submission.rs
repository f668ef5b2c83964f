/// Submission failure classification
///
/// A failed registration is reported as a transient notice, not as field
/// errors. The backend's error code wins when it is one we know; otherwise
/// the message texts are searched for duplicate email / username hints.

use crate::error::ApiError;

pub const CODE_WEAK_PASSWORD: &str = "WEAK_PASSWORD";
pub const CODE_PASSWORD_BREACHED: &str = "PASSWORD_BREACHED";

const GENERIC_MESSAGE: &str = "Something went wrong, please try again";

const EMAIL_HINTS: &[&str] = &["email", "e-mail", "البريد"];
const USERNAME_HINTS: &[&str] = &["username", "user name", "اسم المستخدم"];
const DUPLICATE_HINTS: &[&str] = &[
    "exist",
    "already",
    "taken",
    "in use",
    "duplicate",
    "موجود",
    "مسجل",
    "مستخدم مسبق",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    WeakPassword,
    PasswordBreached,
    DuplicateEmail,
    DuplicateUsername,
    /// Anything else; carries the server's message when it sent one
    Other { message: Option<String> },
}

impl SubmissionFailure {
    pub fn classify(error: &ApiError) -> Self {
        let Some(body) = error.body() else {
            return SubmissionFailure::Other { message: None };
        };

        match body.code.as_deref() {
            Some(CODE_WEAK_PASSWORD) => return SubmissionFailure::WeakPassword,
            Some(CODE_PASSWORD_BREACHED) => return SubmissionFailure::PasswordBreached,
            _ => {}
        }

        let texts: Vec<String> = body.texts().map(str::to_lowercase).collect();
        let mentions = |subject: &[&str]| {
            texts.iter().any(|text| {
                subject.iter().any(|s| text.contains(s))
                    && DUPLICATE_HINTS.iter().any(|d| text.contains(d))
            })
        };

        if mentions(EMAIL_HINTS) {
            SubmissionFailure::DuplicateEmail
        } else if mentions(USERNAME_HINTS) {
            SubmissionFailure::DuplicateUsername
        } else {
            SubmissionFailure::Other {
                message: body.message.clone().or_else(|| body.message_en.clone()),
            }
        }
    }

    /// Text for the notice shown to the user
    pub fn message(&self) -> &str {
        match self {
            SubmissionFailure::WeakPassword => {
                "Password is too weak. Mix upper and lower case letters, numbers and symbols"
            }
            SubmissionFailure::PasswordBreached => {
                "This password has appeared in a data breach. Please choose a different one"
            }
            SubmissionFailure::DuplicateEmail => "This email is already registered",
            SubmissionFailure::DuplicateUsername => "This username is already taken",
            SubmissionFailure::Other { message } => message.as_deref().unwrap_or(GENERIC_MESSAGE),
        }
    }
}

impl std::fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
