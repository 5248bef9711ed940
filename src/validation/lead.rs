use crate::error::{AppError, Result};

/// The kind of form a submission belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    /// A free-trial request.
    Trial,
    /// A contact-form message.
    Contact,
}

/// Validates the `formType` discriminator.
pub fn validate_form_type(form_type: &str) -> Result<FormKind> {
    match form_type {
        "trial" => Ok(FormKind::Trial),
        "contact" => Ok(FormKind::Contact),
        other => Err(AppError::Validation(format!(
            "Unknown form type '{}'",
            other
        ))),
    }
}

/// Requires a non-empty email field.
///
/// Presence only; the address format is deliberately not validated.
pub fn require_email(email: Option<&str>) -> Result<&str> {
    match email {
        Some(email) if !email.trim().is_empty() => Ok(email),
        _ => Err(AppError::Validation("Email is required".to_string())),
    }
}

/// Requires the `token` query parameter.
pub fn require_token(token: Option<&str>) -> Result<&str> {
    match token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::MissingParameter("token".to_string())),
    }
}
