use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::lead::ContactMessage,
    services::{contact, trial},
    state::AppState,
    validation::lead::{require_email, validate_form_type, FormKind},
};

/// The request payload for form submissions from the marketing site.
#[derive(Deserialize, Debug)]
pub struct SubmitFormRequest {
    /// Which form was submitted: `trial` or `contact`.
    #[serde(rename = "formType")]
    pub form_type: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub message: Option<String>,
    pub fingerprint: Option<String>,
}

/// The response payload for form submissions.
#[derive(Serialize)]
pub struct SubmitFormResponse {
    pub message: String,
}

/// Handles a form submission, dispatching on `formType`.
#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitFormRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("📨 Form submission - type: {}", payload.form_type);

    let kind = validate_form_type(&payload.form_type)?;
    let email = require_email(payload.email.as_deref())?;

    let message = match kind {
        FormKind::Trial => {
            trial::issue(&state.sheets, &state.mailer, email, payload.fingerprint).await?;
            "Check your inbox: your download link is on its way.".to_string()
        }
        FormKind::Contact => {
            contact::relay(
                &state.mailer,
                ContactMessage {
                    name: payload.name.unwrap_or_default(),
                    email: email.to_string(),
                    message: payload.message.unwrap_or_default(),
                },
            )
            .await?;
            "Thanks for reaching out. We will get back to you shortly.".to_string()
        }
    };

    Ok((StatusCode::OK, Json(SubmitFormResponse { message })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AppError;

    fn request(form_type: &str, email: Option<&str>) -> SubmitFormRequest {
        SubmitFormRequest {
            form_type: form_type.to_string(),
            email: email.map(str::to_string),
            name: None,
            message: None,
            fingerprint: None,
        }
    }

    #[tokio::test]
    async fn missing_email_is_rejected_before_any_side_effect() {
        let state = AppState::new(&Config::for_tests()).unwrap();

        let err = submit(State(state), Json(request("trial", None)))
            .await
            .err()
            .expect("missing email must be rejected");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_form_type_is_rejected() {
        let state = AppState::new(&Config::for_tests()).unwrap();

        let err = submit(State(state), Json(request("newsletter", Some("a@x.com"))))
            .await
            .err()
            .expect("unknown form type must be rejected");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
