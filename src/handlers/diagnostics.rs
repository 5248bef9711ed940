use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::{
    config::{OPTIONAL_VARS, REQUIRED_VARS},
    error::Result,
    state::AppState,
};

/// Presence of one environment variable. Values are never reported.
#[derive(Serialize)]
pub struct EnvVarStatus {
    pub name: &'static str,
    pub present: bool,
    pub required: bool,
}

/// The response payload of the environment diagnostics endpoint.
#[derive(Serialize)]
pub struct EnvReport {
    pub ok: bool,
    pub variables: Vec<EnvVarStatus>,
}

/// Reports which recognized environment variables are set.
///
/// Deployment diagnostics only: names and booleans, never values.
pub async fn env_report() -> impl IntoResponse {
    let status = |name: &'static str, required: bool| EnvVarStatus {
        name,
        present: std::env::var(name).is_ok(),
        required,
    };

    let variables: Vec<EnvVarStatus> = REQUIRED_VARS
        .iter()
        .copied()
        .map(|name| status(name, true))
        .chain(OPTIONAL_VARS.iter().copied().map(|name| status(name, false)))
        .collect();

    let ok = variables
        .iter()
        .filter(|v| v.required)
        .all(|v| v.present);

    Json(EnvReport { ok, variables })
}

/// Health of one external dependency.
#[derive(Serialize)]
pub struct DepStatus {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The response payload of the dependency diagnostics endpoint.
#[derive(Serialize)]
pub struct DepsReport {
    pub smtp: DepStatus,
    pub sheets: DepStatus,
}

/// Probes each external dependency and reports whether it resolves.
///
/// Full failure detail is logged server-side; the response carries only a
/// coarse description.
#[axum::debug_handler]
pub async fn deps_report(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let smtp = match state.mailer.test_connection().await {
        Ok(true) => DepStatus { ok: true, detail: None },
        Ok(false) => DepStatus {
            ok: false,
            detail: Some("SMTP relay refused the connection".to_string()),
        },
        Err(e) => {
            tracing::error!("SMTP diagnostics failed: {}", e);
            DepStatus {
                ok: false,
                detail: Some("SMTP relay unreachable".to_string()),
            }
        }
    };

    let sheets = match state.sheets.access_token().await {
        Ok(_) => DepStatus { ok: true, detail: None },
        Err(e) => {
            tracing::error!("Sheets diagnostics failed: {}", e);
            DepStatus {
                ok: false,
                detail: Some("Sheets authentication failed".to_string()),
            }
        }
    };

    Ok(Json(DepsReport { smtp, sheets }))
}
