use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::Result,
    services::trial,
    state::AppState,
    validation::lead::require_token,
};

/// Query parameters of a redemption request.
#[derive(Deserialize, Debug)]
pub struct RedeemParams {
    pub token: Option<String>,
}

/// Handles redemption of a download token.
///
/// On success the caller is redirected (302) to the fixed download URL. The
/// URL is the same for every token and not itself time-limited.
#[axum::debug_handler]
pub async fn redeem(
    State(state): State<AppState>,
    Query(params): Query<RedeemParams>,
) -> Result<Response> {
    let token = require_token(params.token.as_deref())?;

    let record = trial::redeem(
        &state.sheets,
        token,
        Utc::now(),
        state.config.link_validity_hours,
    )
    .await?;

    tracing::info!(
        "✅ Token redeemed for {} (requested at {})",
        record.email,
        record.requested_at
    );

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, state.config.download_url.clone())],
    )
        .into_response())
}
