use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::Config;
use crate::error::{AppError, Result};

/// Google's OAuth2 token endpoint.
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// The OAuth2 scope required for reading and appending sheet values.
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
/// Base URL of the Sheets v4 values API.
const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
/// Lifetime of the signed JWT assertion, in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Claims of the service-account JWT assertion exchanged for an access token.
#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct AppendBody {
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// A thin client for the Google Sheets v4 values API, authenticated with a
/// service account.
///
/// Every request runs the full OAuth2 service-account flow; handlers are
/// request-scoped and keep no token cache between invocations.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    service_account_email: String,
    private_key: Zeroizing<String>,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Creates a new `SheetsClient` from the application configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            service_account_email: config.google_service_account_email.clone(),
            private_key: config.google_private_key.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
        }
    }

    /// Signs the RS256 JWT assertion for the token exchange.
    fn signed_assertion(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.service_account_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_URI,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    /// Exchanges a signed assertion for a bearer access token.
    pub async fn access_token(&self) -> Result<String> {
        let assertion = self.signed_assertion()?;

        let response = self
            .http
            .post(TOKEN_URI)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheets(format!(
                "Token exchange failed with {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Appends one row to the spreadsheet at the given A1 range.
    pub async fn append_row(&self, range: &str, row: Vec<String>) -> Result<()> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=RAW",
            API_BASE, self.spreadsheet_id, range
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&access_token)
            .json(&AppendBody { values: vec![row] })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheets(format!(
                "Append failed with {}: {}",
                status, body
            )));
        }

        tracing::debug!("Row appended to range {}", range);
        Ok(())
    }

    /// Reads all rows in the given A1 range. Empty ranges yield an empty list.
    pub async fn read_rows(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let access_token = self.access_token().await?;
        let url = format!("{}/{}/values/{}", API_BASE, self.spreadsheet_id, range);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheets(format!(
                "Read failed with {}: {}",
                status, body
            )));
        }

        let values: ValueRange = response.json().await?;
        Ok(values.values)
    }
}
