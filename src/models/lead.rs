use chrono::{DateTime, SecondsFormat, Utc};
use crate::error::{AppError, Result};

// Sheet column names, in storage order. These are exact-match keys shared by
// issuance and redemption; renaming a column breaks both.

/// The sheet column holding the requester's email address.
pub const COL_EMAIL: &str = "Email";
/// The sheet column holding the request timestamp.
pub const COL_REQUESTED_AT: &str = "Fecha de Solicitud";
/// The sheet column holding the client fingerprint.
pub const COL_FINGERPRINT: &str = "Fingerprint";
/// The sheet column holding the download token.
pub const COL_TOKEN: &str = "TokenUnico";

/// Sentinel stored when the client supplies no fingerprint.
pub const NO_FINGERPRINT: &str = "no-fingerprint";

/// One trial request, as persisted in the lead store.
///
/// Records are append-only: the redeemer reads them but never mutates or
/// deletes them, so expired and already-used tokens stay findable.
#[derive(Clone, Debug)]
pub struct TrialRequestRecord {
    /// The requester's email address.
    pub email: String,
    /// When the trial was requested. Immutable after creation; the validity
    /// window is derived from this, never stored separately.
    pub requested_at: DateTime<Utc>,
    /// Opaque client fingerprint, diagnostics only.
    pub fingerprint: String,
    /// The opaque download token generated at issuance.
    pub token: String,
}

impl TrialRequestRecord {
    /// Creates a new record, defaulting the fingerprint to its sentinel.
    pub fn new(
        email: String,
        fingerprint: Option<String>,
        token: String,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email,
            requested_at,
            fingerprint: fingerprint
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| NO_FINGERPRINT.to_string()),
            token,
        }
    }

    /// Serializes the record into a sheet row in `HEADER_ROW` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.requested_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.fingerprint.clone(),
            self.token.clone(),
        ]
    }

    /// Parses a sheet row back into a record.
    pub fn from_row(row: &[String]) -> Result<Self> {
        let cell = |idx: usize, name: &str| -> Result<&String> {
            row.get(idx)
                .ok_or_else(|| AppError::Sheets(format!("Row is missing the '{}' column", name)))
        };

        let requested_at = DateTime::parse_from_rfc3339(cell(1, COL_REQUESTED_AT)?)
            .map_err(|e| AppError::Sheets(format!("Bad '{}' timestamp: {}", COL_REQUESTED_AT, e)))?
            .with_timezone(&Utc);

        Ok(Self {
            email: cell(0, COL_EMAIL)?.clone(),
            requested_at,
            fingerprint: cell(2, COL_FINGERPRINT)?.clone(),
            token: cell(3, COL_TOKEN)?.clone(),
        })
    }
}

/// A contact-form submission relayed by email.
#[derive(Clone, Debug)]
pub struct ContactMessage {
    /// The sender's name, possibly empty.
    pub name: String,
    /// The sender's email address.
    pub email: String,
    /// The message body, possibly empty.
    pub message: String,
}
