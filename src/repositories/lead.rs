use std::future::Future;

use subtle::ConstantTimeEq;

use crate::error::Result;
use crate::models::lead::TrialRequestRecord;
use crate::sheets::SheetsClient;

/// Appends land at the top of the sheet's table; the API locates the last row.
const APPEND_RANGE: &str = "A1";
/// Data rows live below the header row.
const SCAN_RANGE: &str = "A2:D";

/// Row-oriented access to the lead store.
///
/// This trait abstracts over the tabular persistence service so the issuance
/// and redemption services can be exercised against an in-memory double.
pub trait LeadStore: Send + Sync {
    /// Appends a new trial request record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write or is unreachable.
    fn append(
        &self,
        record: &TrialRequestRecord,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Finds the record whose token exactly matches `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a matching row is
    /// malformed. An absent token is `Ok(None)`, not an error.
    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<TrialRequestRecord>>> + Send;
}

/// Index of the token column within a data row.
const TOKEN_CELL: usize = 3;

impl LeadStore for SheetsClient {
    async fn append(&self, record: &TrialRequestRecord) -> Result<()> {
        self.append_row(APPEND_RANGE, record.to_row()).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<TrialRequestRecord>> {
        let rows = self.read_rows(SCAN_RANGE).await?;

        // Linear scan over every stored row. Fine at lead-capture volume,
        // but a scalability ceiling once the sheet grows large.
        for row in &rows {
            let Some(stored) = row.get(TOKEN_CELL) else {
                continue;
            };

            let matches: bool = stored.as_bytes().ct_eq(token.as_bytes()).into();
            if matches {
                return TrialRequestRecord::from_row(row).map(Some);
            }
        }

        Ok(None)
    }
}
