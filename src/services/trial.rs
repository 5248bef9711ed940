use chrono::{DateTime, Duration, Utc};

use crate::crypto::token::generate_download_token;
use crate::error::{AppError, Result};
use crate::mail::Mailer;
use crate::models::lead::TrialRequestRecord;
use crate::repositories::lead::LeadStore;

/// Issues a new trial download link.
///
/// Generates a fresh token, appends the record to the lead store and sends
/// the trial email. The store write is best-effort: a failed append is logged
/// and swallowed so the user still receives their link, at the cost of a
/// later "not found" on redemption. Nothing is rolled back on partial
/// failure.
///
/// # Returns
///
/// A `Result` containing the issued token.
pub async fn issue(
    store: &impl LeadStore,
    mailer: &impl Mailer,
    email: &str,
    fingerprint: Option<String>,
) -> Result<String> {
    let token = generate_download_token()?;
    let record = TrialRequestRecord::new(
        email.to_string(),
        fingerprint,
        token.clone(),
        Utc::now(),
    );

    match store.append(&record).await {
        Ok(()) => {
            tracing::info!("✅ Trial request recorded for {}", email);
        }
        Err(e) => {
            tracing::warn!(
                "⚠️ Failed to record trial request for {}, sending the link anyway: {}",
                email,
                e
            );
        }
    }

    mailer.send_trial_link(email, &token).await?;

    Ok(token)
}

/// Whether a record issued at `requested_at` is expired at `now`.
///
/// The boundary instant itself is still redeemable.
pub fn is_expired(requested_at: DateTime<Utc>, now: DateTime<Utc>, validity: Duration) -> bool {
    now > requested_at + validity
}

/// Redeems a download token.
///
/// Looks the token up by exact match and checks it against the validity
/// window. Redemption never mutates the record, so a valid token stays
/// redeemable for the whole window regardless of how often it is used.
///
/// # Returns
///
/// A `Result` containing the matching record.
pub async fn redeem(
    store: &impl LeadStore,
    token: &str,
    now: DateTime<Utc>,
    validity_hours: i64,
) -> Result<TrialRequestRecord> {
    let record = store
        .find_by_token(token)
        .await?
        .ok_or(AppError::NotFound)?;

    if is_expired(record.requested_at, now, Duration::hours(validity_hours)) {
        return Err(AppError::Expired {
            hours: validity_hours,
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::token::TOKEN_HEX_LEN;
    use crate::models::lead::{ContactMessage, NO_FINGERPRINT};
    use std::sync::Mutex;

    /// In-memory `LeadStore` double. `fail_appends` simulates an unreachable
    /// tabular store.
    #[derive(Default)]
    struct InMemoryStore {
        rows: Mutex<Vec<TrialRequestRecord>>,
        fail_appends: bool,
    }

    impl InMemoryStore {
        fn with_record(record: TrialRequestRecord) -> Self {
            Self {
                rows: Mutex::new(vec![record]),
                fail_appends: false,
            }
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    impl LeadStore for InMemoryStore {
        async fn append(&self, record: &TrialRequestRecord) -> Result<()> {
            if self.fail_appends {
                return Err(AppError::Sheets("store unreachable".to_string()));
            }
            self.rows.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn find_by_token(&self, token: &str) -> Result<Option<TrialRequestRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.token == token)
                .cloned())
        }
    }

    /// `Mailer` double recording every (recipient, token) pair it was asked
    /// to deliver.
    #[derive(Default)]
    struct RecordingMailer {
        trial_sends: Mutex<Vec<(String, String)>>,
        contact_sends: Mutex<Vec<ContactMessage>>,
    }

    impl Mailer for RecordingMailer {
        async fn send_trial_link(&self, to: &str, token: &str) -> Result<()> {
            self.trial_sends
                .lock()
                .unwrap()
                .push((to.to_string(), token.to_string()));
            Ok(())
        }

        async fn send_contact_relay(&self, msg: &ContactMessage) -> Result<()> {
            self.contact_sends.lock().unwrap().push(msg.clone());
            Ok(())
        }
    }

    fn record_with_age(token: &str, age: Duration) -> TrialRequestRecord {
        TrialRequestRecord::new(
            "a@x.com".to_string(),
            None,
            token.to_string(),
            Utc::now() - age,
        )
    }

    #[tokio::test]
    async fn issue_appends_one_record_and_emails_the_token() {
        let store = InMemoryStore::default();
        let mailer = RecordingMailer::default();

        let token = issue(&store, &mailer, "a@x.com", None).await.unwrap();

        assert_eq!(token.len(), TOKEN_HEX_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(store.len(), 1);
        let stored = store.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(stored.email, "a@x.com");
        assert_eq!(stored.fingerprint, NO_FINGERPRINT);

        let sends = mailer.trial_sends.lock().unwrap();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0], ("a@x.com".to_string(), token));
    }

    #[tokio::test]
    async fn issue_keeps_client_fingerprint_when_present() {
        let store = InMemoryStore::default();
        let mailer = RecordingMailer::default();

        let token = issue(&store, &mailer, "a@x.com", Some("fp-9".to_string()))
            .await
            .unwrap();

        let stored = store.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(stored.fingerprint, "fp-9");
    }

    #[tokio::test]
    async fn issue_swallows_append_failure_and_still_sends_email() {
        let store = InMemoryStore {
            fail_appends: true,
            ..Default::default()
        };
        let mailer = RecordingMailer::default();

        let token = issue(&store, &mailer, "a@x.com", None).await.unwrap();

        assert_eq!(store.len(), 0);
        let sends = mailer.trial_sends.lock().unwrap();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].1, token);
    }

    #[tokio::test]
    async fn redeem_unknown_token_is_not_found() {
        let store = InMemoryStore::with_record(record_with_age("aaaa", Duration::hours(1)));

        let err = redeem(&store, "bbbb", Utc::now(), 12).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn redeem_within_window_returns_the_record() {
        let store = InMemoryStore::with_record(record_with_age("aaaa", Duration::hours(11)));

        let record = redeem(&store, "aaaa", Utc::now(), 12).await.unwrap();
        assert_eq!(record.email, "a@x.com");
    }

    #[tokio::test]
    async fn redeem_immediately_after_issue_succeeds() {
        let store = InMemoryStore::default();
        let mailer = RecordingMailer::default();

        let token = issue(&store, &mailer, "a@x.com", None).await.unwrap();
        let record = redeem(&store, &token, Utc::now(), 12).await.unwrap();
        assert_eq!(record.fingerprint, NO_FINGERPRINT);
    }

    #[tokio::test]
    async fn redeem_past_window_is_expired_and_cites_the_window() {
        let store = InMemoryStore::with_record(record_with_age("aaaa", Duration::hours(13)));

        let err = redeem(&store, "aaaa", Utc::now(), 12).await.unwrap_err();
        assert!(matches!(err, AppError::Expired { hours: 12 }));
    }

    #[tokio::test]
    async fn redeem_twice_within_window_succeeds_both_times() {
        // Current behavior: redemption never consumes the record, so a link
        // keeps working for the whole window.
        let store = InMemoryStore::with_record(record_with_age("aaaa", Duration::hours(1)));

        assert!(redeem(&store, "aaaa", Utc::now(), 12).await.is_ok());
        assert!(redeem(&store, "aaaa", Utc::now(), 12).await.is_ok());
    }

    #[test]
    fn expiry_boundary_is_still_redeemable() {
        let requested_at = Utc::now();
        let window = Duration::hours(12);

        assert!(!is_expired(requested_at, requested_at + window, window));
        assert!(is_expired(
            requested_at,
            requested_at + window + Duration::seconds(1),
            window
        ));
    }
}
