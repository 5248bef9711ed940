use crate::config::Config;
use crate::error::Result;
use crate::mail::SmtpMailer;
use crate::sheets::SheetsClient;

/// The application's state.
///
/// Everything here is request-scoped plumbing around the external
/// collaborators; there is no cross-request cache or shared mutable state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The Sheets-backed lead store client.
    pub sheets: SheetsClient,
    /// The SMTP mailer.
    pub mailer: SmtpMailer,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let sheets = SheetsClient::new(config);
        tracing::info!("✅ Sheets client initialized for spreadsheet {}", config.spreadsheet_id);

        let mailer = SmtpMailer::new(config)?;
        tracing::info!("✅ SMTP mailer initialized for relay {}", config.smtp_host);

        Ok(AppState {
            config: config.clone(),
            sheets,
            mailer,
        })
    }
}
