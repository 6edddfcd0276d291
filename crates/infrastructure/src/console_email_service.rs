//! Email service that writes messages to the log instead of sending them.

use async_trait::async_trait;
use attenthive_application::EmailService;
use attenthive_core::AppResult;
use tracing::info;

/// Development email service; every message becomes one `info` event.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a new console email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        info!(
            to,
            subject,
            has_html = html_body.is_some(),
            "outgoing email (console)\n{text_body}"
        );

        Ok(())
    }
}
