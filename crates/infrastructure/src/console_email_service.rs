//! Development email delivery: messages are written to the log.

use async_trait::async_trait;
use engeserv_application::EmailService;
use engeserv_core::AppResult;
use tracing::info;

/// Email service that logs each message instead of sending it.
#[derive(Clone, Default)]
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
            "email (console delivery)\n{text_body}"
        );

        Ok(())
    }
}
