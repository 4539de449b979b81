//! SMTP email delivery via `lettre`.

use async_trait::async_trait;
use engeserv_application::EmailService;
use engeserv_core::{AppError, AppResult};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// SMTP connection settings.
#[derive(Clone)]
pub struct SmtpEmailConfig {
    /// SMTP relay hostname.
    pub host: String,
    /// SMTP relay port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender mailbox, e.g. `Engeserv <nao-responda@engeserv.com.br>`.
    pub from_address: String,
}

impl std::fmt::Debug for SmtpEmailConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SmtpEmailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Email service relaying through an SMTP server over TLS.
#[derive(Clone)]
pub struct SmtpEmailService {
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    /// Builds the transport once; fails on an unusable sender or relay.
    pub fn new(config: SmtpEmailConfig) -> AppResult<Self> {
        let from = config.from_address.parse::<Mailbox>().map_err(|error| {
            AppError::Validation(format!(
                "invalid SMTP_FROM_ADDRESS '{}': {error}",
                config.from_address
            ))
        })?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|error| {
                AppError::Internal(format!("failed to create SMTP transport: {error}"))
            })?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { from, mailer })
    }
}

fn build_message(
    from: Mailbox,
    to: &str,
    subject: &str,
    text_body: &str,
    html_body: Option<&str>,
) -> AppResult<Message> {
    let to = to
        .parse::<Mailbox>()
        .map_err(|error| AppError::Validation(format!("invalid recipient '{to}': {error}")))?;

    let builder = Message::builder().from(from).to(to).subject(subject);

    let message = match html_body {
        Some(html_body) => builder.multipart(MultiPart::alternative_plain_html(
            text_body.to_owned(),
            html_body.to_owned(),
        )),
        None => builder.singlepart(SinglePart::plain(text_body.to_owned())),
    };

    message.map_err(|error| AppError::Internal(format!("failed to build email: {error}")))
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        let message = build_message(self.from.clone(), to, subject, text_body, html_body)?;

        self.mailer
            .send(message)
            .await
            .map_err(|error| AppError::Internal(format!("failed to send email: {error}")))?;

        info!(to, subject, "email sent via smtp");
        Ok(())
    }
}
