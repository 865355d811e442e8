//! Email service for the installation-complete credentials notice.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. The whole
//! service is optional: without SMTP configuration the flow simply skips
//! the email.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the installation-complete email.
#[derive(Template)]
#[template(path = "email/install_complete.html")]
struct InstallCompleteEmailHtml<'a> {
    shop_name: &'a str,
    password: &'a str,
    login_url: &'a str,
}

/// Plain text template for the installation-complete email.
#[derive(Template)]
#[template(path = "email/install_complete.txt")]
struct InstallCompleteEmailText<'a> {
    shop_name: &'a str,
    password: &'a str,
    login_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the installation-complete email with the generated credentials.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_install_complete(
        &self,
        to: &str,
        shop_name: &str,
        password: &str,
        login_url: &str,
    ) -> Result<(), EmailError> {
        let html = InstallCompleteEmailHtml {
            shop_name,
            password,
            login_url,
        }
        .render()?;
        let text = InstallCompleteEmailText {
            shop_name,
            password,
            login_url,
        }
        .render()?;

        self.send_multipart_email(to, "Your store installation is complete", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_install_complete_templates_render_credentials() {
        let html = InstallCompleteEmailHtml {
            shop_name: "Example Store",
            password: "s3cretPass",
            login_url: "https://app.example.com/login",
        }
        .render()
        .unwrap();
        let text = InstallCompleteEmailText {
            shop_name: "Example Store",
            password: "s3cretPass",
            login_url: "https://app.example.com/login",
        }
        .render()
        .unwrap();

        for body in [&html, &text] {
            assert!(body.contains("Example Store"));
            assert!(body.contains("s3cretPass"));
            assert!(body.contains("https://app.example.com/login"));
        }
    }
}
