//! Email service for transactional customer notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Callers
//! that must never fail on a mail-provider outage use the `try_` variants,
//! which collapse delivery failure into a logged boolean.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for payment receipt email.
#[derive(Template)]
#[template(path = "email/payment_receipt.html")]
struct PaymentReceiptHtml<'a> {
    name: &'a str,
    amount: &'a str,
    reference: &'a str,
}

/// Plain text template for payment receipt email.
#[derive(Template)]
#[template(path = "email/payment_receipt.txt")]
struct PaymentReceiptText<'a> {
    name: &'a str,
    amount: &'a str,
    reference: &'a str,
}

/// HTML template for refund notice email.
#[derive(Template)]
#[template(path = "email/refund_notice.html")]
struct RefundNoticeHtml<'a> {
    name: &'a str,
    amount: &'a str,
    reference: &'a str,
}

/// Plain text template for refund notice email.
#[derive(Template)]
#[template(path = "email/refund_notice.txt")]
struct RefundNoticeText<'a> {
    name: &'a str,
    amount: &'a str,
    reference: &'a str,
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
    /// Returns error if the SMTP transport cannot be configured.
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

    /// Send a payment receipt to a customer.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_payment_receipt(
        &self,
        to: &str,
        name: &str,
        amount: &str,
        reference: &str,
    ) -> Result<(), EmailError> {
        let html = PaymentReceiptHtml {
            name,
            amount,
            reference,
        }
        .render()?;
        let text = PaymentReceiptText {
            name,
            amount,
            reference,
        }
        .render()?;

        self.send_multipart_email(to, "Your payment receipt", &text, &html)
            .await
    }

    /// Send a refund notice to a customer.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_refund_notice(
        &self,
        to: &str,
        name: &str,
        amount: &str,
        reference: &str,
    ) -> Result<(), EmailError> {
        let html = RefundNoticeHtml {
            name,
            amount,
            reference,
        }
        .render()?;
        let text = RefundNoticeText {
            name,
            amount,
            reference,
        }
        .render()?;

        self.send_multipart_email(to, "Your refund has been issued", &text, &html)
            .await
    }

    /// Best-effort payment receipt: delivery failure is logged, never raised.
    pub async fn try_send_payment_receipt(
        &self,
        to: &str,
        name: &str,
        amount: &str,
        reference: &str,
    ) -> bool {
        match self.send_payment_receipt(to, name, amount, reference).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Failed to send payment receipt");
                false
            }
        }
    }

    /// Best-effort refund notice: delivery failure is logged, never raised.
    pub async fn try_send_refund_notice(
        &self,
        to: &str,
        name: &str,
        amount: &str,
        reference: &str,
    ) -> bool {
        match self.send_refund_notice(to, name, amount, reference).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Failed to send refund notice");
                false
            }
        }
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
mod tests {
    use super::*;

    #[test]
    fn test_receipt_templates_render() {
        let html = PaymentReceiptHtml {
            name: "Ada",
            amount: "$42.00",
            reference: "pi_abc123",
        }
        .render()
        .expect("html renders");
        assert!(html.contains("Ada"));
        assert!(html.contains("$42.00"));
        assert!(html.contains("pi_abc123"));

        let text = PaymentReceiptText {
            name: "Ada",
            amount: "$42.00",
            reference: "pi_abc123",
        }
        .render()
        .expect("text renders");
        assert!(text.contains("$42.00"));
    }

    #[test]
    fn test_refund_templates_render() {
        let text = RefundNoticeText {
            name: "Ada",
            amount: "$42.00",
            reference: "pi_abc123",
        }
        .render()
        .expect("text renders");
        assert!(text.contains("refund"));
        assert!(text.contains("pi_abc123"));
    }
}
