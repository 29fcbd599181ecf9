//! Email service for transactional notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Two
//! messages exist: the order confirmation and the password-reset link.
//! Delivery is fire-and-forget - callers spawn the send and log failures.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use dogear_core::Email;

use crate::config::SmtpConfig;
use crate::models::Order;

/// One purchased line, pre-formatted for the email templates.
struct OrderLineView {
    title: String,
    quantity: i32,
    line_total: String,
}

/// HTML template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    name: &'a str,
    order_id: String,
    lines: &'a [OrderLineView],
    total: String,
}

/// Plain text template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    name: &'a str,
    order_id: String,
    lines: &'a [OrderLineView],
    total: String,
}

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    name: &'a str,
    reset_url: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    name: &'a str,
    reset_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
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
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl Mailer {
    /// Create a new mailer from SMTP configuration.
    ///
    /// Without credentials the relay is used unauthenticated and
    /// unencrypted (a local dev catcher such as mailpit).
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host is invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
                    .port(config.port)
                    .credentials(Credentials::new(
                        username.clone(),
                        password.expose_secret().to_string(),
                    ))
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port),
        };

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
        })
    }

    /// Send the order confirmation for a freshly placed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the email fails to render or send.
    pub async fn send_order_confirmation(
        &self,
        to: &Email,
        name: &str,
        order: &Order,
    ) -> Result<(), MailError> {
        let lines: Vec<OrderLineView> = order
            .items
            .iter()
            .map(|item| OrderLineView {
                title: item.book_title.clone(),
                quantity: item.quantity,
                line_total: item.line_total().to_string(),
            })
            .collect();
        let order_id = order.id.to_string();
        let total = order.total().to_string();

        let html = OrderConfirmationHtml {
            name,
            order_id: order_id.clone(),
            lines: &lines,
            total: total.clone(),
        }
        .render()?;
        let text = OrderConfirmationText {
            name,
            order_id,
            lines: &lines,
            total,
        }
        .render()?;

        self.send_multipart_email(to.as_str(), "Order Confirmation", &text, &html)
            .await
    }

    /// Send the password reset link.
    ///
    /// # Errors
    ///
    /// Returns an error if the email fails to render or send.
    pub async fn send_password_reset(
        &self,
        to: &Email,
        name: &str,
        reset_url: &str,
    ) -> Result<(), MailError> {
        let html = PasswordResetHtml { name, reset_url }.render()?;
        let text = PasswordResetText { name, reset_url }.render()?;

        self.send_multipart_email(to.as_str(), "Resetting Your Password", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
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

        self.transport.send(email).await?;
        Ok(())
    }
}
