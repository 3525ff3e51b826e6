//! Outbound email.
//!
//! Services depend on the [`Mailer`] trait only. The binary wires in [`LogMailer`],
//! which records each message through `tracing`; delivery to an SMTP relay or provider
//! sits behind the same trait.

use crate::errors::Result;
use async_trait::async_trait;
use tracing::info;

/// Subject line of the password reset email
pub const RESET_PASSWORD_SUBJECT: &str = "Code Verification Reset Password";

/// A fully rendered message ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient address
    pub to: String,
    /// Sender address
    pub from: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// Sends rendered email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hands `email` to the transport.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Mail`] when the transport rejects the message.
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// Mailer that writes each message to the log instead of a network transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "Outbound email"
        );
        Ok(())
    }
}

/// Renders the password reset email carrying the verification link and code.
#[must_use]
pub fn reset_password_email(from: &str, to: &str, link: &str, code: &str) -> OutboundEmail {
    let html = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body style=\"font-family: sans-serif;\">\n\
         <h2>Reset your password</h2>\n\
         <p>A password reset was requested for <strong>{to}</strong>.</p>\n\
         <p>Your verification code is:</p>\n\
         <p style=\"font-size: 24px; letter-spacing: 4px;\"><strong>{code}</strong></p>\n\
         <p><a href=\"{link}\">Enter the code here</a></p>\n\
         <p>If you did not ask for this, you can ignore this email.</p>\n\
         </body>\n\
         </html>\n"
    );
    OutboundEmail {
        to: to.to_string(),
        from: from.to_string(),
        subject: RESET_PASSWORD_SUBJECT.to_string(),
        html,
    }
}
