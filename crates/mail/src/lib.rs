//! Outgoing mail for mailgate.
//!
//! [`OutgoingEmail`] is what the send form produces, a [`Mailer`] delivers it.
//! [`SmtpMailer`] hands messages to the configured relay.

#![deny(missing_docs)]

mod email;
mod error;
mod smtp;

pub use email::{Attachment, OutgoingEmail, parse_address_list};
pub use error::MailError;
pub use smtp::SmtpMailer;

/// Delivers outgoing email.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message. Returns once the relay accepted it.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
