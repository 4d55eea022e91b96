//! Error types for outgoing mail.

/// Errors that can occur while composing or delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// A recipient or sender is not a valid mailbox.
    #[error("Invalid address '{address}': {source}")]
    InvalidAddress {
        /// The offending input.
        address: String,
        /// Why it was rejected.
        #[source]
        source: lettre::address::AddressError,
    },

    /// The message has no `To` recipient.
    #[error("At least one recipient is required")]
    NoRecipients,

    /// The message could not be assembled.
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// The relay could not be reached or refused the message.
    #[error("Failed to deliver message: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
