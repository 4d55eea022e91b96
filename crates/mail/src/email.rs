//! The message model behind the send form.

use lettre::{
    Message,
    message::{Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart, header::ContentType},
};

use crate::error::MailError;

/// A message as submitted by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon copy recipients.
    pub cc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Message body, sent as HTML.
    pub html_body: String,
    /// Optional file attached to the message.
    pub attachment: Option<Attachment>,
}

/// A file attached to an [`OutgoingEmail`].
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name presented to the recipient.
    pub filename: String,
    /// MIME type as reported by the uploader.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub content: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Splits a comma separated address field, dropping blank entries.
pub fn parse_address_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::InvalidAddress {
        address: address.to_string(),
        source,
    })
}

impl OutgoingEmail {
    /// Checks that every address parses and at least one recipient exists.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        for address in self.to.iter().chain(&self.cc) {
            parse_mailbox(address)?;
        }

        Ok(())
    }

    /// Assembles the message sent from `sender`.
    pub fn to_message(&self, sender: &str) -> Result<Message, MailError> {
        self.validate()?;

        let mut builder = Message::builder().from(parse_mailbox(sender)?).subject(&self.subject);

        for address in &self.to {
            builder = builder.to(parse_mailbox(address)?);
        }

        for address in &self.cc {
            builder = builder.cc(parse_mailbox(address)?);
        }

        let message = match &self.attachment {
            None => builder.header(ContentType::TEXT_HTML).body(self.html_body.clone())?,
            Some(attachment) => {
                let content_type = attachment
                    .content_type
                    .as_deref()
                    .and_then(|value| ContentType::parse(value).ok())
                    .unwrap_or_else(|| ContentType::parse("application/octet-stream").expect("valid MIME type"));

                let file = AttachmentPart::new(attachment.filename.clone()).body(attachment.content.clone(), content_type);

                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::html(self.html_body.clone()))
                        .singlepart(file),
                )?
            }
        };

        Ok(message)
    }
}
