//! Delivery through an SMTP relay.

use config::{MailConfig, SmtpSecurity};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use secrecy::ExposeSecret;

use crate::{Mailer, MailError, OutgoingEmail};

/// Sends mail through the relay from [`MailConfig`].
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    /// Build a mailer for the configured relay. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let tls = match config.security {
            SmtpSecurity::None => Tls::None,
            SmtpSecurity::Opportunistic => Tls::Opportunistic(TlsParameters::new(config.host.clone())?),
            SmtpSecurity::Starttls => Tls::Required(TlsParameters::new(config.host.clone())?),
            SmtpSecurity::Tls => Tls::Wrapper(TlsParameters::new(config.host.clone())?),
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls)
            .timeout(config.timeout);

        match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder = builder.credentials(Credentials::new(
                    username.clone(),
                    password.expose_secret().to_string(),
                ));
            }
            (Some(_), None) | (None, Some(_)) => {
                log::warn!("Only one of mail.username and mail.password is set, sending without authentication");
            }
            (None, None) => (),
        }

        log::debug!(
            "Configured SMTP relay {}:{} with {:?} security",
            config.host,
            config.port,
            config.security
        );

        Ok(Self {
            transport: builder.build(),
            sender: config.sender.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = email.to_message(&self.sender)?;
        let response = self.transport.send(message).await?;

        log::debug!(
            "Relay accepted message to {} recipient(s): {}",
            email.to.len() + email.cc.len(),
            response.code()
        );

        Ok(())
    }
}
