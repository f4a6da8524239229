use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid SMTP URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub type Result<T> = std::result::Result<T, MailError>;

#[derive(Clone)]
pub struct SmtpMailerConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
}

impl SmtpMailerConfig {
    /// Parse mailer configuration from a URI plus a separately supplied
    /// password. Expected URI format: smtp://username@server:port?tls=true
    pub fn from_uri(uri: &str, password: &str) -> Result<Self> {
        let parsed = Url::parse(uri).map_err(|e| MailError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "smtp" {
            return Err(MailError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("URI must use 'smtp://' scheme, got: {}", parsed.scheme()),
            });
        }

        let server = parsed
            .host_str()
            .ok_or_else(|| MailError::InvalidUri {
                uri: uri.to_string(),
                reason: "no server specified".to_string(),
            })?
            .to_string();

        let port = parsed.port().unwrap_or(587); // Default to submission port

        let username = {
            let user = parsed.username();
            if user.is_empty() {
                return Err(MailError::InvalidUri {
                    uri: uri.to_string(),
                    reason: "no username specified".to_string(),
                });
            }
            // Usernames are often full addresses and arrive percent-encoded
            user.replace("%40", "@")
        };

        let use_tls = parsed
            .query_pairs()
            .find(|(key, _)| key == "tls")
            .map(|(_, value)| value.parse().unwrap_or(true))
            .unwrap_or(true);

        Ok(Self {
            server,
            port,
            username,
            password: password.to_string(),
            use_tls,
        })
    }
}

/// Sends digest e-mails over SMTP using lettre's async transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: SmtpMailerConfig) -> Result<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
                .port(config.port)
                .credentials(credentials)
                .build()
        } else {
            // Plaintext transport, for local test servers only
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
                .port(config.port)
                .credentials(credentials)
                .build()
        };

        Ok(Self { transport })
    }

    /// Send one message with an empty plain-text part and an HTML body.
    pub async fn send(
        &self,
        subject: &str,
        plain_body: &str,
        from: &str,
        to: &str,
        html_body: &str,
    ) -> Result<()> {
        let from_mailbox: Mailbox = from.parse()?;
        let to_mailbox: Mailbox = to.parse()?;

        let message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                plain_body.to_string(),
                html_body.to_string(),
            ))?;

        debug!("Sending '{}' to {}", subject, to);
        self.transport.send(message).await?;
        info!("Sent '{}' to {}", subject, to);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_smtp_uri() {
        let config =
            SmtpMailerConfig::from_uri("smtp://digest%40example.org@mail.example.org:2525?tls=false", "secret")
                .unwrap();
        assert_eq!(config.server, "mail.example.org");
        assert_eq!(config.port, 2525);
        assert_eq!(config.username, "digest@example.org");
        assert_eq!(config.password, "secret");
        assert!(!config.use_tls);
    }

    #[test]
    fn defaults_port_and_tls() {
        let config = SmtpMailerConfig::from_uri("smtp://digest@mail.example.org", "secret").unwrap();
        assert_eq!(config.port, 587);
        assert!(config.use_tls);
    }

    #[test]
    fn rejects_non_smtp_scheme() {
        let result = SmtpMailerConfig::from_uri("imap://digest@mail.example.org", "secret");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_username() {
        let result = SmtpMailerConfig::from_uri("smtp://mail.example.org", "secret");
        assert!(result.is_err());
    }
}
