pub mod digest_email;
pub mod mailer;

pub use digest_email::format_digest_email;
pub use mailer::{MailError, SmtpMailer, SmtpMailerConfig};
