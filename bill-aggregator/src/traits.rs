use crate::legiscan::LegiscanClient;
use crate::types::{BillRecord, Result};
use async_trait::async_trait;
use interfaces::defs::Recipient;

/// Full-text bill search collaborator. The digest job is written against
/// this trait so tests can count and script external calls.
#[async_trait]
pub trait BillSearch: Send + Sync {
    async fn text_search(&self, query: &str) -> Result<Vec<BillRecord>>;
}

#[async_trait]
impl BillSearch for LegiscanClient {
    async fn text_search(&self, query: &str) -> Result<Vec<BillRecord>> {
        self.search(query).await
    }
}

/// Mail dispatch collaborator: one message per user with non-empty digest
/// content. Failures are reported, not retried.
#[async_trait]
pub trait DigestMailer: Send + Sync {
    async fn send_digest(
        &self,
        recipient: &Recipient,
        subject: &str,
        html_body: &str,
        from: &str,
    ) -> Result<()>;
}

#[async_trait]
impl DigestMailer for email_digest::SmtpMailer {
    async fn send_digest(
        &self,
        recipient: &Recipient,
        subject: &str,
        html_body: &str,
        from: &str,
    ) -> Result<()> {
        // Plain-text part stays empty; the digest is an HTML message
        self.send(subject, "", from, &recipient.email, html_body)
            .await?;
        Ok(())
    }
}
