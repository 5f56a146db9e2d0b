pub mod http;

use async_trait::async_trait;

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Used when no mail API key is configured; sends nothing.
pub struct NoopMailer;

#[async_trait]
impl MailProvider for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        tracing::debug!("mail disabled, skipping send to {to}: {subject}");
        Ok(())
    }
}
