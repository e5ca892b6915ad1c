pub mod mailgun;

pub use mailgun::*;

use async_trait::async_trait;

/// Delivers plaintext e-mail. Returns whether the message was accepted;
/// implementations log and swallow their own failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> bool;
}

/// Notifier used when no mail provider is configured. Logs and drops.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> bool {
        tracing::info!(to = %to, subject = %subject, body = %text, "E-mail delivery disabled");
        false
    }
}
