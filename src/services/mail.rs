//! Outgoing mail
//!
//! Delivery itself is out of scope; the default mailer writes the message to
//! the log so the reset link can be picked up during development.

use async_trait::async_trait;
use tracing::info;

use crate::utils::errors::Result;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a password reset link
    async fn send_password_reset(&self, email: &str, reset_url: &str) -> Result<()>;
}

/// Mailer that logs instead of sending
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, email: &str, reset_url: &str) -> Result<()> {
        info!(email = email, reset_url = reset_url, "Password reset link issued");
        Ok(())
    }
}
