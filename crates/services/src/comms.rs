//! Fire-and-forget mail dispatch. Sends run on a spawned task with no
//! ordering guarantee relative to the request that triggered them and no
//! retry; failures are logged and dropped.

use std::sync::Arc;

use async_trait::async_trait;
use domains::{Account, Mailer, Result};

pub fn dispatch_account_confirmation(mailer: Arc<dyn Mailer>, account: Account, token: String) {
    tokio::spawn(async move {
        if let Err(error) = mailer.send_account_confirmation(&account, &token).await {
            tracing::warn!(%error, account = account.id, "confirmation email failed");
        }
    });
}

pub fn dispatch_password_reset(mailer: Arc<dyn Mailer>, account: Account, token: String) {
    tokio::spawn(async move {
        if let Err(error) = mailer.send_password_reset(&account, &token).await {
            tracing::warn!(%error, account = account.id, "password reset email failed");
        }
    });
}

/// Mailer that logs instead of sending, for deployments without outbound
/// mail and for tests.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_account_confirmation(&self, account: &Account, token: &str) -> Result<()> {
        tracing::info!(account = account.id, email = %account.email, token, "confirmation email (log only)");
        Ok(())
    }

    async fn send_password_reset(&self, account: &Account, token: &str) -> Result<()> {
        tracing::info!(account = account.id, email = %account.email, token, "password reset email (log only)");
        Ok(())
    }
}
