//! # Account operations
//!
//! Registration, email confirmation, login, password reset and the
//! self-service/admin update paths. Passwords are hashed before they cross
//! the repository boundary; confirmation and reset emails are dispatched
//! fire-and-forget.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Account, AccountAdminUpdate, AccountPatch, AccountProfileUpdate, AccountRecord, AccountRepo,
    AuthorSelector, BlogFilter, BlogPatch, BlogRepo, DomainError, Mailer, NewAccount,
    PasswordHasher, Result, TokenIssuer, TokenPurpose,
};

use crate::comms;
use crate::policy::PolicyEngine;

/// Default lifetime of confirm/reset tokens.
pub const TOKEN_TTL_SECS: i64 = 600;

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepo>,
    blogs: Arc<dyn BlogRepo>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    mailer: Arc<dyn Mailer>,
    policy: Arc<PolicyEngine>,
    token_ttl_secs: i64,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        blogs: Arc<dyn BlogRepo>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        mailer: Arc<dyn Mailer>,
        policy: Arc<PolicyEngine>,
    ) -> Self {
        Self {
            accounts,
            blogs,
            hasher,
            tokens,
            mailer,
            policy,
            token_ttl_secs: TOKEN_TTL_SECS,
        }
    }

    /// Override the confirm/reset token lifetime (settings-driven).
    pub fn with_token_ttl(mut self, secs: i64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Register a new, unconfirmed account and dispatch the confirmation
    /// email. A blank display name falls back to the username.
    pub async fn register(&self, request: NewAccount) -> Result<Account> {
        let display = match request.display {
            Some(display) if !display.trim().is_empty() => display,
            _ => request.username.clone(),
        };
        let record = AccountRecord {
            username: request.username,
            display,
            email: request.email,
            password: self.hasher.hash(&request.password)?,
            admin: false,
            confirmed: false,
        };
        let account = self.accounts.insert(record).await.map_err(|error| {
            tracing::error!(%error, "account insert failed");
            DomainError::UnableToCreate("account")
        })?;
        tracing::info!(account = account.id, username = %account.username, "account registered");

        match self
            .tokens
            .issue(account.id, TokenPurpose::ConfirmEmail, self.token_ttl_secs)
        {
            Ok(token) => {
                comms::dispatch_account_confirmation(self.mailer.clone(), account.clone(), token)
            }
            Err(error) => {
                tracing::warn!(%error, account = account.id, "could not issue confirmation token")
            }
        }
        Ok(account)
    }

    /// Exchange a confirm-email token for a confirmed account.
    pub async fn confirm_email(&self, token: &str) -> Result<Account> {
        let id = self.tokens.verify(token, TokenPurpose::ConfirmEmail)?;
        let account = self.get(id).await?;
        if account.confirmed {
            return Ok(account);
        }
        self.accounts
            .update(
                id,
                AccountPatch {
                    confirmed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(|error| {
                tracing::error!(%error, account = id, "confirmation update failed");
                DomainError::UnableToUpdate("account")
            })
    }

    /// Validate credentials for login and record the account as seen.
    pub async fn check_login(&self, email: &str, password: &str) -> Result<Account> {
        let account = self
            .accounts
            .find(None, Some(email))
            .await?
            .ok_or(DomainError::NotFound("account"))?;
        if !self.hasher.verify(password, &account.password) {
            return Err(DomainError::InvalidPassword);
        }
        if !self.policy.account_confirmed(&account) {
            return Err(DomainError::EmailNotConfirmed);
        }
        self.accounts.touch_seen(account.id, Utc::now()).await?;
        Ok(account)
    }

    /// Issue a reset token for the account behind `email` and dispatch the
    /// reset email.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let account = self
            .accounts
            .find(None, Some(email))
            .await?
            .ok_or(DomainError::NotFound("account"))?;
        let token = self
            .tokens
            .issue(account.id, TokenPurpose::ResetPassword, self.token_ttl_secs)?;
        comms::dispatch_password_reset(self.mailer.clone(), account, token);
        Ok(())
    }

    /// Exchange a reset token for a new password.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Account> {
        let id = self.tokens.verify(token, TokenPurpose::ResetPassword)?;
        let password = self.hasher.hash(new_password)?;
        self.accounts
            .update(
                id,
                AccountPatch {
                    password: Some(password),
                    ..Default::default()
                },
            )
            .await
            .map_err(|error| {
                tracing::error!(%error, account = id, "password reset failed");
                DomainError::UnableToUpdate("account")
            })
    }

    /// The self-service field subset.
    pub async fn update_profile(&self, id: i64, update: AccountProfileUpdate) -> Result<Account> {
        let account = self.get(id).await?;
        let patch = self.profile_patch(&account, update)?;
        self.accounts.update(id, patch).await.map_err(|error| {
            tracing::error!(%error, account = id, "account update failed");
            DomainError::UnableToUpdate("account")
        })
    }

    /// The broader admin field set, including role and confirmation flags.
    pub async fn admin_update(&self, id: i64, update: AccountAdminUpdate) -> Result<Account> {
        let account = self.get(id).await?;
        let mut patch = self.profile_patch(&account, update.profile)?;
        patch.admin = update.admin;
        patch.confirmed = update.confirmed;
        self.accounts.update(id, patch).await.map_err(|error| {
            tracing::error!(%error, account = id, "account update failed");
            DomainError::UnableToUpdate("account")
        })
    }

    /// Delete the account. Authored blogs are either deleted with it or
    /// detached (author set to none), per `delete_blogs`.
    pub async fn delete(&self, account: &Account, delete_blogs: bool) -> Result<()> {
        let owned = self
            .blogs
            .list(BlogFilter {
                author: Some(AuthorSelector::Account(account.id)),
                ..Default::default()
            })
            .await?;
        for blog in owned {
            let outcome = if delete_blogs {
                self.blogs.delete(blog.id).await
            } else {
                self.blogs
                    .update(
                        blog.id,
                        BlogPatch {
                            author_id: Some(None),
                            ..Default::default()
                        },
                    )
                    .await
                    .map(|_| ())
            };
            outcome.map_err(|error| {
                tracing::error!(%error, account = account.id, blog = blog.id, "blog cleanup failed");
                DomainError::UnableToDelete("account")
            })?;
        }
        self.accounts.delete(account.id).await.map_err(|error| {
            tracing::error!(%error, account = account.id, "account delete failed");
            DomainError::UnableToDelete("account")
        })?;
        tracing::info!(account = account.id, delete_blogs, "account deleted");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Account> {
        self.accounts
            .get(id)
            .await?
            .ok_or(DomainError::NotFound("account"))
    }

    /// Case-insensitive lookup by username and/or email.
    pub async fn find(&self, username: Option<&str>, email: Option<&str>) -> Result<Account> {
        self.accounts
            .find(username, email)
            .await?
            .ok_or(DomainError::NotFound("account"))
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        self.accounts.list().await
    }

    fn profile_patch(
        &self,
        account: &Account,
        update: AccountProfileUpdate,
    ) -> Result<AccountPatch> {
        let username = update.username;
        let display = update.display.map(|display| {
            if display.trim().is_empty() {
                // Blank display resets to the (possibly updated) username.
                username
                    .clone()
                    .unwrap_or_else(|| account.username.clone())
            } else {
                display
            }
        });
        let password = update
            .password
            .map(|password| self.hasher.hash(&password))
            .transpose()?;
        Ok(AccountPatch {
            username,
            display,
            email: update.email,
            about: update.about,
            password,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyOptions;
    use crate::testutil::{account, blog};
    use domains::{
        MockAccountRepo, MockBlogRepo, MockMailer, MockPasswordHasher, MockTokenIssuer,
    };

    struct Fixture {
        accounts: MockAccountRepo,
        blogs: MockBlogRepo,
        hasher: MockPasswordHasher,
        tokens: MockTokenIssuer,
        mailer: MockMailer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                accounts: MockAccountRepo::new(),
                blogs: MockBlogRepo::new(),
                hasher: MockPasswordHasher::new(),
                tokens: MockTokenIssuer::new(),
                mailer: MockMailer::new(),
            }
        }

        fn service(self) -> AccountService {
            AccountService::new(
                Arc::new(self.accounts),
                Arc::new(self.blogs),
                Arc::new(self.hasher),
                Arc::new(self.tokens),
                Arc::new(self.mailer),
                Arc::new(PolicyEngine::new(PolicyOptions::default())),
            )
        }
    }

    #[tokio::test]
    async fn register_hashes_password_and_defaults_display() {
        let mut fx = Fixture::new();
        fx.hasher
            .expect_hash()
            .returning(|_| Ok("$argon2id$hashed".to_string()));
        fx.accounts
            .expect_insert()
            .withf(|record| {
                record.display == "ada"
                    && record.password == "$argon2id$hashed"
                    && !record.confirmed
                    && !record.admin
            })
            .returning(|record| {
                let mut created = account(1, record.admin, record.confirmed);
                created.username = record.username;
                created.display = record.display;
                created.email = record.email;
                created.password = record.password;
                Ok(created)
            });
        fx.tokens
            .expect_issue()
            .returning(|_, _, _| Ok("token".to_string()));
        fx.mailer
            .expect_send_account_confirmation()
            .returning(|_, _| Ok(()));
        let service = fx.service();
        let created = service
            .register(NewAccount {
                username: "ada".to_string(),
                display: Some("   ".to_string()),
                email: "ada@example.org".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.display, "ada");
    }

    #[tokio::test]
    async fn login_rejects_bad_password_before_confirmation() {
        let mut fx = Fixture::new();
        fx.accounts
            .expect_find()
            .returning(|_, _| Ok(Some(account(1, false, false))));
        fx.hasher.expect_verify().returning(|_, _| false);
        let service = fx.service();
        let result = service.check_login("user1@example.org", "nope").await;
        assert!(matches!(result, Err(DomainError::InvalidPassword)));
    }

    #[tokio::test]
    async fn login_rejects_unconfirmed_accounts() {
        let mut fx = Fixture::new();
        fx.accounts
            .expect_find()
            .returning(|_, _| Ok(Some(account(1, false, false))));
        fx.hasher.expect_verify().returning(|_, _| true);
        let service = fx.service();
        let result = service.check_login("user1@example.org", "hunter2").await;
        assert!(matches!(result, Err(DomainError::EmailNotConfirmed)));
    }

    #[tokio::test]
    async fn login_touches_seen_at() {
        let mut fx = Fixture::new();
        fx.accounts
            .expect_find()
            .returning(|_, _| Ok(Some(account(1, false, true))));
        fx.hasher.expect_verify().returning(|_, _| true);
        fx.accounts
            .expect_touch_seen()
            .times(1)
            .returning(|_, _| Ok(()));
        let service = fx.service();
        let logged_in = service
            .check_login("user1@example.org", "hunter2")
            .await
            .unwrap();
        assert_eq!(logged_in.id, 1);
    }

    #[tokio::test]
    async fn delete_detaches_blogs_by_default() {
        let mut fx = Fixture::new();
        fx.blogs
            .expect_list()
            .returning(|_| Ok(vec![blog(3, Some(1), true, true)]));
        fx.blogs
            .expect_update()
            .withf(|id, patch| *id == 3 && patch.author_id == Some(None))
            .returning(|id, _| Ok(blog(id, None, true, true)));
        fx.accounts.expect_delete().times(1).returning(|_| Ok(()));
        let service = fx.service();
        service.delete(&account(1, false, true), false).await.unwrap();
    }

    #[tokio::test]
    async fn delete_can_cascade_to_blogs() {
        let mut fx = Fixture::new();
        fx.blogs
            .expect_list()
            .returning(|_| Ok(vec![blog(3, Some(1), true, true), blog(4, Some(1), false, true)]));
        fx.blogs.expect_delete().times(2).returning(|_| Ok(()));
        fx.accounts.expect_delete().times(1).returning(|_| Ok(()));
        let service = fx.service();
        service.delete(&account(1, false, true), true).await.unwrap();
    }
}
