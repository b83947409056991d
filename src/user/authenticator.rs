//! Account registration, login and session token verification.

use super::auth::{CredentialHasher, TokenSigner};
use super::user_models::{Account, AccountInsertion, NewAccount};
use super::user_store::AccountStore;
use crate::error::{ServiceError, ServiceResult};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;

fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_\-]+$").expect("valid username regex")
    })
}

fn validate_username(username: &str) -> ServiceResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) || !username_regex().is_match(username)
    {
        return Err(ServiceError::invalid_input(format!(
            "Username must be {}-{} characters of letters, digits, '_' or '-'",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> ServiceResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(ServiceError::invalid_input("Invalid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ServiceError::invalid_input(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}

/// A signed-in account and the token proving it.
#[derive(Clone, Debug, Serialize)]
pub struct IssuedSession {
    pub user: Account,
    pub token: String,
}

pub struct AccountAuthenticator {
    store: Arc<dyn AccountStore>,
    hasher: CredentialHasher,
    signer: TokenSigner,
}

impl AccountAuthenticator {
    pub fn new(store: Arc<dyn AccountStore>, hasher: CredentialHasher, signer: TokenSigner) -> Self {
        Self {
            store,
            hasher,
            signer,
        }
    }

    /// Creates the account and signs it in.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<IssuedSession> {
        let username = username.trim();
        let email = email.trim();
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;

        if self.store.username_exists(username)? {
            return Err(ServiceError::conflict("Username already taken"));
        }

        let password_hash = self.hasher.hash(password)?;
        let insertion = self.store.create_account(&NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            hasher: self.hasher,
        })?;

        match insertion {
            AccountInsertion::Created(account) => {
                info!("Registered account {} ({})", account.id, account.username);
                self.issue_session(account)
            }
            // Lost a race with a concurrent registration of the same username.
            AccountInsertion::UsernameTaken => Err(ServiceError::conflict("Username already taken")),
            AccountInsertion::EmailTaken => {
                Err(ServiceError::conflict("Email already registered"))
            }
        }
    }

    /// Unknown email and wrong password are both `Unauthorized`.
    pub fn login(&self, email: &str, password: &str) -> ServiceResult<IssuedSession> {
        let Some((account, credentials)) = self.store.get_credentials_by_email(email.trim())?
        else {
            debug!("Login for unknown email");
            return Err(ServiceError::Unauthorized);
        };

        let verified = credentials
            .hasher
            .verify(password, &credentials.password_hash)
            .map_err(|e| {
                ServiceError::Internal(e.context(format!(
                    "Stored hash of account {} is unreadable",
                    account.id
                )))
            })?;
        if !verified {
            warn!("Wrong password for account {}", account.id);
            return Err(ServiceError::Unauthorized);
        }

        self.issue_session(account)
    }

    fn issue_session(&self, account: Account) -> ServiceResult<IssuedSession> {
        let token = self.signer.issue(account.id)?;
        debug!("Issued token for account {}", account.id);
        Ok(IssuedSession {
            user: account,
            token,
        })
    }

    /// Returns the account id carried by a valid, unexpired token.
    pub fn verify_token(&self, token: &str) -> ServiceResult<i64> {
        self.signer
            .verify(token)
            .map(|claims| claims.user_id)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                ServiceError::Unauthorized
            })
    }

    /// Resolves a token to its account. A valid token whose account no longer exists is
    /// `Unauthorized`.
    pub fn authenticate(&self, token: &str) -> ServiceResult<Account> {
        let account_id = self.verify_token(token)?;
        match self.store.get_account(account_id)? {
            Some(account) => Ok(account),
            None => {
                warn!("Token for missing account {}", account_id);
                Err(ServiceError::Unauthorized)
            }
        }
    }
}
