use super::user_models::{Account, AccountInsertion, NewAccount, StoredCredentials};
use anyhow::Result;

pub trait AccountStore: Send + Sync {
    /// Inserts a new account.
    /// Returns `UsernameTaken`/`EmailTaken` instead of an error when a unique column clashes.
    fn create_account(&self, account: &NewAccount) -> Result<AccountInsertion>;

    /// Returns the account with the given id.
    /// Returns Ok(None) if the account does not exist.
    fn get_account(&self, account_id: i64) -> Result<Option<Account>>;

    /// Returns the account registered with `email` and its password credentials.
    /// Returns Ok(None) if no account uses that email.
    fn get_credentials_by_email(&self, email: &str)
        -> Result<Option<(Account, StoredCredentials)>>;

    fn username_exists(&self, username: &str) -> Result<bool>;
}
