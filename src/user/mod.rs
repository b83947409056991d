pub mod auth;
mod authenticator;
mod sqlite_account_store;
pub mod user_models;
mod user_store;

pub use auth::{CredentialHasher, TokenClaims, TokenSigner, DEFAULT_TOKEN_TTL};
pub use authenticator::{
    AccountAuthenticator, IssuedSession, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};
pub use user_models::{Account, AccountInsertion, NewAccount, StoredCredentials};
pub use user_store::AccountStore;
