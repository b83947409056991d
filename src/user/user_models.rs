use super::auth::CredentialHasher;
use serde::Serialize;

/// A registered account. The password hash never leaves the store through this type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created: i64,
}

#[derive(Clone, Debug)]
pub struct StoredCredentials {
    pub account_id: i64,
    pub password_hash: String,
    pub hasher: CredentialHasher,
}

#[derive(Clone, Debug)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub hasher: CredentialHasher,
}

/// Outcome of inserting an account, uniqueness is decided by the database constraints.
#[derive(Clone, Debug, PartialEq)]
pub enum AccountInsertion {
    Created(Account),
    UsernameTaken,
    EmailTaken,
}
