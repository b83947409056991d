use super::auth::CredentialHasher;
use super::user_models::{Account, AccountInsertion, NewAccount, StoredCredentials};
use super::user_store::AccountStore;
use crate::catalog_store::SqliteCatalogStore;
use crate::sqlite_persistence::{constraint_violation, ConstraintViolation};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

impl AccountStore for SqliteCatalogStore {
    fn create_account(&self, account: &NewAccount) -> Result<AccountInsertion> {
        let conn = self.write_conn()?;
        let result = conn.query_row(
            "INSERT INTO account (username, email, password_hash, hasher) VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, username, email, created",
            params![
                account.username,
                account.email,
                account.password_hash,
                account.hasher.to_string()
            ],
            |row| {
                Ok(Account {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    created: row.get(3)?,
                })
            },
        );

        match result {
            Ok(created) => Ok(AccountInsertion::Created(created)),
            Err(err) => match constraint_violation(&err) {
                Some(ConstraintViolation::Unique(columns)) if columns == "account.username" => {
                    debug!("Username {} already taken", account.username);
                    Ok(AccountInsertion::UsernameTaken)
                }
                Some(ConstraintViolation::Unique(columns)) if columns == "account.email" => {
                    Ok(AccountInsertion::EmailTaken)
                }
                _ => Err(err).context("Failed to insert account"),
            },
        }
    }

    fn get_account(&self, account_id: i64) -> Result<Option<Account>> {
        let conn = self.read_conn()?;
        let account = conn
            .query_row(
                "SELECT id, username, email, created FROM account WHERE id = ?1",
                params![account_id],
                |row| {
                    Ok(Account {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        created: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(account)
    }

    fn get_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(Account, StoredCredentials)>> {
        let conn = self.read_conn()?;
        let row = conn
            .query_row(
                "SELECT id, username, email, created, password_hash, hasher \
                 FROM account WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        Account {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            email: row.get(2)?,
                            created: row.get(3)?,
                        },
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((account, password_hash, hasher_name)) = row else {
            return Ok(None);
        };
        let hasher: CredentialHasher = hasher_name
            .parse()
            .with_context(|| format!("Account {} has an unreadable hasher", account.id))?;
        let credentials = StoredCredentials {
            account_id: account.id,
            password_hash,
            hasher,
        };
        Ok(Some((account, credentials)))
    }

    fn username_exists(&self, username: &str) -> Result<bool> {
        let conn = self.read_conn()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM account WHERE username = ?1",
                params![username],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(exists)
    }
}
