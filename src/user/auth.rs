//! Password hashing and session token signing.

use anyhow::{anyhow, bail, Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(72 * 60 * 60);

mod score_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    /// Returns a PHC string, the salt is embedded in it.
    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify(plain: &[u8], target_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }
}

/// Hash-and-verify capability for account passwords.
///
/// The hasher name is stored next to each hash, so existing accounts keep verifying with the
/// hasher that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialHasher {
    Argon2,
    /// Fast test-only hasher - DO NOT use in production!
    #[cfg(any(test, feature = "test-fast-hasher"))]
    TestFast,
}

impl FromStr for CredentialHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(CredentialHasher::Argon2),
            #[cfg(any(test, feature = "test-fast-hasher"))]
            "test_fast" => Ok(CredentialHasher::TestFast),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl std::fmt::Display for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialHasher::Argon2 => write!(f, "argon2"),
            #[cfg(any(test, feature = "test-fast-hasher"))]
            CredentialHasher::TestFast => write!(f, "test_fast"),
        }
    }
}

impl CredentialHasher {
    pub fn hash(&self, plain: &str) -> Result<String> {
        match self {
            CredentialHasher::Argon2 => score_argon2::hash(plain.as_bytes()),
            #[cfg(any(test, feature = "test-fast-hasher"))]
            CredentialHasher::TestFast => {
                let hex: String = plain.bytes().map(|b| format!("{:02x}", b)).collect();
                Ok(format!("$testfast${}", hex))
            }
        }
    }

    /// `Ok(false)` for a wrong password, `Err` when `target_hash` is not a hash this hasher
    /// can read.
    pub fn verify(&self, plain: &str, target_hash: &str) -> Result<bool> {
        match self {
            CredentialHasher::Argon2 => score_argon2::verify(plain.as_bytes(), target_hash),
            #[cfg(any(test, feature = "test-fast-hasher"))]
            CredentialHasher::TestFast => {
                let hex = target_hash
                    .strip_prefix("$testfast$")
                    .ok_or_else(|| anyhow!("Malformed test hash"))?;
                let expected: String = plain.bytes().map(|b| format!("{:02x}", b)).collect();
                Ok(hex == expected)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies stateless HS256 session tokens.
///
/// Tokens carry the account id and expire by their embedded `exp`, there is no revocation.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

fn unix_now() -> Result<i64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock before unix epoch")?
        .as_secs() as i64)
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.issue_at(user_id, unix_now()?)
    }

    fn issue_at(&self, user_id: i64, issued_at: i64) -> Result<String> {
        let claims = TokenClaims {
            user_id,
            iat: issued_at,
            exp: issued_at + self.ttl.as_secs() as i64,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign token")
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
