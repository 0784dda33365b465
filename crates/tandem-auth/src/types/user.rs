//! User directory interface.
//!
//! Authentication of end users is an external concern; the token and
//! partner stores only need a way to resolve principals. The directory is
//! injected, never a process-wide table, so deployments can swap the
//! in-memory variant for a real identity backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

use super::role::Role;

/// A directory user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user name.
    pub username: String,

    /// Argon2 password hash (PHC string).
    pub password_hash: String,

    /// Granted authorities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorities: Vec<Role>,
}

impl User {
    /// Creates a user with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns an error if password hashing fails.
    pub fn with_password(
        username: impl Into<String>,
        password: &str,
        authorities: Vec<Role>,
    ) -> AuthResult<Self> {
        use argon2::Argon2;
        use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?
            .to_string();

        Ok(Self {
            username: username.into(),
            password_hash,
            authorities,
        })
    }
}

/// Read-side interface to the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory backend fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Verifies a user's credentials, returning the user on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] for an unknown user or a wrong
    /// password, or a backend error.
    async fn verify_credentials(&self, username: &str, password: &str) -> AuthResult<User>;
}

/// In-memory user directory.
///
/// One interchangeable variant behind [`UserDirectory`]; suitable for
/// development and tests.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: dashmap::DashMap<String, User>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub fn insert(&self, user: User) {
        self.users.insert(user.username.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self.users.get(username).map(|u| u.clone()))
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> AuthResult<User> {
        use argon2::Argon2;
        use argon2::password_hash::{PasswordHash, PasswordVerifier};

        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::unauthorized(format!("unknown user {username}")))?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AuthError::internal(format!("corrupt password hash: {e}")))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::unauthorized(format!("invalid credentials for {username}")))?;

        Ok(user)
    }
}
