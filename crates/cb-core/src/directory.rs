//! # User Directory
//!
//! Registration and credential checks over the `users` collection.
//! This is the source of truth an identity provider consults.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{Collection, Role, UserRecord};
use crate::repository::Repository;
use crate::traits::{CredentialHasher, RecordStore};

pub struct UserDirectory {
    users: Repository<UserRecord>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn RecordStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            users: Repository::new(store, Collection::Users),
            hasher,
        }
    }

    /// Creates a new account. The role is fixed for the account's lifetime.
    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<UserRecord> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password must not be empty".into()));
        }

        // early out before paying for a hash; repeated under the lock below
        if self.users.read_all().await?.contains_key(username) {
            return Err(AppError::DuplicateUser(username.to_string()));
        }

        let hasher = Arc::clone(&self.hasher);
        let secret = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash_password(&secret))
            .await
            .map_err(|e| AppError::Storage(format!("password hashing task failed: {e}")))?
            .map_err(|e| AppError::Storage(format!("password hashing failed: {e}")))?;

        let record = self
            .users
            .update(|users| {
                if users.contains_key(username) {
                    return Err(AppError::DuplicateUser(username.to_string()));
                }
                let record = UserRecord {
                    username: username.to_string(),
                    password_hash,
                    role,
                    created_at: Utc::now(),
                };
                users.insert(username.to_string(), record.clone());
                Ok(record)
            })
            .await?;

        info!("registered user '{}' as {}", record.username, record.role);
        Ok(record)
    }

    /// Checks a username/password pair and returns the stored record.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserRecord> {
        let users = self.users.read_all().await?;
        match users.get(username) {
            Some(record) if self.hasher.verify_password(password, &record.password_hash) => {
                debug!("user '{}' authenticated", username);
                Ok(record.clone())
            }
            _ => {
                warn!("rejected credentials for '{}'", username);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Current record for a previously authenticated id, if it still exists.
    pub async fn lookup(&self, username: &str) -> Result<Option<UserRecord>> {
        let mut users = self.users.read_all().await?;
        Ok(users.remove(username))
    }
}
