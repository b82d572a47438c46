use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Chirp, Store, User};
use crate::auth::RefreshTokenRecord;
use crate::error::DatabaseError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    // insertion order == creation order
    chirps: Vec<Chirp>,
}

/// Store kept entirely in process memory, with the same uniqueness and
/// not-found behaviour as the Postgres schema.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str) -> DatabaseError {
    DatabaseError::NotFound(what.to_string())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(DatabaseError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: password_hash.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| not_found("user"))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(DatabaseError::DuplicateEmail);
        }

        let user = tables.users.get_mut(&id).ok_or_else(|| not_found("user"))?;
        user.email = email.to_string();
        user.hashed_password = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_upgraded(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or_else(|| not_found("user"))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_all_users(&self) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        *tables = Tables::default();
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(not_found("user"));
        }
        if tables.refresh_tokens.contains_key(token) {
            return Err(DatabaseError::QueryExecution(
                "refresh token already exists".to_string(),
            ));
        }

        tables.refresh_tokens.insert(
            token.to_string(),
            RefreshTokenRecord {
                token: token.to_string(),
                user_id,
                created_at: Utc::now(),
                expires_at,
                revoked_at: None,
            },
        );
        Ok(())
    }

    async fn lookup_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .refresh_tokens
            .get(token)
            .cloned()
            .ok_or_else(|| not_found("refresh token"))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.refresh_tokens.get_mut(token) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(not_found("refresh token")),
        }
    }

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(not_found("user"));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        tables.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError> {
        Ok(self.tables.read().await.chirps.clone())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .chirps
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("chirp"))
    }

    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| !(c.id == id && c.user_id == user_id));

        if tables.chirps.len() == before {
            return Err(not_found("chirp"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        store.create_user("alice@example.com", "hash").await.unwrap();

        let result = store.create_user("alice@example.com", "other").await;
        assert!(matches!(result, Err(DatabaseError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_update_user_to_taken_email() {
        let store = InMemoryStore::new();
        store.create_user("alice@example.com", "hash").await.unwrap();
        let bob = store.create_user("bob@example.com", "hash").await.unwrap();

        let result = store.update_user(bob.id, "alice@example.com", "hash2").await;
        assert!(matches!(result, Err(DatabaseError::DuplicateEmail)));

        // Keeping your own email is fine
        let updated = store.update_user(bob.id, "bob@example.com", "hash2").await.unwrap();
        assert_eq!(updated.hashed_password, "hash2");
    }

    #[tokio::test]
    async fn test_revoke_is_update_or_fail() {
        let store = InMemoryStore::new();
        let user = store.create_user("alice@example.com", "hash").await.unwrap();
        store
            .store_refresh_token("tok", user.id, Utc::now() + Duration::days(60))
            .await
            .unwrap();

        store.revoke_refresh_token("tok").await.unwrap();
        assert!(store.lookup_refresh_token("tok").await.unwrap().revoked_at.is_some());

        assert!(matches!(
            store.revoke_refresh_token("tok").await,
            Err(DatabaseError::NotFound(_))
        ));
        assert!(matches!(
            store.revoke_refresh_token("unknown").await,
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_all_users_cascades() {
        let store = InMemoryStore::new();
        let user = store.create_user("alice@example.com", "hash").await.unwrap();
        store
            .store_refresh_token("tok", user.id, Utc::now() + Duration::days(60))
            .await
            .unwrap();
        store.create_chirp(user.id, "hello").await.unwrap();

        store.delete_all_users().await.unwrap();

        assert!(store.find_user_by_email("alice@example.com").await.is_err());
        assert!(store.lookup_refresh_token("tok").await.is_err());
        assert!(store.list_chirps().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chirps_keep_creation_order_and_ownership() {
        let store = InMemoryStore::new();
        let alice = store.create_user("alice@example.com", "hash").await.unwrap();
        let bob = store.create_user("bob@example.com", "hash").await.unwrap();

        let first = store.create_chirp(alice.id, "first").await.unwrap();
        let second = store.create_chirp(bob.id, "second").await.unwrap();

        let all = store.list_chirps().await.unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id, second.id]);

        assert!(store.delete_chirp(first.id, bob.id).await.is_err());
        store.delete_chirp(first.id, alice.id).await.unwrap();
        assert!(store.get_chirp(first.id).await.is_err());
    }

    #[tokio::test]
    async fn test_set_upgraded() {
        let store = InMemoryStore::new();
        let user = store.create_user("alice@example.com", "hash").await.unwrap();

        store.set_upgraded(user.id).await.unwrap();
        assert!(store.find_user_by_email("alice@example.com").await.unwrap().is_chirpy_red);

        assert!(matches!(
            store.set_upgraded(Uuid::new_v4()).await,
            Err(DatabaseError::NotFound(_))
        ));
    }
}
