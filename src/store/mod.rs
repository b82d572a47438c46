/// Persistence collaborator
///
/// The `Store` trait is the whole contract the rest of the crate has with the
/// database. `PgStore` backs it with Postgres; `InMemoryStore` backs it with
/// process memory for tests and local runs.

mod memory;
mod models;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::RefreshTokenRecord;
use crate::error::DatabaseError;

pub use memory::InMemoryStore;
pub use models::{Chirp, User};
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `DuplicateEmail` if the email is taken
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<User, DatabaseError>;

    /// Replaces email and password hash; `DuplicateEmail` if the new email is taken
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError>;

    async fn set_upgraded(&self, id: Uuid) -> Result<(), DatabaseError>;

    /// Removes every user together with their refresh tokens and chirps
    async fn delete_all_users(&self) -> Result<(), DatabaseError>;

    async fn store_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    async fn lookup_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, DatabaseError>;

    /// Sets `revoked_at` to now. `NotFound` if the token is unknown or already revoked.
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), DatabaseError>;

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError>;

    /// All chirps, oldest first
    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError>;

    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<(), DatabaseError>;
}
