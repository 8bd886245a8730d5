use async_trait::async_trait;
use tripdesk_core::{NewUser, User, UserUpdate};

use crate::error::StorageError;
use crate::types::PaginatedResult;

/// Agency users. Emails are unique case-insensitively.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns [`StorageError::Duplicate`] when the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, StorageError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    async fn list_users(&self, offset: usize, limit: usize)
    -> Result<PaginatedResult<User>, StorageError>;

    /// Apply the `Some` fields of `update`. `None` when the user does not exist.
    async fn update_user(&self, id: &str, update: &UserUpdate)
    -> Result<Option<User>, StorageError>;

    /// Delete a user; their bookings are unlinked and their votes removed.
    async fn delete_user(&self, id: &str) -> Result<bool, StorageError>;
}
