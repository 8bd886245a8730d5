use std::sync::Arc;

use tripdesk_core::{Booking, MAX_QUERY_LIMIT, NewUser, User, UserUpdate, normalize_email};
use tripdesk_storage::PaginatedResult;
use tripdesk_storage::traits::{BookingStore, UserStore};

use crate::ServiceError;

pub struct UserService {
    users: Arc<dyn UserStore>,
    bookings: Arc<dyn BookingStore>,
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl UserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { users, bookings }
    }

    /// Create a user and attach the bookings already imported for its email.
    pub async fn create_user(&self, input: NewUser) -> Result<User, ServiceError> {
        let new_user = NewUser {
            email: normalize_email(&input.email)?,
            name: clean_optional(input.name),
            tc_user_id: clean_optional(input.tc_user_id),
            tc_microsite_id: clean_optional(input.tc_microsite_id),
            ..input
        };
        let user = self.users.create_user(&new_user).await?;
        self.link(&user).await?;
        tracing::info!(user = %user.id, role = user.role.as_str(), "user created");
        Ok(user)
    }

    /// Apply a partial update. Changing the email relinks bookings.
    pub async fn update_user(&self, id: &str, update: UserUpdate) -> Result<User, ServiceError> {
        let email_changed = update.email.is_some();
        let update = UserUpdate {
            email: update.email.as_deref().map(normalize_email).transpose()?,
            name: clean_optional(update.name),
            tc_user_id: clean_optional(update.tc_user_id),
            tc_microsite_id: clean_optional(update.tc_microsite_id),
            ..update
        };
        let user = self
            .users
            .update_user(id, &update)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))?;
        if email_changed {
            self.link(&user).await?;
        }
        Ok(user)
    }

    async fn link(&self, user: &User) -> Result<u64, ServiceError> {
        let linked = self.bookings.link_bookings_for_user(user).await?;
        if linked > 0 {
            tracing::debug!(user = %user.id, linked, "bookings linked to user");
        }
        Ok(linked)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        self.users.get_user(id).await?.ok_or_else(|| ServiceError::not_found("user", id))
    }

    pub async fn list_users(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<User>, ServiceError> {
        Ok(self.users.list_users(offset, limit.min(MAX_QUERY_LIMIT)).await?)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        if self.users.delete_user(id).await? {
            tracing::info!(user = %id, "user deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("user", id))
        }
    }

    pub async fn user_bookings(&self, id: &str) -> Result<Vec<Booking>, ServiceError> {
        let user = self.get_user(id).await?;
        Ok(self.bookings.bookings_for_user(&user.id).await?)
    }
}
