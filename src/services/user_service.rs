//! User profile service

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::User,
    services::auth_service::normalize_email,
};

/// User service for business logic
pub struct UserService;

impl UserService {
    /// Change name and email; the email must not belong to another account
    pub async fn update_profile(
        pool: &PgPool,
        user_id: &Uuid,
        name: &str,
        email: &str,
    ) -> AppResult<User> {
        let email = normalize_email(email);

        if UserRepository::email_taken_by_other(pool, &email, user_id).await? {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }

        let user = UserRepository::update_profile(pool, user_id, name.trim(), &email)
            .await
            .map_err(|e| match e {
                // Lost a race with another account claiming the same address
                AppError::Conflict(_) => AppError::Conflict("Email is already in use".to_string()),
                AppError::NotFound(_) => AppError::NotFound("User not found".to_string()),
                other => other,
            })?;

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}
