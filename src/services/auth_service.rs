//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::{User, UserRole},
};

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Register a new account
    pub async fn register(
        pool: &PgPool,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> AppResult<User> {
        if !role.is_self_assignable() {
            return Err(AppError::Validation(format!(
                "Role {} cannot be chosen at registration",
                role
            )));
        }

        let email = normalize_email(email);
        if UserRepository::find_by_email(pool, &email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = Self::hash_password(password)?;

        let user = UserRepository::create(pool, name.trim(), &email, &password_hash, role).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(user)
    }

    /// Check credentials and issue a session token
    pub async fn login(
        pool: &PgPool,
        config: &SessionConfig,
        email: &str,
        password: &str,
    ) -> AppResult<(User, String, i64)> {
        let user = UserRepository::find_by_email(pool, &normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let (token, expires_in) = Self::issue_token(&user, config)?;
        Ok((user, token, expires_in))
    }

    /// Get user by ID
    pub async fn get_user_by_id(pool: &PgPool, user_id: &Uuid) -> AppResult<Option<User>> {
        UserRepository::find_by_id(pool, user_id).await
    }

    /// Sign a session token; returns the token and its lifetime in seconds
    pub fn issue_token(user: &User, config: &SessionConfig) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let lifetime = Duration::days(config.max_age_days);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iss: config.url.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))?;

        Ok((token, lifetime.num_seconds()))
    }

    /// Verify a session token and extract its claims
    pub fn verify_token(token: &str, config: &SessionConfig) -> AppResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[config.url.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }

    /// Hash password using Argon2
    fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(hash)
    }

    /// Verify password against hash
    fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

/// Emails are stored and compared lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
