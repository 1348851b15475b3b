use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::validation::{normalize_email, validate_email_format, validate_username_format};
use crate::api::Payload;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{self, AuthUser, TokenPair, TokenType};
use crate::config::{PasswordPolicy, SecurityConfig};
use crate::database::models::{NewUser, User, UserInfo};
use crate::database::{DatabaseError, RecordStore};
use crate::error::ApiError;

/// Refreshed access credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

/// Registration, login and account lifecycle
pub struct UserService {
    store: Arc<dyn RecordStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create a regular account from `{username, email, password}`
    pub async fn register(&self, body: &Value, policy: &PasswordPolicy) -> Result<UserInfo, ApiError> {
        let mut payload = Payload::new(body)?;
        let username = payload.string("username", None);
        let email = payload.string("email", None);
        let password = payload.string("password", None);
        payload.finish()?;

        let user = self.create_account(&username, &email, &password, false, policy).await?;
        tracing::info!("Registered user '{}' ({})", user.username, user.id);
        Ok(UserInfo::from(&user))
    }

    /// Validate and insert an account. Nothing is written unless every check passes.
    /// The email is normalized here so every entry point stores the same form.
    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_staff: bool,
        policy: &PasswordPolicy,
    ) -> Result<User, ApiError> {
        let email = normalize_email(email);
        let email = email.as_str();
        let mut field_errors = HashMap::new();

        if let Err(msg) = validate_username_format(username) {
            field_errors.insert("username".to_string(), msg);
        } else if self.store.user_by_username(username).await?.is_some() {
            field_errors.insert("username".to_string(), "A user with that username already exists.".to_string());
        }

        if let Err(msg) = validate_email_format(email) {
            field_errors.insert("email".to_string(), msg);
        } else if self.store.user_by_email(email).await?.is_some() {
            field_errors.insert("email".to_string(), "A user with that email already exists.".to_string());
        }

        let violations = policy.violations(password, username, email);
        if !violations.is_empty() {
            field_errors.insert("password".to_string(), violations.join(" "));
        }

        if !field_errors.is_empty() {
            tracing::warn!("Rejected account for '{}': {:?}", username, field_errors.keys());
            return Err(ApiError::validation_error("Invalid input", Some(field_errors)));
        }

        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_off_thread(password).await?,
            is_staff,
        };

        self.store.create_user(new_user).await.map_err(|e| match e {
            // lost a race with a concurrent registration
            DatabaseError::Conflict(_) => ApiError::field("username", "A user with that username or email already exists."),
            other => other.into(),
        })
    }

    /// Exchange `{username, password}` for an access/refresh pair
    pub async fn login(&self, body: &Value, security: &SecurityConfig) -> Result<TokenPair, ApiError> {
        let mut payload = Payload::new(body)?;
        let username = payload.string("username", None);
        let password = payload.string("password", None);
        payload.finish()?;

        let found = self.store.user_by_username(&username).await?;
        let verified = match &found {
            Some(user) => verify_off_thread(&password, &user.password_hash).await?,
            None => false,
        };
        let user = match found {
            Some(user) if verified => user,
            _ => {
                tracing::warn!("Failed login for '{}'", username);
                return Err(ApiError::unauthorized("No active account found with the given credentials"));
            }
        };

        tracing::debug!("Issued tokens for '{}'", user.username);
        Ok(auth::issue_token_pair(&user, security)?)
    }

    /// Exchange `{refresh}` for a new access token
    pub async fn refresh(&self, body: &Value, security: &SecurityConfig) -> Result<AccessToken, ApiError> {
        let mut payload = Payload::new(body)?;
        let token = payload.string("refresh", None);
        payload.finish()?;

        let claims = auth::validate_jwt(&token, TokenType::Refresh, security)?;
        let user = self
            .store
            .user_by_id(claims.user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        let access = auth::generate_jwt(&auth::Claims::new(&user, TokenType::Access, security), security)?;
        Ok(AccessToken { access })
    }

    /// Resolve a verified access token to the live user it names
    pub async fn authenticate(&self, token: &str, security: &SecurityConfig) -> Result<AuthUser, ApiError> {
        let claims = auth::validate_jwt(token, TokenType::Access, security)?;
        let user = self
            .store
            .user_by_id(claims.user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
        Ok(AuthUser::from(&user))
    }

    pub async fn whoami(&self, caller: &AuthUser) -> Result<UserInfo, ApiError> {
        self.store
            .user_by_id(caller.user_id)
            .await?
            .map(|user| UserInfo::from(&user))
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Remove the caller's account; their patient and its mappings go with it
    pub async fn delete_account(&self, caller: &AuthUser) -> Result<(), ApiError> {
        if !self.store.delete_user(caller.user_id).await? {
            return Err(ApiError::not_found("User not found"));
        }
        tracing::info!("Deleted user '{}' ({})", caller.username, caller.user_id);
        Ok(())
    }

    pub async fn delete_by_username(&self, username: &str) -> Result<(), ApiError> {
        let user = self
            .store
            .user_by_username(username)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))?;
        self.delete_account(&AuthUser::from(&user)).await
    }
}

// Argon2 runs on the blocking pool, not the async workers

async fn hash_off_thread(password: &str) -> Result<String, ApiError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(join_error)?
        .map_err(ApiError::from)
}

async fn verify_off_thread(password: &str, hash: &str) -> Result<bool, ApiError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(join_error)
}

fn join_error(err: tokio::task::JoinError) -> ApiError {
    tracing::error!("Password task failed: {}", err);
    ApiError::internal_server_error("Unable to process credentials")
}
