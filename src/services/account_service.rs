use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::error::{LedgerError, LedgerResult};
use super::identity::IdentityResolver;
use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config::SecurityConfig;
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::UserRepository;
use crate::middleware::AuthUser;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PHONE_MIN_DIGITS: usize = 5;
/// Includes the optional leading `+`; matches `users.phone VARCHAR(20)`
pub const PHONE_MAX_LEN: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Registration, login and self-service profile operations
#[derive(Clone)]
pub struct AccountService {
    identity: IdentityResolver,
    users: Arc<dyn UserRepository>,
    security: Arc<SecurityConfig>,
}

impl AccountService {
    pub fn new(identity: IdentityResolver, users: Arc<dyn UserRepository>, security: Arc<SecurityConfig>) -> Self {
        Self {
            identity,
            users,
            security,
        }
    }

    pub async fn register(&self, username: &str, password: &str, phone: &str) -> LedgerResult<User> {
        validate_username(username)?;
        validate_password(password)?;
        validate_phone(phone)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(LedgerError::AlreadyRegistered("username"));
        }
        if self.users.find_by_phone(phone).await?.is_some() {
            return Err(LedgerError::AlreadyRegistered("phone"));
        }

        let password_hash = hash_password(password).map_err(|e| LedgerError::Internal(e.to_string()))?;
        let new_user = NewUser {
            username: username.to_string(),
            password_hash,
            phone: phone.to_string(),
        };

        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            Err(e) if e.is_unique_violation() => return Err(LedgerError::AlreadyRegistered("username or phone")),
            Err(e) => return Err(e.into()),
        };

        info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Unknown phone and wrong password are reported identically.
    pub async fn login(&self, phone: &str, password: &str) -> LedgerResult<LoginOutcome> {
        let user = match self.users.find_by_phone(phone).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("Failed login for phone {}", phone);
                return Err(LedgerError::BadCredentials);
            }
        };

        let claims = Claims::new(user.phone.clone(), &self.security);
        let token = generate_jwt(&claims, &self.security).map_err(|e| LedgerError::Internal(e.to_string()))?;

        info!("User {} logged in", user.id);
        Ok(LoginOutcome { token, user })
    }

    pub async fn info(&self, auth: &AuthUser, phone: &str) -> LedgerResult<User> {
        self.identity.resolve(auth).await?;
        self.users
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| LedgerError::PhoneNotFound(phone.to_string()))
    }

    pub async fn update_self(
        &self,
        auth: &AuthUser,
        username: Option<String>,
        password: Option<String>,
    ) -> LedgerResult<User> {
        let identity = self.identity.resolve(auth).await?;
        let mut changes = UserChanges::default();

        if let Some(username) = username.filter(|u| *u != identity.user.username) {
            validate_username(&username)?;
            if self.users.find_by_username(&username).await?.is_some() {
                return Err(LedgerError::AlreadyRegistered("username"));
            }
            changes.username = Some(username);
        }

        if let Some(password) = password {
            validate_password(&password)?;
            changes.password_hash =
                Some(hash_password(&password).map_err(|e| LedgerError::Internal(e.to_string()))?);
        }

        if changes.is_empty() {
            return Ok(identity.user);
        }

        let user = match self.users.update(identity.user_id(), changes).await {
            Ok(user) => user,
            Err(e) if e.is_unique_violation() => return Err(LedgerError::AlreadyRegistered("username")),
            Err(e) => return Err(e.into()),
        };

        info!("User {} updated their profile", user.id);
        Ok(user)
    }

    pub async fn list_users(&self, auth: &AuthUser) -> LedgerResult<Vec<User>> {
        self.identity.resolve(auth).await?;
        Ok(self.users.list().await?)
    }
}

fn validate_username(username: &str) -> LedgerResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(LedgerError::MalformedInput(format!(
            "username must be {}-{} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(LedgerError::MalformedInput(
            "username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> LedgerResult<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(LedgerError::MalformedInput(format!(
            "password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> LedgerResult<()> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = digits.len() >= PHONE_MIN_DIGITS
        && phone.len() <= PHONE_MAX_LEN
        && digits.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(LedgerError::MalformedInput(format!("invalid phone number '{}'", phone)));
    }
    Ok(())
}
