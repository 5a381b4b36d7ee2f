use std::sync::Arc;

use tracing::warn;

use super::error::{LedgerError, LedgerResult};
use crate::database::models::User;
use crate::database::UserRepository;
use crate::middleware::AuthUser;
use crate::types::UserId;

/// The caller of a request, resolved against the users table
#[derive(Debug, Clone)]
pub struct Identity {
    pub phone: String,
    pub user: User,
}

impl Identity {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

/// Turns a verified phone claim into the matching user row
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserRepository>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// A claim without a user row is `Unauthenticated`; a failing store is
    /// reported as `Store` so it maps to a server error instead.
    pub async fn resolve(&self, auth: &AuthUser) -> LedgerResult<Identity> {
        match self.users.find_by_phone(&auth.phone).await? {
            Some(user) => Ok(Identity {
                phone: user.phone.clone(),
                user,
            }),
            None => {
                warn!("Token phone {} does not match any user", auth.phone);
                Err(LedgerError::Unauthenticated)
            }
        }
    }
}
