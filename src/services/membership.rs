use std::sync::Arc;

use tracing::{debug, warn};

use super::error::{LedgerError, LedgerResult};
use super::identity::{Identity, IdentityResolver};
use crate::database::MembershipRepository;
use crate::middleware::AuthUser;
use crate::types::FamilyId;

/// Proof that the caller belongs to `family_id`. Only the guard constructs it.
#[derive(Debug, Clone)]
pub struct Admission {
    pub identity: Identity,
    pub family_id: FamilyId,
    _sealed: (),
}

/// The one authorization check in front of every family-scoped resource
#[derive(Clone)]
pub struct MembershipGuard {
    identity: IdentityResolver,
    members: Arc<dyn MembershipRepository>,
}

impl MembershipGuard {
    pub fn new(identity: IdentityResolver, members: Arc<dyn MembershipRepository>) -> Self {
        Self { identity, members }
    }

    pub async fn require_member(&self, auth: &AuthUser, family_id: FamilyId) -> LedgerResult<Admission> {
        let identity = self.identity.resolve(auth).await?;

        if !self.members.exists(identity.user_id(), family_id).await? {
            warn!(
                "User {} denied access to family {}: not a member",
                identity.user_id(),
                family_id
            );
            return Err(LedgerError::NotAMember(family_id));
        }

        debug!("User {} admitted to family {}", identity.user_id(), family_id);
        Ok(Admission {
            identity,
            family_id,
            _sealed: (),
        })
    }
}
