use std::sync::Arc;

use tracing::{info, warn};

use super::error::{ensure_max_chars, LedgerError, LedgerResult};
use super::identity::IdentityResolver;
use super::membership::MembershipGuard;
use crate::database::models::{Family, FamilyMember, NewFamily};
use crate::database::{FamilyRepository, MembershipRepository, UserRepository};
use crate::middleware::AuthUser;
use crate::types::{FamilyId, UserId};

/// `families.name` and `families.join_password` are both `VARCHAR(100)`
pub const FAMILY_FIELD_MAX_LEN: usize = 100;

/// Input of a join request, already bound by the transport
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub family_id: FamilyId,
    pub user_id: UserId,
    pub role: String,
    pub join_password: String,
}

/// Family creation and membership management
#[derive(Clone)]
pub struct FamilyService {
    identity: IdentityResolver,
    guard: MembershipGuard,
    families: Arc<dyn FamilyRepository>,
    users: Arc<dyn UserRepository>,
    members: Arc<dyn MembershipRepository>,
}

impl FamilyService {
    pub fn new(
        identity: IdentityResolver,
        guard: MembershipGuard,
        families: Arc<dyn FamilyRepository>,
        users: Arc<dyn UserRepository>,
        members: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            identity,
            guard,
            families,
            users,
            members,
        }
    }

    /// The creator is not enrolled; joining is a separate step for everyone.
    pub async fn create_family(
        &self,
        auth: &AuthUser,
        name: String,
        join_password: String,
    ) -> LedgerResult<Family> {
        let identity = self.identity.resolve(auth).await?;
        ensure_max_chars("name", &name, FAMILY_FIELD_MAX_LEN)?;
        ensure_max_chars("password", &join_password, FAMILY_FIELD_MAX_LEN)?;

        let family = self.families.create(NewFamily { name, join_password }).await?;

        info!(
            "Family {} ('{}') created by user {}",
            family.id,
            family.name,
            identity.user_id()
        );
        Ok(family)
    }

    /// Checks run in a fixed order and stop at the first failure; nothing is
    /// written unless every check passes.
    pub async fn join_family(&self, auth: &AuthUser, request: JoinRequest) -> LedgerResult<()> {
        let requester = self.identity.resolve(auth).await?;

        let family = self
            .families
            .find_by_id(request.family_id)
            .await?
            .ok_or(LedgerError::FamilyNotFound(request.family_id))?;

        if family.join_password != request.join_password {
            warn!(
                "User {} supplied a wrong join password for family {}",
                requester.user_id(),
                family.id
            );
            return Err(LedgerError::BadJoinPassword);
        }

        let target = self
            .users
            .find_by_id(request.user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(request.user_id))?;

        if target.id != request.user_id {
            return Err(LedgerError::ImpersonationDenied);
        }

        let already_member = LedgerError::AlreadyMember {
            user_id: target.id,
            family_id: family.id,
        };

        if self.members.exists(target.id, family.id).await? {
            return Err(already_member);
        }

        match self.members.insert(target.id, family.id, &request.role).await {
            Ok(()) => {}
            // a concurrent join won the race; the primary key kept one edge
            Err(e) if e.is_unique_violation() => return Err(already_member),
            Err(e) => return Err(e.into()),
        }

        info!(
            "User {} joined family {} as '{}' (requested by user {})",
            target.id,
            family.id,
            request.role,
            requester.user_id()
        );
        Ok(())
    }

    pub async fn list_members(&self, auth: &AuthUser, family_id: FamilyId) -> LedgerResult<Vec<FamilyMember>> {
        let admission = self.guard.require_member(auth, family_id).await?;
        let members = self.members.list_members(admission.family_id).await?;
        Ok(members)
    }

    pub async fn list_families(&self, auth: &AuthUser) -> LedgerResult<Vec<Family>> {
        self.identity.resolve(auth).await?;
        let families = self.families.list().await?;
        Ok(families)
    }
}
