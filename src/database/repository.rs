use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Bill, Family, FamilyMember, NewBill, NewFamily, NewUser, User, UserChanges,
};
use crate::filter::BillFilter;
use crate::types::{BillId, FamilyId, UserId};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError>;
    async fn list(&self) -> Result<Vec<User>, DatabaseError>;
}

#[async_trait]
pub trait FamilyRepository: Send + Sync {
    async fn create(&self, family: NewFamily) -> Result<Family, DatabaseError>;
    async fn find_by_id(&self, id: FamilyId) -> Result<Option<Family>, DatabaseError>;
    async fn list(&self) -> Result<Vec<Family>, DatabaseError>;
}

/// Access to the user <-> family membership edges
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn exists(&self, user_id: UserId, family_id: FamilyId) -> Result<bool, DatabaseError>;

    /// Does not check for an existing edge; a duplicate surfaces as
    /// `DatabaseError::UniqueViolation`.
    async fn insert(&self, user_id: UserId, family_id: FamilyId, role: &str) -> Result<(), DatabaseError>;

    async fn list_members(&self, family_id: FamilyId) -> Result<Vec<FamilyMember>, DatabaseError>;
}

/// Bill rows. Every read is scoped by family id.
#[async_trait]
pub trait BillRepository: Send + Sync {
    async fn create(&self, family_id: FamilyId, bill: NewBill) -> Result<Bill, DatabaseError>;
    async fn list(&self, family_id: FamilyId) -> Result<Vec<Bill>, DatabaseError>;
    async fn select(&self, family_id: FamilyId, filter: &BillFilter) -> Result<Vec<Bill>, DatabaseError>;
    async fn find_in_family(&self, family_id: FamilyId, id: BillId) -> Result<Option<Bill>, DatabaseError>;
    async fn delete(&self, id: BillId) -> Result<(), DatabaseError>;
}

/// Everything a single backing store provides
pub trait Store: UserRepository + FamilyRepository + MembershipRepository + BillRepository {}

impl<T> Store for T where T: UserRepository + FamilyRepository + MembershipRepository + BillRepository {}
