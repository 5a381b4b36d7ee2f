//! In-memory store used by unit and integration tests. It enforces the same
//! uniqueness rules as the Postgres schema.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::database::models::{
    Bill, Family, FamilyMember, FamilyUser, NewBill, NewFamily, NewUser, User, UserChanges,
};
use crate::database::{BillRepository, DatabaseError, FamilyRepository, MembershipRepository, UserRepository};
use crate::filter::BillFilter;
use crate::types::{BillId, FamilyId, UserId};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    families: Vec<Family>,
    family_users: Vec<FamilyUser>,
    bills: Vec<Bill>,
    next_user_id: i64,
    next_family_id: i64,
    next_bill_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    race_membership_insert: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// While set, every call fails with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The next membership insert behaves as if a concurrent request had
    /// inserted the same edge first.
    pub fn race_next_membership_insert(&self) {
        self.race_membership_insert.store(true, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionError("memory store is unavailable".to_string()));
        }
        Ok(())
    }

    /// Inserts a user with a placeholder password hash
    pub async fn seed_user(&self, username: &str, phone: &str) -> User {
        let mut tables = self.tables.lock().await;
        insert_user(
            &mut tables,
            NewUser {
                username: username.to_string(),
                password_hash: "seeded".to_string(),
                phone: phone.to_string(),
            },
        )
    }

    pub async fn seed_family(&self, name: &str, join_password: &str) -> Family {
        let mut tables = self.tables.lock().await;
        insert_family(
            &mut tables,
            NewFamily {
                name: name.to_string(),
                join_password: join_password.to_string(),
            },
        )
    }

    pub async fn seed_member(&self, user_id: UserId, family_id: FamilyId, role: &str) {
        let mut tables = self.tables.lock().await;
        tables.family_users.push(FamilyUser {
            user_id,
            family_id,
            role: role.to_string(),
            created_at: Utc::now(),
        });
    }

    pub async fn edge_count(&self, user_id: UserId, family_id: FamilyId) -> usize {
        let tables = self.tables.lock().await;
        tables
            .family_users
            .iter()
            .filter(|edge| edge.user_id == user_id && edge.family_id == family_id)
            .count()
    }

    pub async fn family_count(&self) -> usize {
        self.tables.lock().await.families.len()
    }

    pub async fn bill_count(&self) -> usize {
        self.tables.lock().await.bills.len()
    }
}

fn insert_user(tables: &mut Tables, user: NewUser) -> User {
    tables.next_user_id += 1;
    let now = Utc::now();
    let user = User {
        id: tables.next_user_id,
        username: user.username,
        password_hash: user.password_hash,
        phone: user.phone,
        created_at: now,
        updated_at: now,
    };
    tables.users.push(user.clone());
    user
}

fn insert_family(tables: &mut Tables, family: NewFamily) -> Family {
    tables.next_family_id += 1;
    let family = Family {
        id: tables.next_family_id,
        name: family.name,
        join_password: family.join_password,
        created_at: Utc::now(),
    };
    tables.families.push(family.clone());
    family
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }
        if tables.users.iter().any(|u| u.phone == user.phone) {
            return Err(DatabaseError::UniqueViolation("users_phone_key".to_string()));
        }
        Ok(insert_user(&mut tables, user))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.phone == phone).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        if let Some(username) = &changes.username {
            if tables.users.iter().any(|u| u.id != id && &u.username == username) {
                return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
            }
        }

        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DatabaseError::QueryError(format!("user {} does not exist", id)))?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        self.check_available()?;
        Ok(self.tables.lock().await.users.clone())
    }
}

#[async_trait]
impl FamilyRepository for MemoryStore {
    async fn create(&self, family: NewFamily) -> Result<Family, DatabaseError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        Ok(insert_family(&mut tables, family))
    }

    async fn find_by_id(&self, id: FamilyId) -> Result<Option<Family>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.families.iter().find(|f| f.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Family>, DatabaseError> {
        self.check_available()?;
        Ok(self.tables.lock().await.families.clone())
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn exists(&self, user_id: UserId, family_id: FamilyId) -> Result<bool, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .family_users
            .iter()
            .any(|edge| edge.user_id == user_id && edge.family_id == family_id))
    }

    async fn insert(&self, user_id: UserId, family_id: FamilyId, role: &str) -> Result<(), DatabaseError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        if self.race_membership_insert.swap(false, Ordering::SeqCst) {
            tables.family_users.push(FamilyUser {
                user_id,
                family_id,
                role: role.to_string(),
                created_at: Utc::now(),
            });
        }

        if tables
            .family_users
            .iter()
            .any(|edge| edge.user_id == user_id && edge.family_id == family_id)
        {
            return Err(DatabaseError::UniqueViolation("family_users_pkey".to_string()));
        }
        if !tables.users.iter().any(|u| u.id == user_id) || !tables.families.iter().any(|f| f.id == family_id) {
            return Err(DatabaseError::QueryError("foreign key violation on family_users".to_string()));
        }

        tables.family_users.push(FamilyUser {
            user_id,
            family_id,
            role: role.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_members(&self, family_id: FamilyId) -> Result<Vec<FamilyMember>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .family_users
            .iter()
            .filter(|edge| edge.family_id == family_id)
            .map(|edge| FamilyMember {
                user_id: edge.user_id,
                username: tables
                    .users
                    .iter()
                    .find(|u| u.id == edge.user_id)
                    .map(|u| u.username.clone()),
                role: edge.role.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl BillRepository for MemoryStore {
    async fn create(&self, family_id: FamilyId, bill: NewBill) -> Result<Bill, DatabaseError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        tables.next_bill_id += 1;
        let bill = Bill {
            id: tables.next_bill_id,
            family_id,
            date: bill.date,
            bill_type: bill.bill_type,
            amount: bill.amount,
            category: bill.category,
            description: bill.description,
            object: bill.object,
            username: bill.username,
            created_at: Utc::now(),
        };
        tables.bills.push(bill.clone());
        Ok(bill)
    }

    async fn list(&self, family_id: FamilyId) -> Result<Vec<Bill>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.bills.iter().filter(|b| b.family_id == family_id).cloned().collect())
    }

    async fn select(&self, family_id: FamilyId, filter: &BillFilter) -> Result<Vec<Bill>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .bills
            .iter()
            .filter(|b| b.family_id == family_id && filter.matches(b))
            .cloned()
            .collect())
    }

    async fn find_in_family(&self, family_id: FamilyId, id: BillId) -> Result<Option<Bill>, DatabaseError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .bills
            .iter()
            .find(|b| b.id == id && b.family_id == family_id)
            .cloned())
    }

    async fn delete(&self, id: BillId) -> Result<(), DatabaseError> {
        self.check_available()?;
        self.tables.lock().await.bills.retain(|b| b.id != id);
        Ok(())
    }
}
