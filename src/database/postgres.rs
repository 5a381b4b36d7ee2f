use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Bill, Family, FamilyMember, NewBill, NewFamily, NewUser, User, UserChanges,
};
use crate::database::repository::{
    BillRepository, FamilyRepository, MembershipRepository, UserRepository,
};
use crate::filter::BillFilter;
use crate::types::{BillId, FamilyId, UserId};

const USER_COLUMNS: &str = "id, username, password_hash, phone, created_at, updated_at";
const FAMILY_COLUMNS: &str = "id, name, join_password, created_at";
const BILL_COLUMNS: &str = "id, family_id, bill_date, bill_type, amount, category, description, object, username, created_at";

/// Postgres-backed implementation of every repository
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, phone) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE phone = $1"))
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                password_hash = COALESCE($3, password_hash), \
                updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.username)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DatabaseError::QueryError(format!("user {id} vanished during update")))
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let rows = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl FamilyRepository for PgStore {
    async fn create(&self, family: NewFamily) -> Result<Family, DatabaseError> {
        let row = sqlx::query_as::<_, Family>(&format!(
            "INSERT INTO families (name, join_password) VALUES ($1, $2) RETURNING {FAMILY_COLUMNS}"
        ))
        .bind(&family.name)
        .bind(&family.join_password)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: FamilyId) -> Result<Option<Family>, DatabaseError> {
        let row = sqlx::query_as::<_, Family>(&format!("SELECT {FAMILY_COLUMNS} FROM families WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<Family>, DatabaseError> {
        let rows = sqlx::query_as::<_, Family>(&format!("SELECT {FAMILY_COLUMNS} FROM families ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl MembershipRepository for PgStore {
    async fn exists(&self, user_id: UserId, family_id: FamilyId) -> Result<bool, DatabaseError> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM family_users WHERE user_id = $1 AND family_id = $2)",
        )
        .bind(user_id)
        .bind(family_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn insert(&self, user_id: UserId, family_id: FamilyId, role: &str) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO family_users (user_id, family_id, role) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(family_id)
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_members(&self, family_id: FamilyId) -> Result<Vec<FamilyMember>, DatabaseError> {
        let rows = sqlx::query_as::<_, FamilyMember>(
            "SELECT family_users.user_id, users.username, family_users.role \
             FROM family_users \
             LEFT JOIN users ON family_users.user_id = users.id \
             WHERE family_users.family_id = $1",
        )
        .bind(family_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl BillRepository for PgStore {
    async fn create(&self, family_id: FamilyId, bill: NewBill) -> Result<Bill, DatabaseError> {
        let row = sqlx::query_as::<_, Bill>(&format!(
            "INSERT INTO bills (family_id, bill_date, bill_type, amount, category, description, object, username) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {BILL_COLUMNS}"
        ))
        .bind(family_id)
        .bind(bill.date)
        .bind(bill.bill_type.as_str())
        .bind(bill.amount)
        .bind(&bill.category)
        .bind(&bill.description)
        .bind(&bill.object)
        .bind(&bill.username)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, family_id: FamilyId) -> Result<Vec<Bill>, DatabaseError> {
        self.select(family_id, &BillFilter::new()).await
    }

    async fn select(&self, family_id: FamilyId, filter: &BillFilter) -> Result<Vec<Bill>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {BILL_COLUMNS} FROM bills WHERE family_id = "));
        qb.push_bind(family_id);
        filter.push_sql(&mut qb);

        debug!("Bill select: {}", qb.sql());

        let rows = qb.build_query_as::<Bill>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_in_family(&self, family_id: FamilyId, id: BillId) -> Result<Option<Bill>, DatabaseError> {
        let row = sqlx::query_as::<_, Bill>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE id = $1 AND family_id = $2"
        ))
        .bind(id)
        .bind(family_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: BillId) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM bills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
