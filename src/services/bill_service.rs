use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::{ensure_max_chars, LedgerError, LedgerResult};
use super::membership::MembershipGuard;
use crate::database::models::{Bill, NewBill};
use crate::database::BillRepository;
use crate::filter::BillFilter;
use crate::middleware::AuthUser;
use crate::types::{BillId, FamilyId};

/// Widths of the `bills` text columns
pub const BILL_FIELD_MAX_LEN: usize = 100;
pub const BILL_DESCRIPTION_MAX_LEN: usize = 255;

/// Bill operations. Each one passes the membership guard before touching the store.
#[derive(Clone)]
pub struct BillService {
    guard: MembershipGuard,
    bills: Arc<dyn BillRepository>,
}

impl BillService {
    pub fn new(guard: MembershipGuard, bills: Arc<dyn BillRepository>) -> Self {
        Self { guard, bills }
    }

    pub async fn create(&self, auth: &AuthUser, family_id: FamilyId, bill: NewBill) -> LedgerResult<Bill> {
        let admission = self.guard.require_member(auth, family_id).await?;

        if bill.amount <= 0 {
            return Err(LedgerError::MalformedInput(format!(
                "amount must be positive, got {}",
                bill.amount
            )));
        }
        ensure_max_chars("category", &bill.category, BILL_FIELD_MAX_LEN)?;
        ensure_max_chars("object", &bill.object, BILL_FIELD_MAX_LEN)?;
        ensure_max_chars("username", &bill.username, BILL_FIELD_MAX_LEN)?;
        ensure_max_chars("description", &bill.description, BILL_DESCRIPTION_MAX_LEN)?;

        let bill = self.bills.create(admission.family_id, bill).await?;
        info!(
            "Bill {} ({} {}) added to family {} by user {}",
            bill.id,
            bill.bill_type,
            bill.amount,
            bill.family_id,
            admission.identity.user_id()
        );
        Ok(bill)
    }

    pub async fn list(&self, auth: &AuthUser, family_id: FamilyId) -> LedgerResult<Vec<Bill>> {
        let admission = self.guard.require_member(auth, family_id).await?;
        let bills = self.bills.list(admission.family_id).await?;
        Ok(bills)
    }

    pub async fn select(&self, auth: &AuthUser, family_id: FamilyId, filter: BillFilter) -> LedgerResult<Vec<Bill>> {
        let admission = self.guard.require_member(auth, family_id).await?;
        let bills = self.bills.select(admission.family_id, &filter).await?;
        debug!(
            "Filter with {} condition(s) matched {} bill(s) in family {}",
            filter.conditions().len(),
            bills.len(),
            admission.family_id
        );
        Ok(bills)
    }

    /// The bill must belong to `family_id`; a bill of another family is reported
    /// exactly like a missing one.
    pub async fn delete(&self, auth: &AuthUser, family_id: FamilyId, bill_id: BillId) -> LedgerResult<()> {
        let admission = self.guard.require_member(auth, family_id).await?;

        if self.bills.find_in_family(admission.family_id, bill_id).await?.is_none() {
            warn!("Bill {} not found in family {}", bill_id, admission.family_id);
            return Err(LedgerError::BillNotFound(bill_id));
        }

        self.bills.delete(bill_id).await?;
        info!(
            "Bill {} deleted from family {} by user {}",
            bill_id,
            admission.family_id,
            admission.identity.user_id()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_bill_date;
    use crate::services::identity::IdentityResolver;
    use crate::testing::MemoryStore;
    use crate::types::BillType;

    fn service(store: &Arc<MemoryStore>) -> BillService {
        let guard = MembershipGuard::new(IdentityResolver::new(store.clone()), store.clone());
        BillService::new(guard, store.clone())
    }

    fn bill(date: &str, bill_type: BillType, amount: i64, category: &str) -> NewBill {
        NewBill {
            date: parse_bill_date("date", date).unwrap(),
            bill_type,
            amount,
            category: category.to_string(),
            description: String::new(),
            object: "market".to_string(),
            username: "alice".to_string(),
        }
    }

    /// alice belongs to family A, bob to family B
    async fn two_families(store: &Arc<MemoryStore>) -> (FamilyId, FamilyId) {
        let alice = store.seed_user("alice", "13800000001").await;
        let bob = store.seed_user("bob", "13800000002").await;
        let a = store.seed_family("Smiths", "abc123").await;
        let b = store.seed_family("Joneses", "xyz789").await;
        store.seed_member(alice.id, a.id, "mother").await;
        store.seed_member(bob.id, b.id, "father").await;
        (a.id, b.id)
    }

    #[tokio::test]
    async fn member_creates_and_lists_bills() {
        let store = MemoryStore::new();
        let (a, _) = two_families(&store).await;
        let svc = service(&store);
        let alice = AuthUser::new("13800000001");

        let created = svc
            .create(&alice, a, bill("2024-01-15", BillType::Expense, 1200, "food"))
            .await
            .unwrap();
        assert_eq!(created.family_id, a);

        let bills = svc.list(&alice, a).await.unwrap();
        assert_eq!(bills, vec![created]);
    }

    #[tokio::test]
    async fn non_member_is_denied_everything_and_store_is_untouched() {
        let store = MemoryStore::new();
        let (a, _) = two_families(&store).await;
        let svc = service(&store);
        let alice = AuthUser::new("13800000001");
        let bob = AuthUser::new("13800000002");

        let existing = svc
            .create(&alice, a, bill("2024-01-15", BillType::Expense, 1200, "food"))
            .await
            .unwrap();

        let err = svc
            .create(&bob, a, bill("2024-01-16", BillType::Income, 500, "gift"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotAMember(_)));

        assert!(matches!(svc.list(&bob, a).await, Err(LedgerError::NotAMember(_))));
        assert!(matches!(
            svc.select(&bob, a, BillFilter::new()).await,
            Err(LedgerError::NotAMember(_))
        ));
        assert!(matches!(
            svc.delete(&bob, a, existing.id).await,
            Err(LedgerError::NotAMember(_))
        ));

        assert_eq!(store.bill_count().await, 1);
    }

    #[tokio::test]
    async fn cross_family_delete_is_bill_not_found() {
        let store = MemoryStore::new();
        let (a, b) = two_families(&store).await;
        let svc = service(&store);

        let alices = svc
            .create(&AuthUser::new("13800000001"), a, bill("2024-01-15", BillType::Expense, 1200, "food"))
            .await
            .unwrap();

        // bob is a member of B, addressing A's bill through B
        let err = svc
            .delete(&AuthUser::new("13800000002"), b, alices.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BillNotFound(id) if id == alices.id));
        assert_eq!(store.bill_count().await, 1);
    }

    #[tokio::test]
    async fn delete_removes_own_bill() {
        let store = MemoryStore::new();
        let (a, _) = two_families(&store).await;
        let svc = service(&store);
        let alice = AuthUser::new("13800000001");

        let created = svc
            .create(&alice, a, bill("2024-01-15", BillType::Expense, 1200, "food"))
            .await
            .unwrap();
        svc.delete(&alice, a, created.id).await.unwrap();

        assert!(svc.list(&alice, a).await.unwrap().is_empty());
        assert!(matches!(
            svc.delete(&alice, a, created.id).await,
            Err(LedgerError::BillNotFound(_))
        ));
    }

    #[tokio::test]
    async fn select_combines_type_and_date_range() {
        let store = MemoryStore::new();
        let (a, b) = two_families(&store).await;
        let svc = service(&store);
        let alice = AuthUser::new("13800000001");
        let bob = AuthUser::new("13800000002");

        svc.create(&alice, a, bill("2024-01-05", BillType::Expense, 100, "food")).await.unwrap();
        let inside = svc
            .create(&alice, a, bill("2024-01-15 18:30:00", BillType::Expense, 200, "fuel"))
            .await
            .unwrap();
        svc.create(&alice, a, bill("2024-01-20", BillType::Income, 300, "salary")).await.unwrap();
        svc.create(&alice, a, bill("2024-02-01", BillType::Expense, 400, "food")).await.unwrap();
        svc.create(&bob, b, bill("2024-01-15", BillType::Expense, 500, "food")).await.unwrap();

        let filter = BillFilter::new()
            .bill_type(BillType::Expense)
            .date_from(parse_bill_date("start_date", "2024-01-10").unwrap())
            .date_to(parse_bill_date("end_date", "2024-01-31").unwrap());

        let bills = svc.select(&alice, a, filter).await.unwrap();
        assert_eq!(bills, vec![inside]);

        let all = svc.select(&alice, a, BillFilter::new()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|bill| bill.family_id == a));
    }

    #[tokio::test]
    async fn date_range_bounds_are_inclusive() {
        let store = MemoryStore::new();
        let (a, _) = two_families(&store).await;
        let svc = service(&store);
        let alice = AuthUser::new("13800000001");

        svc.create(&alice, a, bill("2024-03-01", BillType::Expense, 10, "food")).await.unwrap();
        svc.create(&alice, a, bill("2024-03-31", BillType::Expense, 20, "food")).await.unwrap();

        let filter = BillFilter::new()
            .date_from(parse_bill_date("start_date", "2024-03-01").unwrap())
            .date_to(parse_bill_date("end_date", "2024-03-31").unwrap());
        assert_eq!(svc.select(&alice, a, filter).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let store = MemoryStore::new();
        let (a, _) = two_families(&store).await;

        let err = service(&store)
            .create(&AuthUser::new("13800000001"), a, bill("2024-01-15", BillType::Expense, 0, "food"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::MalformedInput(_)));
        assert_eq!(store.bill_count().await, 0);
    }

    #[tokio::test]
    async fn text_fields_fit_their_columns() {
        let store = MemoryStore::new();
        let (a, _) = two_families(&store).await;
        let svc = service(&store);
        let alice = AuthUser::new("13800000001");

        let mut widest = bill("2024-01-15", BillType::Expense, 10, &"c".repeat(BILL_FIELD_MAX_LEN));
        widest.object = "o".repeat(BILL_FIELD_MAX_LEN);
        widest.username = "u".repeat(BILL_FIELD_MAX_LEN);
        widest.description = "d".repeat(BILL_DESCRIPTION_MAX_LEN);
        svc.create(&alice, a, widest.clone()).await.unwrap();

        let overflow: [fn(&mut NewBill); 4] = [
            |b| b.category.push('c'),
            |b| b.object.push('o'),
            |b| b.username.push('u'),
            |b| b.description.push('d'),
        ];
        for grow in overflow {
            let mut new_bill = widest.clone();
            grow(&mut new_bill);
            let err = svc.create(&alice, a, new_bill).await.unwrap_err();
            assert!(matches!(err, LedgerError::MalformedInput(_)));
        }
        assert_eq!(store.bill_count().await, 1);
    }
}
