pub mod account_service;
pub mod bill_service;
pub mod error;
pub mod family_service;
pub mod identity;
pub mod membership;

pub use account_service::{AccountService, LoginOutcome};
pub use bill_service::BillService;
pub use error::{LedgerError, LedgerResult};
pub use family_service::{FamilyService, JoinRequest};
pub use identity::{Identity, IdentityResolver};
pub use membership::{Admission, MembershipGuard};
