pub mod bill;
pub mod family;
pub mod user;

pub use bill::{Bill, NewBill};
pub use family::{Family, FamilyMember, FamilyUser, NewFamily};
pub use user::{NewUser, User, UserChanges};
