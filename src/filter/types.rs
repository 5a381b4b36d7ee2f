use chrono::NaiveDateTime;
use sqlx::{Postgres, QueryBuilder};

use crate::database::models::Bill;
use crate::types::BillType;

/// One predicate of a bill selection. A filter is a conjunction of these.
#[derive(Debug, Clone, PartialEq)]
pub enum BillCondition {
    Type(BillType),
    Category(String),
    Object(String),
    Username(String),
    /// Inclusive lower bound on the bill date
    DateFrom(NaiveDateTime),
    /// Inclusive upper bound on the bill date
    DateTo(NaiveDateTime),
}

impl BillCondition {
    pub fn column(&self) -> &'static str {
        match self {
            BillCondition::Type(_) => "bill_type",
            BillCondition::Category(_) => "category",
            BillCondition::Object(_) => "object",
            BillCondition::Username(_) => "username",
            BillCondition::DateFrom(_) | BillCondition::DateTo(_) => "bill_date",
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            BillCondition::DateFrom(_) => ">=",
            BillCondition::DateTo(_) => "<=",
            _ => "=",
        }
    }

    pub fn matches(&self, bill: &Bill) -> bool {
        match self {
            BillCondition::Type(t) => bill.bill_type == *t,
            BillCondition::Category(c) => bill.category == *c,
            BillCondition::Object(o) => bill.object == *o,
            BillCondition::Username(u) => bill.username == *u,
            BillCondition::DateFrom(start) => bill.date >= *start,
            BillCondition::DateTo(end) => bill.date <= *end,
        }
    }

    /// Appends `AND "<column>" <op> $n` with the value bound as a parameter
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        qb.push(" AND \"")
            .push(self.column())
            .push("\" ")
            .push(self.operator())
            .push(" ");
        match self {
            BillCondition::Type(t) => qb.push_bind(t.as_str()),
            BillCondition::Category(v) | BillCondition::Object(v) | BillCondition::Username(v) => {
                qb.push_bind(v.clone())
            }
            BillCondition::DateFrom(d) | BillCondition::DateTo(d) => qb.push_bind(*d),
        };
    }
}
