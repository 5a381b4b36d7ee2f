use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Postgres, QueryBuilder};

use super::error::FilterError;
use super::types::BillCondition;
use crate::database::models::Bill;
use crate::types::BillType;

/// Layout used by clients for bill dates, e.g. `2024-01-01 08:30:00`
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Conjunctive selection over a family's bills. An empty filter selects
/// every bill; the family scope itself is applied by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillFilter {
    conditions: Vec<BillCondition>,
}

impl BillFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(mut self, condition: BillCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn bill_type(self, bill_type: BillType) -> Self {
        self.condition(BillCondition::Type(bill_type))
    }

    pub fn category(self, category: impl Into<String>) -> Self {
        self.condition(BillCondition::Category(category.into()))
    }

    pub fn object(self, object: impl Into<String>) -> Self {
        self.condition(BillCondition::Object(object.into()))
    }

    pub fn username(self, username: impl Into<String>) -> Self {
        self.condition(BillCondition::Username(username.into()))
    }

    pub fn date_from(self, start: NaiveDateTime) -> Self {
        self.condition(BillCondition::DateFrom(start))
    }

    pub fn date_to(self, end: NaiveDateTime) -> Self {
        self.condition(BillCondition::DateTo(end))
    }

    /// Builds a filter from raw request fields. Missing or empty strings
    /// impose no constraint; anything else is matched verbatim.
    pub fn from_fields(
        bill_type: Option<&str>,
        category: Option<&str>,
        object: Option<&str>,
        username: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, FilterError> {
        let mut filter = Self::new();

        if let Some(t) = present(bill_type) {
            filter = filter.bill_type(t.parse()?);
        }
        if let Some(c) = present(category) {
            filter = filter.category(c);
        }
        if let Some(o) = present(object) {
            filter = filter.object(o);
        }
        if let Some(u) = present(username) {
            filter = filter.username(u);
        }
        if let Some(s) = present(start_date) {
            filter = filter.date_from(parse_bill_date("start_date", s)?);
        }
        if let Some(e) = present(end_date) {
            filter = filter.date_to(parse_bill_date("end_date", e)?);
        }

        Ok(filter)
    }

    pub fn conditions(&self) -> &[BillCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, bill: &Bill) -> bool {
        self.conditions.iter().all(|c| c.matches(bill))
    }

    /// Appends every condition to a query that already ends in a WHERE clause
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        for condition in &self.conditions {
            condition.push_sql(qb);
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` (midnight)
pub fn parse_bill_date(field: &'static str, value: &str) -> Result<NaiveDateTime, FilterError> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| FilterError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bill(date: &str, bill_type: BillType, category: &str) -> Bill {
        Bill {
            id: 1,
            family_id: 1,
            date: parse_bill_date("date", date).unwrap(),
            bill_type,
            amount: 100,
            category: category.to_string(),
            description: String::new(),
            object: "market".to_string(),
            username: "dad".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parses_both_date_layouts() {
        let full = parse_bill_date("date", "2024-03-05 13:45:00").unwrap();
        assert_eq!(full.to_string(), "2024-03-05 13:45:00");

        let bare = parse_bill_date("date", "2024-03-05").unwrap();
        assert_eq!(bare.to_string(), "2024-03-05 00:00:00");

        let err = parse_bill_date("start_date", "05/03/2024").unwrap_err();
        assert!(matches!(err, FilterError::InvalidDate { field: "start_date", .. }));
    }

    #[test]
    fn empty_fields_impose_no_constraint() {
        let filter = BillFilter::from_fields(Some(""), None, Some(""), None, None, Some("")).unwrap();
        assert!(filter.is_empty());
        assert!(filter.matches(&bill("2024-01-01", BillType::Income, "salary")));
    }

    #[test]
    fn equality_values_are_not_trimmed() {
        let filter = BillFilter::from_fields(None, Some(" food"), Some(""), None, None, None).unwrap();
        assert_eq!(filter.conditions(), &[BillCondition::Category(" food".to_string())]);
        assert!(filter.matches(&bill("2024-01-01", BillType::Expense, " food")));
        assert!(!filter.matches(&bill("2024-01-01", BillType::Expense, "food")));
    }

    #[test]
    fn conditions_are_anded() {
        let filter = BillFilter::from_fields(
            Some("expense"),
            None,
            None,
            None,
            Some("2024-01-01"),
            Some("2024-01-31 23:59:59"),
        )
        .unwrap();
        assert_eq!(filter.conditions().len(), 3);

        assert!(filter.matches(&bill("2024-01-15", BillType::Expense, "groceries")));
        assert!(filter.matches(&bill("2024-01-01", BillType::Expense, "groceries")));
        assert!(!filter.matches(&bill("2024-01-15", BillType::Income, "salary")));
        assert!(!filter.matches(&bill("2024-02-01", BillType::Expense, "groceries")));
    }

    #[test]
    fn rejects_unknown_type() {
        let err = BillFilter::from_fields(Some("transfer"), None, None, None, None, None).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBillType(_)));
    }

    #[test]
    fn pushes_parameterized_sql() {
        let filter = BillFilter::new().bill_type(BillType::Expense).category("groceries");
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bills WHERE family_id = ");
        qb.push_bind(7_i64);
        filter.push_sql(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM bills WHERE family_id = $1 AND \"bill_type\" = $2 AND \"category\" = $3"
        );
    }
}
