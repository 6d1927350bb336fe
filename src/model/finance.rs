use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::utils::db_utils::{Assignment, SqlValue};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FinanceType {
    Income,
    Expense,
}

impl TryFrom<String> for FinanceType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FinanceStatus {
    Received,
    Pending,
    Overdue,
    Paid,
}

impl TryFrom<String> for FinanceStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single income or expense transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Finance {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: FinanceType,
    pub category: String,
    pub description: String,
    /// Decimal kept as text so no precision is lost on the way through.
    pub amount: String,
    #[sqlx(try_from = "String")]
    pub status: FinanceStatus,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Finance {
    pub const TABLE: &'static str = "finances";
    pub const COLUMNS: &'static str =
        r#"id, "type", category, description, amount, status, date, created_at"#;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinance {
    #[serde(rename = "type")]
    pub kind: FinanceType,
    pub category: String,
    pub description: String,
    pub amount: String,
    pub status: FinanceStatus,
    pub date: DateTime<Utc>,
}

impl NewFinance {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> Finance {
        Finance {
            id,
            kind: self.kind,
            category: self.category,
            description: self.description,
            amount: self.amount,
            status: self.status,
            date: self.date,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancePatch {
    #[serde(rename = "type")]
    pub kind: Option<FinanceType>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
    pub status: Option<FinanceStatus>,
    pub date: Option<DateTime<Utc>>,
}

impl FinancePatch {
    pub fn apply(&self, finance: &mut Finance) {
        if let Some(kind) = self.kind {
            finance.kind = kind;
        }
        if let Some(category) = &self.category {
            finance.category = category.clone();
        }
        if let Some(description) = &self.description {
            finance.description = description.clone();
        }
        if let Some(amount) = &self.amount {
            finance.amount = amount.clone();
        }
        if let Some(status) = self.status {
            finance.status = status;
        }
        if let Some(date) = self.date {
            finance.date = date;
        }
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(kind) = self.kind {
            out.push((r#""type""#, SqlValue::String(Some(kind.to_string()))));
        }
        if let Some(category) = &self.category {
            out.push(("category", SqlValue::String(Some(category.clone()))));
        }
        if let Some(description) = &self.description {
            out.push(("description", SqlValue::String(Some(description.clone()))));
        }
        if let Some(amount) = &self.amount {
            out.push(("amount", SqlValue::String(Some(amount.clone()))));
        }
        if let Some(status) = self.status {
            out.push(("status", SqlValue::String(Some(status.to_string()))));
        }
        if let Some(date) = self.date {
            out.push(("date", SqlValue::DateTime(date)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_lowercase_text() {
        assert_eq!(FinanceType::Income.to_string(), "income");
        assert_eq!(FinanceStatus::Overdue.as_ref(), "overdue");
        assert_eq!(
            FinanceStatus::try_from("paid".to_string()).unwrap(),
            FinanceStatus::Paid
        );
        assert!(FinanceType::try_from("refund".to_string()).is_err());
    }

    #[test]
    fn new_finance_reads_wire_shape() {
        let new: NewFinance = serde_json::from_str(
            r#"{
                "type": "income",
                "category": "consulting",
                "description": "March retainer",
                "amount": "500.00",
                "status": "pending",
                "date": "2024-03-15T00:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(new.kind, FinanceType::Income);
        assert_eq!(new.amount, "500.00");
        assert_eq!(new.status, FinanceStatus::Pending);
    }

    #[test]
    fn status_patch_keeps_amount() {
        let mut finance = NewFinance {
            kind: FinanceType::Income,
            category: "consulting".into(),
            description: "March retainer".into(),
            amount: "500.00".into(),
            status: FinanceStatus::Pending,
            date: Utc::now(),
        }
        .into_record(1, Utc::now());

        let patch = FinancePatch {
            status: Some(FinanceStatus::Received),
            ..Default::default()
        };
        patch.apply(&mut finance);

        assert_eq!(finance.status, FinanceStatus::Received);
        assert_eq!(finance.amount, "500.00");
        assert_eq!(
            patch.assignments(),
            vec![("status", SqlValue::String(Some("received".into())))]
        );
    }
}
