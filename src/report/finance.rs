//! Revenue figures for the finance dashboard, computed from the stored transactions.

use chrono::Datelike;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::{Finance, FinanceStatus, FinanceType};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Display)]
pub enum ReportError {
    #[display(fmt = "finance record {} has a non-decimal amount {:?}", id, amount)]
    InvalidAmount { id: i64, amount: String },
}

impl std::error::Error for ReportError {}

fn amount_of(finance: &Finance) -> Result<Decimal, ReportError> {
    finance
        .amount
        .trim()
        .parse::<Decimal>()
        .map_err(|_| ReportError::InvalidAmount {
            id: finance.id,
            amount: finance.amount.clone(),
        })
}

/// Share of `part` in `total` as a percentage with one decimal, zero when nothing is expected.
fn percent(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (part / total * Decimal::ONE_HUNDRED).round_dp(1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub received_income: Decimal,
    /// Income not yet received, overdue included.
    pub pending_income: Decimal,
    pub overdue_amount: Decimal,
    pub total_expected_income: Decimal,
    pub total_expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSlice {
    pub category: &'static str,
    pub amount: Decimal,
    pub percent_of_expected: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIncome {
    pub month: &'static str,
    pub expected: Decimal,
    pub received: Decimal,
    /// Everything not received yet, paid and overdue included.
    pub pending: Decimal,
}

impl FinanceSummary {
    pub fn from_transactions(transactions: &[Finance]) -> Result<Self, ReportError> {
        let mut received_income = Decimal::ZERO;
        let mut pending_income = Decimal::ZERO;
        let mut overdue_amount = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;

        for finance in transactions {
            let amount = amount_of(finance)?;
            match (finance.kind, finance.status) {
                (FinanceType::Income, FinanceStatus::Received) => received_income += amount,
                (FinanceType::Income, FinanceStatus::Pending) => pending_income += amount,
                (FinanceType::Income, FinanceStatus::Overdue) => {
                    pending_income += amount;
                    overdue_amount += amount;
                }
                (FinanceType::Income, FinanceStatus::Paid) => {}
                (FinanceType::Expense, _) => total_expenses += amount,
            }
        }

        Ok(Self {
            received_income,
            pending_income,
            overdue_amount,
            total_expected_income: received_income + pending_income,
            total_expenses,
        })
    }

    pub fn received_pct(&self) -> Decimal {
        percent(self.received_income, self.total_expected_income)
    }

    /// Pending share without the overdue part.
    pub fn pending_pct(&self) -> Decimal {
        percent(
            self.pending_income - self.overdue_amount,
            self.total_expected_income,
        )
    }

    pub fn overdue_pct(&self) -> Decimal {
        percent(self.overdue_amount, self.total_expected_income)
    }

    /// Received / pending / overdue split of the expected income.
    pub fn breakdown(&self) -> Vec<RevenueSlice> {
        vec![
            RevenueSlice {
                category: "Received",
                amount: self.received_income,
                percent_of_expected: self.received_pct(),
            },
            RevenueSlice {
                category: "Pending",
                amount: self.pending_income - self.overdue_amount,
                percent_of_expected: self.pending_pct(),
            },
            RevenueSlice {
                category: "Overdue",
                amount: self.overdue_amount,
                percent_of_expected: self.overdue_pct(),
            },
        ]
    }

    /// Income per calendar month of `year`, January first.
    pub fn monthly(transactions: &[Finance], year: i32) -> Result<Vec<MonthlyIncome>, ReportError> {
        let mut months: Vec<MonthlyIncome> = MONTHS
            .iter()
            .map(|&month| MonthlyIncome {
                month,
                expected: Decimal::ZERO,
                received: Decimal::ZERO,
                pending: Decimal::ZERO,
            })
            .collect();

        for finance in transactions {
            if finance.kind != FinanceType::Income || finance.date.year() != year {
                continue;
            }

            let amount = amount_of(finance)?;
            let slot = &mut months[finance.date.month0() as usize];
            slot.expected += amount;
            if finance.status == FinanceStatus::Received {
                slot.received += amount;
            } else {
                slot.pending += amount;
            }
        }

        Ok(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewFinance;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn tx(
        id: i64,
        kind: FinanceType,
        amount: &str,
        status: FinanceStatus,
        (y, m, d): (i32, u32, u32),
    ) -> Finance {
        NewFinance {
            kind,
            category: "general".into(),
            description: "test".into(),
            amount: amount.into(),
            status,
            date: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
        }
        .into_record(id, Utc::now())
    }

    #[test]
    fn pending_and_received_income() {
        let transactions = vec![
            tx(1, FinanceType::Income, "500.00", FinanceStatus::Pending, (2024, 3, 15)),
            tx(2, FinanceType::Income, "200.00", FinanceStatus::Received, (2024, 3, 20)),
        ];

        let summary = FinanceSummary::from_transactions(&transactions).unwrap();
        assert_eq!(summary.total_expected_income, dec("700.00"));
        assert_eq!(summary.received_income, dec("200.00"));
        assert_eq!(summary.pending_income, dec("500.00"));
        assert_eq!(summary.overdue_amount, Decimal::ZERO);
        assert_eq!(summary.total_expenses, Decimal::ZERO);
        assert_eq!(summary.received_pct(), dec("28.6"));
    }

    #[test]
    fn overdue_counts_as_pending_but_splits_in_breakdown() {
        let transactions = vec![
            tx(1, FinanceType::Income, "300", FinanceStatus::Pending, (2024, 1, 5)),
            tx(2, FinanceType::Income, "100", FinanceStatus::Overdue, (2024, 1, 6)),
            tx(3, FinanceType::Income, "600", FinanceStatus::Received, (2024, 2, 1)),
            tx(4, FinanceType::Expense, "80.50", FinanceStatus::Paid, (2024, 2, 2)),
            tx(5, FinanceType::Expense, "19.50", FinanceStatus::Pending, (2024, 2, 3)),
        ];

        let summary = FinanceSummary::from_transactions(&transactions).unwrap();
        assert_eq!(summary.pending_income, dec("400"));
        assert_eq!(summary.overdue_amount, dec("100"));
        assert_eq!(summary.total_expected_income, dec("1000"));
        assert_eq!(summary.total_expenses, dec("100.00"));

        let slices = summary.breakdown();
        assert_eq!(slices[0].amount, dec("600"));
        assert_eq!(slices[1].amount, dec("300"));
        assert_eq!(slices[2].amount, dec("100"));
        assert_eq!(slices[1].percent_of_expected, dec("30.0"));
    }

    #[test]
    fn empty_ledger_has_zero_percentages() {
        let summary = FinanceSummary::from_transactions(&[]).unwrap();
        assert_eq!(summary.received_pct(), Decimal::ZERO);
        assert_eq!(summary.overdue_pct(), Decimal::ZERO);
    }

    #[test]
    fn text_amounts_keep_precision() {
        let transactions = vec![
            tx(1, FinanceType::Income, "0.10", FinanceStatus::Received, (2024, 1, 1)),
            tx(2, FinanceType::Income, "0.20", FinanceStatus::Received, (2024, 1, 1)),
        ];

        let summary = FinanceSummary::from_transactions(&transactions).unwrap();
        assert_eq!(summary.received_income, dec("0.30"));
    }

    #[test]
    fn bad_amount_names_the_record() {
        let transactions = vec![tx(9, FinanceType::Income, "12,5", FinanceStatus::Received, (2024, 1, 1))];

        let err = FinanceSummary::from_transactions(&transactions).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"finance record 9 has a non-decimal amount "12,5""#
        );
    }

    #[test]
    fn monthly_buckets_only_the_requested_year() {
        let transactions = vec![
            tx(1, FinanceType::Income, "500.00", FinanceStatus::Pending, (2024, 3, 15)),
            tx(2, FinanceType::Income, "200.00", FinanceStatus::Received, (2024, 3, 20)),
            tx(3, FinanceType::Income, "50", FinanceStatus::Received, (2023, 3, 20)),
            tx(4, FinanceType::Expense, "70", FinanceStatus::Paid, (2024, 3, 21)),
        ];

        let months = FinanceSummary::monthly(&transactions, 2024).unwrap();
        assert_eq!(months.len(), 12);

        let march = &months[2];
        assert_eq!(march.month, "Mar");
        assert_eq!(march.expected, dec("700.00"));
        assert_eq!(march.received, dec("200.00"));
        assert_eq!(march.pending, dec("500.00"));
        assert!(months[0].expected.is_zero());
    }
}
