pub mod finance;

pub use finance::{FinanceSummary, MonthlyIncome, ReportError, RevenueSlice};
