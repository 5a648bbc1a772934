use rust_decimal::Decimal;
use serde::Serialize;

use tillbook_core::{Amount, ProfitLoss, ReportMonth};

use crate::format::format_amount;

/// Sign of a month's result. Zero is its own outcome, not a profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Profit,
    BreakEven,
    Loss,
}

impl Outcome {
    pub fn classify(profit: Amount) -> Self {
        match profit.cmp(&Decimal::ZERO) {
            core::cmp::Ordering::Greater => Outcome::Profit,
            core::cmp::Ordering::Equal => Outcome::BreakEven,
            core::cmp::Ordering::Less => Outcome::Loss,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Outcome::Profit => "Net Profit",
            Outcome::BreakEven => "Break Even",
            Outcome::Loss => "Net Loss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitLossSummary {
    pub month: ReportMonth,
    pub sales: Amount,
    pub expenses: Amount,
    pub profit: Amount,
    pub outcome: Outcome,
}

impl ProfitLossSummary {
    pub fn new(month: ReportMonth, figures: &ProfitLoss) -> Self {
        Self {
            month,
            sales: figures.sales,
            expenses: figures.expenses,
            profit: figures.profit,
            outcome: Outcome::classify(figures.profit),
        }
    }

    /// e.g. `"Net Loss for March 2025"`.
    pub fn title(&self) -> String {
        format!("{} for {}", self.outcome.headline(), self.month.label())
    }

    pub fn display_profit(&self, currency: &str) -> String {
        format_amount(currency, self.profit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> ReportMonth {
        ReportMonth::new(2025, 3).unwrap()
    }

    #[test]
    fn spending_more_than_selling_is_a_loss() {
        let figures = ProfitLoss::new(Decimal::from(1000), Decimal::from(1200));
        let summary = ProfitLossSummary::new(march(), &figures);
        assert_eq!(summary.profit, Decimal::from(-200));
        assert_eq!(summary.outcome, Outcome::Loss);
        assert_eq!(summary.display_profit("PKR"), "-PKR 200");
        assert_eq!(summary.title(), "Net Loss for March 2025");
    }

    #[test]
    fn zero_is_break_even() {
        let figures = ProfitLoss::new(Decimal::from(500), Decimal::from(500));
        assert_eq!(ProfitLossSummary::new(march(), &figures).outcome, Outcome::BreakEven);
    }

    #[test]
    fn profit_is_taken_from_the_ledger() {
        let figures = ProfitLoss {
            sales: Decimal::from(10),
            expenses: Decimal::from(0),
            profit: Decimal::from(7),
        };
        assert_eq!(ProfitLossSummary::new(march(), &figures).profit, Decimal::from(7));
    }
}
