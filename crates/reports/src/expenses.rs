use std::collections::BTreeMap;

use chrono::FixedOffset;
use rust_decimal::Decimal;
use serde::Serialize;

use tillbook_core::{Amount, Expense, ReportMonth, sum_amounts};

/// Spending of one category, with its bar width relative to the largest
/// category (`0..=1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
    pub count: usize,
    pub width: Decimal,
}

pub fn total_expenses(expenses: &[Expense]) -> Amount {
    sum_amounts(expenses.iter().map(|e| e.amount))
}

/// Groups by exact (case-sensitive) category label, largest total first.
///
/// Widths are normalised against the largest total, with a denominator of at
/// least 1 so an all-zero breakdown does not divide by zero.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<&str, (Amount, usize)> = BTreeMap::new();
    for expense in expenses {
        let slot = groups.entry(expense.category.as_str()).or_default();
        slot.0 = slot.0.saturating_add(expense.amount);
        slot.1 += 1;
    }

    let max_total = groups
        .values()
        .map(|(total, _)| *total)
        .max()
        .unwrap_or(Decimal::ZERO);
    let denominator = max_total.max(Decimal::ONE);

    let mut totals: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
            width: total / denominator,
        })
        .collect();
    // BTreeMap order already sorts names; a stable sort keeps it for ties.
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

/// Expenses of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyExpenses {
    pub month: ReportMonth,
    pub total: Amount,
    pub expenses: Vec<Expense>,
}

/// Groups by month at `offset`, newest month first and newest expense first
/// within a month.
pub fn expenses_by_month(expenses: &[Expense], offset: FixedOffset) -> Vec<MonthlyExpenses> {
    let mut months: BTreeMap<ReportMonth, Vec<Expense>> = BTreeMap::new();
    for expense in expenses {
        months
            .entry(ReportMonth::containing(expense.date, offset))
            .or_default()
            .push(expense.clone());
    }

    months
        .into_iter()
        .rev()
        .map(|(month, mut items)| {
            items.sort_by(|a, b| b.date.cmp(&a.date));
            MonthlyExpenses {
                month,
                total: total_expenses(&items),
                expenses: items,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use tillbook_core::{ExpenseId, Timestamp};

    fn expense(id: u64, amount: i64, category: &str, date: Timestamp) -> Expense {
        Expense {
            id: ExpenseId::new(id),
            amount: Decimal::from(amount),
            category: category.to_string(),
            description: String::new(),
            date,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn categories_are_summed_and_sorted_by_total() {
        let at = day(2025, 3, 1);
        let expenses = vec![
            expense(1, 100, "Rent", at),
            expense(2, 300, "Stock", at),
            expense(3, 250, "Rent", at),
            expense(4, 50, "rent", at),
        ];
        let breakdown = category_breakdown(&expenses);
        let rows: Vec<(&str, Amount, usize)> = breakdown
            .iter()
            .map(|c| (c.category.as_str(), c.total, c.count))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Rent", Decimal::from(350), 2),
                ("Stock", Decimal::from(300), 1),
                ("rent", Decimal::from(50), 1),
            ]
        );
        assert_eq!(breakdown[0].width, Decimal::ONE);
    }

    #[test]
    fn zero_totals_do_not_divide_by_zero() {
        let breakdown = category_breakdown(&[expense(1, 0, "Misc", day(2025, 3, 1))]);
        assert_eq!(breakdown[0].width, Decimal::ZERO);
    }

    #[test]
    fn months_are_listed_newest_first() {
        let expenses = vec![
            expense(1, 10, "Rent", day(2025, 1, 5)),
            expense(2, 20, "Rent", day(2025, 3, 2)),
            expense(3, 30, "Rent", day(2025, 3, 20)),
        ];
        let grouped = expenses_by_month(&expenses, utc());
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].month, ReportMonth::new(2025, 3).unwrap());
        assert_eq!(grouped[0].total, Decimal::from(50));
        assert_eq!(grouped[0].expenses[0].id, ExpenseId::new(3));
        assert_eq!(grouped[1].month, ReportMonth::new(2025, 1).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Every expense lands in exactly one category and widths stay in `0..=1`.
        #[test]
        fn breakdown_preserves_the_grand_total(
            rows in prop::collection::vec((0i64..10_000, 0usize..4), 0..40)
        ) {
            const CATEGORIES: [&str; 4] = ["Rent", "Stock", "Salary", "Other"];
            let at = day(2025, 3, 1);
            let expenses: Vec<Expense> = rows
                .iter()
                .enumerate()
                .map(|(i, (amount, cat))| expense(i as u64, *amount, CATEGORIES[*cat], at))
                .collect();

            let breakdown = category_breakdown(&expenses);
            let summed: Amount = breakdown.iter().map(|c| c.total).sum();
            prop_assert_eq!(summed, total_expenses(&expenses));
            prop_assert_eq!(breakdown.iter().map(|c| c.count).sum::<usize>(), expenses.len());
            for row in &breakdown {
                prop_assert!(row.width >= Decimal::ZERO && row.width <= Decimal::ONE);
            }
        }
    }
}
