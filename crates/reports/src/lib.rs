//! Aggregation engine.
//!
//! Pure functions over collections already read through the cache. Nothing
//! here is stored; every view is re-derived on each read.
//!
//! Pre-aggregated ledger values (dashboard stats, profit/loss) are only
//! labelled and formatted, never recomputed from raw records.

pub mod dashboard;
pub mod expenses;
pub mod format;
pub mod lists;
pub mod profit;
pub mod sales;

pub use dashboard::{DashboardCard, dashboard_cards};
pub use expenses::{CategoryTotal, MonthlyExpenses, category_breakdown, expenses_by_month, total_expenses};
pub use format::{DEFAULT_CURRENCY, format_amount, group_digits};
pub use lists::{
    ALL_CATEGORIES, customers_with_due, low_stock, search_customers, search_products, total_due,
};
pub use profit::{Outcome, ProfitLossSummary};
pub use sales::{WEEK_BUCKETS, WeekBucket, customer_sales, week_index, weekly_sales};
