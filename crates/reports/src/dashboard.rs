use rust_decimal::Decimal;
use serde::Serialize;

use tillbook_core::DashboardStats;

use crate::format::{format_amount, group_digits};

/// One headline tile of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCard {
    pub label: &'static str,
    pub value: String,
}

/// Labels the ledger's dashboard figures in display order.
pub fn dashboard_cards(stats: &DashboardStats, currency: &str) -> Vec<DashboardCard> {
    vec![
        DashboardCard {
            label: "Total Customers",
            value: group_digits(Decimal::from(stats.total_customers)),
        },
        DashboardCard {
            label: "Total Sales",
            value: format_amount(currency, stats.total_sales_amount),
        },
        DashboardCard {
            label: "Total Products",
            value: group_digits(Decimal::from(stats.total_products)),
        },
        DashboardCard {
            label: "Today's Revenue",
            value: format_amount(currency, stats.today_revenue),
        },
    ]
}
