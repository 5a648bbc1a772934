//! Named records for the ledger's pre-aggregated reads.

use serde::{Deserialize, Serialize};

use crate::money::Amount;

/// Headline figures computed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_sales_amount: Amount,
    pub today_revenue: Amount,
    pub total_customers: u64,
}

/// Sales, expenses and their difference for one month.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfitLoss {
    pub sales: Amount,
    pub expenses: Amount,
    pub profit: Amount,
}

impl ProfitLoss {
    pub fn new(sales: Amount, expenses: Amount) -> Self {
        Self {
            sales,
            expenses,
            profit: sales - expenses,
        }
    }
}
