//! Maps each key to the one ledger read that answers it.

use tillbook_store::{EntityStore, StoreResult};

use crate::data::QueryData;
use crate::key::QueryKey;

pub(crate) async fn fetch<S>(store: &S, key: &QueryKey) -> StoreResult<QueryData>
where
    S: EntityStore + ?Sized,
{
    let data = match key {
        QueryKey::Products => QueryData::Products(store.list_products().await?),
        QueryKey::Product(id) => QueryData::Product(store.get_product(*id).await?),
        QueryKey::LowStockProducts => QueryData::Products(store.low_stock_products().await?),
        QueryKey::Customers => QueryData::Customers(store.list_customers().await?),
        QueryKey::Customer(id) => QueryData::Customer(store.get_customer(*id).await?),
        QueryKey::Invoices => QueryData::Invoices(store.list_invoices().await?),
        QueryKey::Invoice(id) => QueryData::Invoice(store.get_invoice(*id).await?),
        QueryKey::Expenses => QueryData::Expenses(store.list_expenses().await?),
        QueryKey::ExpensesByCategory(category) => {
            QueryData::Expenses(store.expenses_by_category(category).await?)
        }
        QueryKey::ExpensesByMonth(month) => {
            QueryData::Expenses(store.expenses_by_month(*month).await?)
        }
        QueryKey::Sales => QueryData::Sales(store.list_sales().await?),
        QueryKey::DashboardStats => QueryData::DashboardStats(store.dashboard_stats().await?),
        QueryKey::ProfitLoss(month) => QueryData::ProfitLoss(store.profit_loss(*month).await?),
        QueryKey::TotalSales { start, end } => {
            QueryData::Amount(store.total_sales(*start, *end).await?)
        }
        QueryKey::Settings => QueryData::Settings(store.get_settings().await?),
        QueryKey::CurrentUserProfile => QueryData::Profile(store.caller_profile().await?),
    };
    Ok(data)
}
