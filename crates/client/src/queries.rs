//! Typed reads through the query cache, and the report views derived from
//! them.

use chrono::FixedOffset;

use tillbook_cache::{QueryCache, QueryKey};
use tillbook_core::{
    Amount, Customer, CustomerId, DashboardStats, Expense, Invoice, InvoiceId, Product, ProductId,
    ProfitLoss, RemoteError, ReportMonth, Sale, Settings, Timestamp, UserProfile,
};
use tillbook_reports::{
    CategoryTotal, DashboardCard, MonthlyExpenses, ProfitLossSummary, WEEK_BUCKETS, WeekBucket,
};
use tillbook_store::EntityStore;

use crate::config::ClientConfig;

type QueryResult<T> = Result<T, RemoteError>;

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub cards: Vec<DashboardCard>,
    /// Filtered from the full product list, not from the ledger's own
    /// low-stock read.
    pub low_stock: Vec<Product>,
    pub customers_with_due: Vec<Customer>,
}

pub struct Queries<S> {
    cache: QueryCache<S>,
    currency: String,
    offset: FixedOffset,
    fallback_settings: Settings,
}

impl<S> Clone for Queries<S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            currency: self.currency.clone(),
            offset: self.offset,
            fallback_settings: self.fallback_settings.clone(),
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

impl<S> Queries<S>
where
    S: EntityStore + 'static,
{
    pub fn new(cache: QueryCache<S>, config: &ClientConfig) -> Self {
        Self {
            cache,
            currency: config.currency.clone(),
            offset: config.utc_offset(),
            fallback_settings: config.fallback_settings.clone(),
        }
    }

    pub fn cache(&self) -> &QueryCache<S> {
        &self.cache
    }

    pub fn format_amount(&self, amount: Amount) -> String {
        tillbook_reports::format_amount(&self.currency, amount)
    }

    /// The month `now` falls in at the configured offset.
    pub fn current_month(&self) -> ReportMonth {
        ReportMonth::containing(Timestamp::now(), self.offset)
    }

    /// Month picker step forward; stops at the current month.
    pub fn next_month(&self, month: ReportMonth) -> ReportMonth {
        month.next_until(self.current_month())
    }

    pub async fn products(&self) -> QueryResult<Vec<Product>> {
        self.cache.fetch_as(&QueryKey::Products).await
    }

    pub async fn product(&self, id: ProductId) -> QueryResult<Product> {
        self.cache.fetch_as(&QueryKey::Product(id)).await
    }

    /// The ledger's own low-stock read.
    pub async fn low_stock_products(&self) -> QueryResult<Vec<Product>> {
        self.cache.fetch_as(&QueryKey::LowStockProducts).await
    }

    pub async fn customers(&self) -> QueryResult<Vec<Customer>> {
        self.cache.fetch_as(&QueryKey::Customers).await
    }

    pub async fn customer(&self, id: CustomerId) -> QueryResult<Customer> {
        self.cache.fetch_as(&QueryKey::Customer(id)).await
    }

    pub async fn invoices(&self) -> QueryResult<Vec<Invoice>> {
        self.cache.fetch_as(&QueryKey::Invoices).await
    }

    pub async fn invoice(&self, id: InvoiceId) -> QueryResult<Invoice> {
        self.cache.fetch_as(&QueryKey::Invoice(id)).await
    }

    pub async fn expenses(&self) -> QueryResult<Vec<Expense>> {
        self.cache.fetch_as(&QueryKey::Expenses).await
    }

    pub async fn expenses_by_category(&self, category: &str) -> QueryResult<Vec<Expense>> {
        self.cache
            .fetch_as(&QueryKey::ExpensesByCategory(category.to_string()))
            .await
    }

    pub async fn expenses_by_month(&self, month: ReportMonth) -> QueryResult<Vec<Expense>> {
        self.cache.fetch_as(&QueryKey::ExpensesByMonth(month)).await
    }

    pub async fn sales(&self) -> QueryResult<Vec<Sale>> {
        self.cache.fetch_as(&QueryKey::Sales).await
    }

    pub async fn dashboard_stats(&self) -> QueryResult<DashboardStats> {
        self.cache.fetch_as(&QueryKey::DashboardStats).await
    }

    pub async fn profit_loss(&self, month: ReportMonth) -> QueryResult<ProfitLoss> {
        self.cache.fetch_as(&QueryKey::ProfitLoss(month)).await
    }

    pub async fn total_sales(&self, start: Timestamp, end: Timestamp) -> QueryResult<Amount> {
        self.cache.fetch_as(&QueryKey::TotalSales { start, end }).await
    }

    pub async fn settings(&self) -> QueryResult<Settings> {
        self.cache.fetch_as(&QueryKey::Settings).await
    }

    pub async fn caller_profile(&self) -> QueryResult<Option<UserProfile>> {
        self.cache.fetch_as(&QueryKey::CurrentUserProfile).await
    }

    pub async fn dashboard(&self) -> QueryResult<DashboardView> {
        let (stats, products, customers) =
            tokio::try_join!(self.dashboard_stats(), self.products(), self.customers())?;
        Ok(DashboardView {
            cards: tillbook_reports::dashboard_cards(&stats, &self.currency),
            low_stock: tillbook_reports::low_stock(&products).into_iter().cloned().collect(),
            customers_with_due: tillbook_reports::customers_with_due(&customers)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    pub async fn profit_loss_summary(&self, month: ReportMonth) -> QueryResult<ProfitLossSummary> {
        let figures = self.profit_loss(month).await?;
        Ok(ProfitLossSummary::new(month, &figures))
    }

    pub async fn category_breakdown(&self) -> QueryResult<Vec<CategoryTotal>> {
        Ok(tillbook_reports::category_breakdown(&self.expenses().await?))
    }

    pub async fn monthly_expenses(&self) -> QueryResult<Vec<MonthlyExpenses>> {
        Ok(tillbook_reports::expenses_by_month(&self.expenses().await?, self.offset))
    }

    pub async fn weekly_sales(&self, month: ReportMonth) -> QueryResult<[WeekBucket; WEEK_BUCKETS]> {
        Ok(tillbook_reports::weekly_sales(&self.sales().await?, month, self.offset))
    }

    /// Product list filtered by name and category, as on the products screen.
    pub async fn search_products(&self, query: &str, category: Option<&str>) -> QueryResult<Vec<Product>> {
        let products = self.products().await?;
        Ok(tillbook_reports::search_products(&products, query, category)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn search_customers(&self, query: &str) -> QueryResult<Vec<Customer>> {
        let customers = self.customers().await?;
        Ok(tillbook_reports::search_customers(&customers, query)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn customer_history(&self, customer_id: CustomerId) -> QueryResult<Vec<Sale>> {
        let sales = self.sales().await?;
        Ok(tillbook_reports::customer_sales(&sales, customer_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Settings as displayed: blank fields fall back to the caller's profile
    /// name and then to the configured defaults. Without a session, or when
    /// the read fails, the configured defaults are shown as-is.
    pub async fn display_settings(&self) -> Settings {
        let fallback = self.fallback_settings.clone();
        if !self.cache.session_active() {
            return fallback;
        }
        let settings = match self.settings().await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(error = %err, "settings unavailable; showing defaults");
                return fallback;
            }
        };
        let profile_name = self
            .caller_profile()
            .await
            .ok()
            .flatten()
            .and_then(|p| non_blank(p.name));

        Settings {
            owner_name: non_blank(settings.owner_name)
                .or(profile_name)
                .unwrap_or(fallback.owner_name),
            business_name: non_blank(settings.business_name).unwrap_or(fallback.business_name),
            logo_url: settings.logo_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use tillbook_core::{CustomerDraft, CustomerUpdate, NewInvoice, NewSale, ProductDraft};
    use tillbook_store::InMemoryLedger;

    fn queries(ledger: &Arc<InMemoryLedger>) -> Queries<InMemoryLedger> {
        Queries::new(QueryCache::new(ledger.clone()), &ClientConfig::default())
    }

    async fn stock(ledger: &InMemoryLedger, name: &str, quantity: u64) {
        ledger
            .create_product(&ProductDraft {
                name: name.to_string(),
                price: Decimal::from(20),
                quantity,
                ..ProductDraft::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dashboard_filters_low_stock_from_the_full_list() {
        let ledger = Arc::new(InMemoryLedger::new());
        stock(&ledger, "Rice", 4).await;
        stock(&ledger, "Sugar", 5).await;
        let customer = ledger
            .create_customer(&CustomerDraft {
                name: "Bilal".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap();
        let mut owing = CustomerUpdate::from_customer(&customer);
        owing.due_amount = Decimal::from(300);
        ledger.update_customer(customer.id, &owing).await.unwrap();

        let view = queries(&ledger).dashboard().await.unwrap();

        assert_eq!(view.low_stock.len(), 1);
        assert_eq!(view.low_stock[0].name, "Rice");
        assert_eq!(view.customers_with_due.len(), 1);
        assert_eq!(view.cards[2].value, "2");
        assert_eq!(ledger.calls(tillbook_core::Operation::LowStockProducts), 0);
    }

    #[tokio::test]
    async fn searches_share_the_cached_lists() {
        let ledger = Arc::new(InMemoryLedger::new());
        stock(&ledger, "Green Tea", 10).await;
        stock(&ledger, "Rice", 10).await;
        ledger
            .create_customer(&CustomerDraft {
                name: "Ayesha".to_string(),
                phone: "0300-1234567".to_string(),
            })
            .await
            .unwrap();
        let queries = queries(&ledger);

        let teas = queries.search_products("TEA", Some(tillbook_reports::ALL_CATEGORIES)).await.unwrap();
        assert_eq!(teas.len(), 1);
        assert!(queries.search_products("rice", Some("Snacks")).await.unwrap().is_empty());
        assert_eq!(queries.search_customers("1234").await.unwrap()[0].name, "Ayesha");

        assert_eq!(ledger.calls(tillbook_core::Operation::ListProducts), 1);
        assert_eq!(ledger.calls(tillbook_core::Operation::ListCustomers), 1);
    }

    #[test]
    fn month_picker_stops_at_the_current_month() {
        let ledger = Arc::new(InMemoryLedger::new());
        let queries = queries(&ledger);
        let current = queries.current_month();

        assert_eq!(queries.next_month(current), current);
        assert_eq!(queries.next_month(current.previous()), current);
        assert_eq!(queries.next_month(current.previous().previous()), current.previous());
    }

    #[tokio::test]
    async fn weekly_sales_fold_month_end_into_week_four() {
        let ledger = Arc::new(InMemoryLedger::new());
        let customer = ledger
            .create_customer(&CustomerDraft {
                name: "Sana".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap();
        let invoice = ledger
            .create_invoice(&NewInvoice::from_items(customer.id, vec![], "").unwrap())
            .await
            .unwrap();
        for day in [29, 30, 31] {
            ledger.set_now(Some(Timestamp::from(
                Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
            )));
            ledger
                .create_sale(&NewSale {
                    customer_id: customer.id,
                    invoice_id: invoice.id,
                    amount: Decimal::from(100),
                })
                .await
                .unwrap();
        }

        let buckets = queries(&ledger)
            .weekly_sales(ReportMonth::new(2025, 3).unwrap())
            .await
            .unwrap();

        assert_eq!(buckets[3].count, 3);
        assert_eq!(buckets[3].total, Decimal::from(300));
    }

    #[tokio::test]
    async fn settings_fall_back_without_session() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.set_session(false);
        let settings = queries(&ledger).display_settings().await;
        assert_eq!(settings, ClientConfig::default().fallback_settings);
        assert_eq!(ledger.total_calls(), 0);
    }

    #[tokio::test]
    async fn blank_owner_name_uses_the_profile() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger
            .save_caller_profile(&UserProfile {
                name: "Sana".to_string(),
            })
            .await
            .unwrap();
        let settings = queries(&ledger).display_settings().await;
        assert_eq!(settings.owner_name, "Sana");
        assert_eq!(settings.business_name, "My Business");
    }
}
