//! Cache keys and invalidation targets.

use serde::Serialize;

use tillbook_core::{CustomerId, InvoiceId, ProductId, ReportMonth, Timestamp};

/// Named result set. Every [`QueryKey`] belongs to exactly one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Products,
    Product,
    LowStockProducts,
    Customers,
    Customer,
    Invoices,
    Invoice,
    Expenses,
    ExpensesByCategory,
    ExpensesByMonth,
    Sales,
    DashboardStats,
    ProfitLoss,
    TotalSales,
    Settings,
    CurrentUserProfile,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Product => "product",
            Collection::LowStockProducts => "lowStockProducts",
            Collection::Customers => "customers",
            Collection::Customer => "customer",
            Collection::Invoices => "invoices",
            Collection::Invoice => "invoice",
            Collection::Expenses => "expenses",
            Collection::ExpensesByCategory => "expensesByCategory",
            Collection::ExpensesByMonth => "expensesByMonth",
            Collection::Sales => "sales",
            Collection::DashboardStats => "dashboardStats",
            Collection::ProfitLoss => "profitLoss",
            Collection::TotalSales => "totalSales",
            Collection::Settings => "settings",
            Collection::CurrentUserProfile => "currentUserProfile",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one cached result set: a collection plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "collection", content = "params", rename_all = "camelCase")]
pub enum QueryKey {
    Products,
    Product(ProductId),
    LowStockProducts,
    Customers,
    Customer(CustomerId),
    Invoices,
    Invoice(InvoiceId),
    Expenses,
    ExpensesByCategory(String),
    ExpensesByMonth(ReportMonth),
    Sales,
    DashboardStats,
    ProfitLoss(ReportMonth),
    TotalSales { start: Timestamp, end: Timestamp },
    Settings,
    CurrentUserProfile,
}

impl QueryKey {
    pub fn collection(&self) -> Collection {
        match self {
            QueryKey::Products => Collection::Products,
            QueryKey::Product(_) => Collection::Product,
            QueryKey::LowStockProducts => Collection::LowStockProducts,
            QueryKey::Customers => Collection::Customers,
            QueryKey::Customer(_) => Collection::Customer,
            QueryKey::Invoices => Collection::Invoices,
            QueryKey::Invoice(_) => Collection::Invoice,
            QueryKey::Expenses => Collection::Expenses,
            QueryKey::ExpensesByCategory(_) => Collection::ExpensesByCategory,
            QueryKey::ExpensesByMonth(_) => Collection::ExpensesByMonth,
            QueryKey::Sales => Collection::Sales,
            QueryKey::DashboardStats => Collection::DashboardStats,
            QueryKey::ProfitLoss(_) => Collection::ProfitLoss,
            QueryKey::TotalSales { .. } => Collection::TotalSales,
            QueryKey::Settings => Collection::Settings,
            QueryKey::CurrentUserProfile => Collection::CurrentUserProfile,
        }
    }

    /// Parameters rendered for logs; empty for unparameterised keys.
    pub fn params(&self) -> String {
        match self {
            QueryKey::Product(id) => id.to_string(),
            QueryKey::Customer(id) => id.to_string(),
            QueryKey::Invoice(id) => id.to_string(),
            QueryKey::ExpensesByCategory(category) => category.clone(),
            QueryKey::ExpensesByMonth(month) | QueryKey::ProfitLoss(month) => month.to_string(),
            QueryKey::TotalSales { start, end } => {
                format!("{}..{}", start.as_nanos(), end.as_nanos())
            }
            _ => String::new(),
        }
    }
}

impl core::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let params = self.params();
        if params.is_empty() {
            f.write_str(self.collection().as_str())
        } else {
            write!(f, "{}/{}", self.collection(), params)
        }
    }
}

/// What a write makes out of date: one key, or every key of a collection
/// whatever its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    Key(QueryKey),
    Collection(Collection),
}

impl Invalidation {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Invalidation::Key(k) => k == key,
            Invalidation::Collection(c) => key.collection() == *c,
        }
    }
}

impl From<QueryKey> for Invalidation {
    fn from(key: QueryKey) -> Self {
        Invalidation::Key(key)
    }
}

impl From<Collection> for Invalidation {
    fn from(collection: Collection) -> Self {
        Invalidation::Collection(collection)
    }
}
