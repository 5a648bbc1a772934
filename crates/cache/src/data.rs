//! Values held by the cache.

use serde::Serialize;

use tillbook_core::{
    Amount, Customer, DashboardStats, Expense, Invoice, Product, ProfitLoss, Sale, Settings,
    UserProfile,
};

/// A fetched result set, as returned by the ledger for one [`QueryKey`](crate::QueryKey).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum QueryData {
    Products(Vec<Product>),
    Product(Product),
    Customers(Vec<Customer>),
    Customer(Customer),
    Invoices(Vec<Invoice>),
    Invoice(Invoice),
    Expenses(Vec<Expense>),
    Sales(Vec<Sale>),
    DashboardStats(DashboardStats),
    ProfitLoss(ProfitLoss),
    Amount(Amount),
    Settings(Settings),
    Profile(Option<UserProfile>),
}

impl QueryData {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryData::Products(_) => "products",
            QueryData::Product(_) => "product",
            QueryData::Customers(_) => "customers",
            QueryData::Customer(_) => "customer",
            QueryData::Invoices(_) => "invoices",
            QueryData::Invoice(_) => "invoice",
            QueryData::Expenses(_) => "expenses",
            QueryData::Sales(_) => "sales",
            QueryData::DashboardStats(_) => "dashboardStats",
            QueryData::ProfitLoss(_) => "profitLoss",
            QueryData::Amount(_) => "amount",
            QueryData::Settings(_) => "settings",
            QueryData::Profile(_) => "profile",
        }
    }

    pub fn as_products(&self) -> Option<&[Product]> {
        match self {
            QueryData::Products(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_customers(&self) -> Option<&[Customer]> {
        match self {
            QueryData::Customers(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_invoices(&self) -> Option<&[Invoice]> {
        match self {
            QueryData::Invoices(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_expenses(&self) -> Option<&[Expense]> {
        match self {
            QueryData::Expenses(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sales(&self) -> Option<&[Sale]> {
        match self {
            QueryData::Sales(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dashboard_stats(&self) -> Option<&DashboardStats> {
        match self {
            QueryData::DashboardStats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_profit_loss(&self) -> Option<&ProfitLoss> {
        match self {
            QueryData::ProfitLoss(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<Amount> {
        match self {
            QueryData::Amount(v) => Some(*v),
            _ => None,
        }
    }
}

/// Typed extraction of a cached value.
pub trait FromQueryData: Sized {
    fn from_query_data(data: &QueryData) -> Option<Self>;
}

macro_rules! impl_from_query_data {
    ($ty:ty, $variant:ident) => {
        impl FromQueryData for $ty {
            fn from_query_data(data: &QueryData) -> Option<Self> {
                match data {
                    QueryData::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_from_query_data!(Vec<Product>, Products);
impl_from_query_data!(Product, Product);
impl_from_query_data!(Vec<Customer>, Customers);
impl_from_query_data!(Customer, Customer);
impl_from_query_data!(Vec<Invoice>, Invoices);
impl_from_query_data!(Invoice, Invoice);
impl_from_query_data!(Vec<Expense>, Expenses);
impl_from_query_data!(Vec<Sale>, Sales);
impl_from_query_data!(DashboardStats, DashboardStats);
impl_from_query_data!(ProfitLoss, ProfitLoss);
impl_from_query_data!(Amount, Amount);
impl_from_query_data!(Settings, Settings);
impl_from_query_data!(Option<UserProfile>, Profile);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn serialised_tag_matches_kind() {
        let data = QueryData::ProfitLoss(ProfitLoss::new(Decimal::from(900), Decimal::from(400)));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["kind"], data.kind());
        assert!(json["value"].get("profit").is_some());
    }

    #[test]
    fn typed_extraction_checks_the_variant() {
        let data = QueryData::Amount(Decimal::from(5));
        assert_eq!(Amount::from_query_data(&data), Some(Decimal::from(5)));
        assert_eq!(<Vec<Sale>>::from_query_data(&data), None);
    }
}
