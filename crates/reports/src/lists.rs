use tillbook_core::{Amount, Customer, Product, sum_amounts};

/// Category filter value that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// Products below the restock threshold, taken from the full product list.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock()).collect()
}

pub fn customers_with_due(customers: &[Customer]) -> Vec<&Customer> {
    customers.iter().filter(|c| c.has_due()).collect()
}

/// Sum of manually recorded dues.
pub fn total_due(customers: &[Customer]) -> Amount {
    sum_amounts(customers.iter().map(|c| c.due_amount))
}

/// Products whose name contains `query` (case-insensitive) and whose category
/// equals `category` exactly. `None` or [`ALL_CATEGORIES`] matches any category.
pub fn search_products<'a>(products: &'a [Product], query: &str, category: Option<&str>) -> Vec<&'a Product> {
    let needle = query.to_lowercase();
    let category = category.filter(|c| *c != ALL_CATEGORIES);
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .filter(|p| category.is_none_or(|c| p.category == c))
        .collect()
}

/// Customers whose name contains `query` (case-insensitive) or whose phone
/// contains it verbatim.
pub fn search_customers<'a>(customers: &'a [Customer], query: &str) -> Vec<&'a Customer> {
    let needle = query.to_lowercase();
    customers
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone.contains(query))
        .collect()
}
