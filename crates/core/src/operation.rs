//! Names of the remote ledger operations.

use serde::{Deserialize, Serialize};

/// One remote call exposed by the ledger.
///
/// Used to label errors and log lines, and by the in-memory ledger to count
/// calls and inject failures per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    CreateProduct,
    GetProduct,
    ListProducts,
    UpdateProduct,
    DeleteProduct,
    CreateCustomer,
    GetCustomer,
    ListCustomers,
    UpdateCustomer,
    DeleteCustomer,
    CreateInvoice,
    GetInvoice,
    ListInvoices,
    CreateExpense,
    ListExpenses,
    UpdateExpense,
    DeleteExpense,
    CreateSale,
    ListSales,
    DashboardStats,
    ProfitLoss,
    LowStockProducts,
    ExpensesByCategory,
    ExpensesByMonth,
    TotalSales,
    GetSettings,
    UpdateSettings,
    GetCallerProfile,
    SaveCallerProfile,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateProduct => "createProduct",
            Operation::GetProduct => "getProduct",
            Operation::ListProducts => "getAllProducts",
            Operation::UpdateProduct => "updateProduct",
            Operation::DeleteProduct => "deleteProduct",
            Operation::CreateCustomer => "createCustomer",
            Operation::GetCustomer => "getCustomer",
            Operation::ListCustomers => "getAllCustomers",
            Operation::UpdateCustomer => "updateCustomer",
            Operation::DeleteCustomer => "deleteCustomer",
            Operation::CreateInvoice => "createInvoice",
            Operation::GetInvoice => "getInvoice",
            Operation::ListInvoices => "getAllInvoices",
            Operation::CreateExpense => "createExpense",
            Operation::ListExpenses => "getAllExpenses",
            Operation::UpdateExpense => "updateExpense",
            Operation::DeleteExpense => "deleteExpense",
            Operation::CreateSale => "createSale",
            Operation::ListSales => "getAllSales",
            Operation::DashboardStats => "getDashboardStats",
            Operation::ProfitLoss => "getProfitLoss",
            Operation::LowStockProducts => "getLowStockProducts",
            Operation::ExpensesByCategory => "getExpensesByCategory",
            Operation::ExpensesByMonth => "getExpensesByMonth",
            Operation::TotalSales => "getTotalSales",
            Operation::GetSettings => "getSettings",
            Operation::UpdateSettings => "updateSettings",
            Operation::GetCallerProfile => "getCallerUserProfile",
            Operation::SaveCallerProfile => "saveCallerUserProfile",
        }
    }

    /// Whether the operation changes ledger state.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Operation::CreateProduct
                | Operation::UpdateProduct
                | Operation::DeleteProduct
                | Operation::CreateCustomer
                | Operation::UpdateCustomer
                | Operation::DeleteCustomer
                | Operation::CreateInvoice
                | Operation::CreateExpense
                | Operation::UpdateExpense
                | Operation::DeleteExpense
                | Operation::CreateSale
                | Operation::UpdateSettings
                | Operation::SaveCallerProfile
        )
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
