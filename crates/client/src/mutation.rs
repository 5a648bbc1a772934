//! Remote writes and the cache invalidations they imply.
//!
//! Every write goes through [`MutationCoordinator::execute`]:
//!
//! ```text
//! Mutation + store call
//!   ↓
//! 1. Session check (no session → NoSession, nothing issued)
//!   ↓
//! 2. One remote write
//!   ↓
//! 3. Success → apply the mutation's declared invalidation set
//!    Failure → cache untouched, error returned
//! ```
//!
//! Invalidation sets are declared per [`Mutation`] rather than computed from
//! the payload, so a reader can see at a glance which views a write refreshes.

use std::future::Future;
use std::sync::Arc;

use tillbook_cache::{Collection, Invalidation, QueryCache, QueryKey};
use tillbook_core::{
    Customer, CustomerDraft, CustomerId, CustomerUpdate, Expense, ExpenseDraft, ExpenseId, Invoice,
    NewInvoice, NewSale, Operation, Product, ProductDraft, ProductId, RemoteError, Sale, Settings,
    SyncError, UserProfile,
};
use tillbook_store::{EntityStore, StoreResult};

/// One kind of remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateProduct,
    UpdateProduct(ProductId),
    DeleteProduct(ProductId),
    CreateCustomer,
    UpdateCustomer(CustomerId),
    DeleteCustomer(CustomerId),
    CreateInvoice,
    CreateSale,
    CreateExpense,
    UpdateExpense(ExpenseId),
    DeleteExpense(ExpenseId),
    UpdateSettings,
    SaveProfile,
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::CreateProduct => Operation::CreateProduct,
            Mutation::UpdateProduct(_) => Operation::UpdateProduct,
            Mutation::DeleteProduct(_) => Operation::DeleteProduct,
            Mutation::CreateCustomer => Operation::CreateCustomer,
            Mutation::UpdateCustomer(_) => Operation::UpdateCustomer,
            Mutation::DeleteCustomer(_) => Operation::DeleteCustomer,
            Mutation::CreateInvoice => Operation::CreateInvoice,
            Mutation::CreateSale => Operation::CreateSale,
            Mutation::CreateExpense => Operation::CreateExpense,
            Mutation::UpdateExpense(_) => Operation::UpdateExpense,
            Mutation::DeleteExpense(_) => Operation::DeleteExpense,
            Mutation::UpdateSettings => Operation::UpdateSettings,
            Mutation::SaveProfile => Operation::SaveCallerProfile,
        }
    }

    /// Cache entries made out of date by a successful write.
    pub fn invalidations(&self) -> Vec<Invalidation> {
        use Invalidation::{Collection as All, Key};

        let product_lists = [
            Key(QueryKey::Products),
            Key(QueryKey::LowStockProducts),
            Key(QueryKey::DashboardStats),
        ];
        let expense_views = [
            Key(QueryKey::Expenses),
            All(Collection::ExpensesByCategory),
            All(Collection::ExpensesByMonth),
            All(Collection::ProfitLoss),
        ];

        match *self {
            Mutation::CreateProduct => product_lists.to_vec(),
            Mutation::UpdateProduct(id) | Mutation::DeleteProduct(id) => {
                let mut set = product_lists.to_vec();
                set.push(Key(QueryKey::Product(id)));
                set
            }
            Mutation::CreateCustomer => {
                vec![Key(QueryKey::Customers), Key(QueryKey::DashboardStats)]
            }
            Mutation::UpdateCustomer(id) => {
                vec![Key(QueryKey::Customers), Key(QueryKey::Customer(id))]
            }
            Mutation::DeleteCustomer(id) => vec![
                Key(QueryKey::Customers),
                Key(QueryKey::Customer(id)),
                Key(QueryKey::DashboardStats),
            ],
            Mutation::CreateInvoice => vec![
                Key(QueryKey::Invoices),
                Key(QueryKey::Sales),
                Key(QueryKey::DashboardStats),
            ],
            Mutation::CreateSale => vec![
                Key(QueryKey::Sales),
                Key(QueryKey::DashboardStats),
                All(Collection::ProfitLoss),
                All(Collection::TotalSales),
            ],
            Mutation::CreateExpense | Mutation::UpdateExpense(_) | Mutation::DeleteExpense(_) => {
                expense_views.to_vec()
            }
            Mutation::UpdateSettings => vec![Key(QueryKey::Settings)],
            Mutation::SaveProfile => vec![Key(QueryKey::CurrentUserProfile)],
        }
    }
}

/// Issues writes and keeps the query cache consistent with them.
pub struct MutationCoordinator<S> {
    cache: QueryCache<S>,
}

impl<S> Clone for MutationCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<S> MutationCoordinator<S>
where
    S: EntityStore + 'static,
{
    pub fn new(cache: QueryCache<S>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &QueryCache<S> {
        &self.cache
    }

    /// Run one remote write. Invalidations are applied only after it
    /// succeeds; a failure leaves every cached value as it was.
    ///
    /// The write and its invalidations run on their own task, so dropping
    /// the returned future (a screen closed mid-write) does not stop either.
    pub async fn execute<T, F, Fut>(&self, mutation: Mutation, call: F) -> Result<T, RemoteError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<S>) -> Fut,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let operation = mutation.operation();
        if !self.cache.session_active() {
            tracing::debug!(operation = %operation, "no session; write not issued");
            return Err(RemoteError::NoSession);
        }

        let cache = self.cache.clone();
        let write = call(Arc::clone(self.cache.store()));
        let task = tokio::spawn(async move {
            let outcome = write.await;
            match &outcome {
                Ok(_) => {
                    let invalidations = mutation.invalidations();
                    for invalidation in &invalidations {
                        cache.apply(invalidation);
                    }
                    tracing::info!(
                        operation = %operation,
                        invalidated = invalidations.len(),
                        "remote write succeeded"
                    );
                }
                Err(err) => {
                    tracing::warn!(operation = %operation, error = %err, "remote write failed");
                }
            }
            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(operation = %operation, error = %err, "write task did not finish");
                Err(RemoteError::Transport(format!("{operation} did not finish: {err}")))
            }
        }
    }

    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, SyncError> {
        let draft = draft.validate()?;
        let product = self
            .execute(Mutation::CreateProduct, move |s| async move {
                s.create_product(&draft).await
            })
            .await?;
        Ok(product)
    }

    pub async fn update_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product, SyncError> {
        let draft = draft.validate()?;
        let product = self
            .execute(Mutation::UpdateProduct(id), move |s| async move {
                s.update_product(id, &draft).await
            })
            .await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), SyncError> {
        self.execute(Mutation::DeleteProduct(id), move |s| async move {
            s.delete_product(id).await
        })
        .await?;
        Ok(())
    }

    pub async fn create_customer(&self, draft: CustomerDraft) -> Result<Customer, SyncError> {
        let draft = draft.validate()?;
        let customer = self
            .execute(Mutation::CreateCustomer, move |s| async move {
                s.create_customer(&draft).await
            })
            .await?;
        Ok(customer)
    }

    pub async fn update_customer(&self, id: CustomerId, update: CustomerUpdate) -> Result<Customer, SyncError> {
        let update = update.validate()?;
        let customer = self
            .execute(Mutation::UpdateCustomer(id), move |s| async move {
                s.update_customer(id, &update).await
            })
            .await?;
        Ok(customer)
    }

    /// Settle a customer's due amount. This is the only way dues go down;
    /// invoices and sales never touch them.
    pub async fn mark_customer_paid(&self, customer: &Customer) -> Result<Customer, SyncError> {
        self.update_customer(customer.id, CustomerUpdate::mark_paid(customer))
            .await
    }

    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), SyncError> {
        self.execute(Mutation::DeleteCustomer(id), move |s| async move {
            s.delete_customer(id).await
        })
        .await?;
        Ok(())
    }

    pub async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, RemoteError> {
        self.execute(Mutation::CreateInvoice, move |s| async move {
            s.create_invoice(&invoice).await
        })
        .await
    }

    pub async fn create_sale(&self, sale: NewSale) -> Result<Sale, RemoteError> {
        self.execute(Mutation::CreateSale, move |s| async move {
            s.create_sale(&sale).await
        })
        .await
    }

    pub async fn create_expense(&self, draft: ExpenseDraft) -> Result<Expense, SyncError> {
        let draft = draft.validate()?;
        let expense = self
            .execute(Mutation::CreateExpense, move |s| async move {
                s.create_expense(&draft).await
            })
            .await?;
        Ok(expense)
    }

    pub async fn update_expense(&self, id: ExpenseId, draft: ExpenseDraft) -> Result<Expense, SyncError> {
        let draft = draft.validate()?;
        let expense = self
            .execute(Mutation::UpdateExpense(id), move |s| async move {
                s.update_expense(id, &draft).await
            })
            .await?;
        Ok(expense)
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> Result<(), SyncError> {
        self.execute(Mutation::DeleteExpense(id), move |s| async move {
            s.delete_expense(id).await
        })
        .await?;
        Ok(())
    }

    pub async fn update_settings(&self, settings: Settings) -> Result<(), SyncError> {
        self.execute(Mutation::UpdateSettings, move |s| async move {
            s.update_settings(&settings).await
        })
        .await?;
        Ok(())
    }

    pub async fn save_profile(&self, profile: UserProfile) -> Result<(), SyncError> {
        let profile = profile.validate()?;
        self.execute(Mutation::SaveProfile, move |s| async move {
            s.save_caller_profile(&profile).await
        })
        .await?;
        Ok(())
    }
}
