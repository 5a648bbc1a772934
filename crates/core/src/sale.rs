use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{CustomerId, InvoiceId, SaleId};
use crate::money::Amount;
use crate::time::Timestamp;

/// A sale ledger entry derived from an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub invoice_id: InvoiceId,
    pub customer_id: CustomerId,
    pub amount: Amount,
    pub date: Timestamp,
}

impl Entity for Sale {
    type Id = SaleId;
    const NAME: &'static str = "sale";

    fn id(&self) -> SaleId {
        self.id
    }
}

/// Payload of the create-sale call. Both references must exist in the ledger
/// when the sale is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub customer_id: CustomerId,
    pub invoice_id: InvoiceId,
    pub amount: Amount,
}
