use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::ValidationError;
use crate::id::CustomerId;
use crate::money::{Amount, parse_amount};
use crate::time::Timestamp;

/// A customer record.
///
/// `due_amount` is a manual ledger: it is whatever the proprietor last set.
/// It is never derived from, or reconciled against, unpaid invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub due_amount: Amount,
    pub created_at: Timestamp,
}

impl Customer {
    pub fn has_due(&self) -> bool {
        self.due_amount > Decimal::ZERO
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    const NAME: &'static str = "customer";

    fn id(&self) -> CustomerId {
        self.id
    }
}

/// Fields submitted when creating a customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub name: String,
    pub phone: String,
}

impl CustomerDraft {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::required("name"));
        }
        Ok(Self {
            name,
            phone: self.phone.trim().to_string(),
        })
    }
}

/// Fields submitted when updating a customer, including the manual due amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub name: String,
    pub phone: String,
    pub due_amount: Amount,
}

impl CustomerUpdate {
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            due_amount: customer.due_amount,
        }
    }

    /// Settle the customer's dues: same record, due amount zeroed.
    pub fn mark_paid(customer: &Customer) -> Self {
        Self {
            due_amount: Decimal::ZERO,
            ..Self::from_customer(customer)
        }
    }

    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::required("name"));
        }
        if self.due_amount < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: "due amount",
            });
        }
        Ok(Self {
            name,
            phone: self.phone.trim().to_string(),
            due_amount: self.due_amount,
        })
    }
}

/// Raw customer form input. A blank due amount means nothing is owed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub name: String,
    pub phone: String,
    pub due_amount: String,
}

impl CustomerForm {
    pub fn to_draft(&self) -> Result<CustomerDraft, ValidationError> {
        CustomerDraft {
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
        .validate()
    }

    pub fn to_update(&self) -> Result<CustomerUpdate, ValidationError> {
        let due_amount = if self.due_amount.trim().is_empty() {
            Decimal::ZERO
        } else {
            parse_amount("due amount", &self.due_amount)?
        };
        CustomerUpdate {
            name: self.name.clone(),
            phone: self.phone.clone(),
            due_amount,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(due: i64) -> Customer {
        Customer {
            id: CustomerId::new(9),
            name: "Ayesha".to_string(),
            phone: "0300".to_string(),
            due_amount: Decimal::from(due),
            created_at: Timestamp::from_nanos(0),
        }
    }

    #[test]
    fn mark_paid_only_zeroes_the_due_amount() {
        let update = CustomerUpdate::mark_paid(&customer(1500));
        assert_eq!(update.name, "Ayesha");
        assert_eq!(update.phone, "0300");
        assert_eq!(update.due_amount, Decimal::ZERO);
    }

    #[test]
    fn customer_name_is_required() {
        let form = CustomerForm {
            name: " ".to_string(),
            ..CustomerForm::default()
        };
        assert_eq!(form.to_draft(), Err(ValidationError::required("name")));
    }

    #[test]
    fn blank_due_amount_means_nothing_owed() {
        let form = CustomerForm {
            name: "Bilal".to_string(),
            phone: String::new(),
            due_amount: String::new(),
        };
        assert_eq!(form.to_update().unwrap().due_amount, Decimal::ZERO);
    }

    #[test]
    fn has_due_is_strictly_positive() {
        assert!(customer(1).has_due());
        assert!(!customer(0).has_due());
    }
}
