use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::ValidationError;
use crate::id::ExpenseId;
use crate::money::{Amount, parse_amount};
use crate::time::Timestamp;

/// Category used when none is picked.
pub const DEFAULT_EXPENSE_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Amount,
    pub category: String,
    pub description: String,
    pub date: Timestamp,
}

impl Entity for Expense {
    type Id = ExpenseId;
    const NAME: &'static str = "expense";

    fn id(&self) -> ExpenseId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount: Amount,
    pub category: String,
    pub description: String,
}

impl ExpenseDraft {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive { field: "amount" });
        }
        let category = match self.category.trim() {
            "" => DEFAULT_EXPENSE_CATEGORY.to_string(),
            other => other.to_string(),
        };
        Ok(Self {
            amount: self.amount,
            category,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: String,
    pub description: String,
}

impl ExpenseForm {
    pub fn parse(&self) -> Result<ExpenseDraft, ValidationError> {
        ExpenseDraft {
            amount: parse_amount("amount", &self.amount)?,
            category: self.category.clone(),
            description: self.description.clone(),
        }
        .validate()
    }
}
