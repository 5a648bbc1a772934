use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::ValidationError;
use crate::id::ProductId;
use crate::money::{Amount, parse_amount, parse_quantity};
use crate::time::Timestamp;

/// Products with fewer units than this are low on stock.
pub const LOW_STOCK_THRESHOLD: u64 = 5;

/// A catalog product as confirmed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Amount,
    pub quantity: u64,
    pub image_url: String,
    pub category: String,
    pub description: String,
    pub unit: String,
    pub barcode: String,
    pub created_at: Timestamp,
}

impl Product {
    /// Derived predicate; never stored.
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }

    /// Unit label, falling back to pieces.
    pub fn unit_label(&self) -> &str {
        if self.unit.trim().is_empty() { "pcs" } else { &self.unit }
    }
}

impl Entity for Product {
    type Id = ProductId;
    const NAME: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Fields submitted on product create/update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub price: Amount,
    pub quantity: u64,
    pub image_url: String,
    pub category: String,
    pub description: String,
    pub unit: String,
    pub barcode: String,
}

impl ProductDraft {
    /// Trim free text and check the required fields.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.barcode = self.barcode.trim().to_string();
        if self.name.is_empty() {
            return Err(ValidationError::required("name"));
        }
        if self.price < Decimal::ZERO {
            return Err(ValidationError::Negative { field: "price" });
        }
        Ok(self)
    }

    // Pre-fill a draft from an existing product (edit flow).
}

/// Raw product form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub quantity: String,
    pub image_url: String,
    pub category: String,
    pub description: String,
    pub unit: String,
    pub barcode: String,
}

impl ProductForm {
    /// Form prefilled for editing `product`. A blank category shows as
    /// `"Other"` and a blank unit as `"pcs"`.
    pub fn from_product(product: &Product) -> Self {
        let category = if product.category.trim().is_empty() {
            "Other".to_string()
        } else {
            product.category.clone()
        };
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
            image_url: product.image_url.clone(),
            category,
            description: product.description.clone(),
            unit: product.unit_label().to_string(),
            barcode: product.barcode.clone(),
        }
    }

    pub fn parse(&self) -> Result<ProductDraft, ValidationError> {
        ProductDraft {
            name: self.name.clone(),
            price: parse_amount("price", &self.price)?,
            quantity: parse_quantity("quantity", &self.quantity)?,
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            unit: self.unit.clone(),
            barcode: self.barcode.clone(),
        }
        .validate()
    }
}
