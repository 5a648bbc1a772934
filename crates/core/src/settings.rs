use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The single business settings record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub owner_name: String,
    pub business_name: String,
    pub logo_url: String,
}

/// Profile of the signed-in proprietor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

impl UserProfile {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::required("name"));
        }
        Ok(Self { name })
    }
}
