//! The city entity and its create/update payload.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A persisted city row. `id` is assigned by the store on insert and never
/// reused across deletes. Coordinates are kept as the formatted strings of
/// the source data (e.g. `"+40.922326"`), not numerics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: i64,
    pub name: String,
    pub county: String,
    pub state_code: String,
    pub postal_code: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Create/update payload: a city without its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDraft {
    pub name: String,
    pub county: String,
    pub state_code: String,
    pub postal_code: String,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

impl CityDraft {
    /// Every persisted city has non-empty name, county, stateCode, postalCode.
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("name", &self.name),
            ("county", &self.county),
            ("stateCode", &self.state_code),
            ("postalCode", &self.postal_code),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "field '{}' must be non-empty",
                    field
                )));
            }
        }
        Ok(())
    }
}
