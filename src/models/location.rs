use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::present;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: u32,
    pub place: String,
    pub country: String,
    pub city: String,
    pub distance: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocationPatch {
    #[serde(default, deserialize_with = "present")]
    pub place: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub distance: Option<u32>,
}
