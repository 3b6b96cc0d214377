use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::present;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: u32,
    pub location: u32,
    pub user: u32,
    pub visited_at: i32,
    pub mark: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VisitPatch {
    #[serde(default, deserialize_with = "present")]
    pub location: Option<u32>,
    #[serde(default, deserialize_with = "present")]
    pub user: Option<u32>,
    #[serde(default, deserialize_with = "present")]
    pub visited_at: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub mark: Option<u8>,
}
