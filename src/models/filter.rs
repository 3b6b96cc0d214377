use serde::Deserialize;

use super::Gender;

/// Query string of `GET /users/{id}/visits`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitFilter {
    pub from_date: Option<i32>,
    pub to_date: Option<i32>,
    pub country: Option<String>,
    pub distance: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKey {
    FromDate,
    ToDate,
    Country,
    Distance,
}

/// Query string of `GET /locations/{id}/avg`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageFilter {
    pub from_date: Option<i32>,
    pub to_date: Option<i32>,
    pub from_age: Option<i32>,
    pub to_age: Option<i32>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageKey {
    FromDate,
    ToDate,
    FromAge,
    ToAge,
    Gender,
}
