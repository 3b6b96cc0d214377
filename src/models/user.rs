use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::present;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Gender {
    #[serde(rename = "m")]
    #[sqlx(rename = "m")]
    Male,
    #[serde(rename = "f")]
    #[sqlx(rename = "f")]
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: i32,
}

/// Body of `POST /users/{id}`. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "present")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "present")]
    pub birth_date: Option<i32>,
}
