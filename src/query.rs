//! Parameterized SQL construction.
//!
//! Every statement is built from compiled-in table and column names; request
//! values only ever travel as bound arguments, in the same order as their `?`
//! placeholders appear in the SQL text.

use std::fmt;

use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::FromRow;

use crate::models::{
    AverageFilter, AverageKey, Gender, Location, LocationPatch, User, UserPatch, Visit,
    VisitFilter, VisitKey, VisitPatch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Locations,
    Visits,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Locations => "locations",
            Table::Visits => "visits",
        }
    }

    /// Insert order of the table's columns. `user` is quoted because it is a
    /// keyword in most SQL dialects.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Users => &["id", "email", "first_name", "last_name", "gender", "birth_date"],
            Table::Locations => &["id", "place", "country", "city", "distance"],
            Table::Visits => &["id", "location", "\"user\"", "visited_at", "mark"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Int(i64),
    Text(String),
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<u8> for Arg {
    fn from(value: u8) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Text(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Text(value.to_string())
    }
}

impl From<Gender> for Arg {
    fn from(value: Gender) -> Self {
        Arg::Text(value.as_str().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Arg>,
}

impl Statement {
    pub fn query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        self.args
            .iter()
            .fold(sqlx::query(&self.sql), |query, arg| match arg {
                Arg::Int(value) => query.bind(*value),
                Arg::Text(value) => query.bind(value.as_str()),
            })
    }

    pub fn query_as<T>(&self) -> QueryAs<'_, Sqlite, T, SqliteArguments<'_>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        self.args
            .iter()
            .fold(sqlx::query_as(&self.sql), |query, arg| match arg {
                Arg::Int(value) => query.bind(*value),
                Arg::Text(value) => query.bind(value.as_str()),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Lt,
    Gt,
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cmp::Eq => "=",
            Cmp::Lt => "<",
            Cmp::Gt => ">",
        })
    }
}

/// One optional `AND <expr> <cmp> ?` term of a filtered query.
#[derive(Debug, Clone, Copy)]
pub struct Predicate<K> {
    pub key: K,
    pub expr: &'static str,
    pub cmp: Cmp,
}

pub trait Filter {
    type Key: Copy + 'static;

    /// Fixed evaluation order of the filter's predicates.
    fn predicates() -> &'static [Predicate<Self::Key>];

    /// Bound value for `key`, or `None` when the request omitted it.
    fn value(&self, key: Self::Key) -> Option<Arg>;
}

/// Whole years between `users.birth_date` and now.
const AGE: &str = "(CAST(strftime('%Y', 'now') AS INTEGER) \
    - CAST(strftime('%Y', users.birth_date, 'unixepoch') AS INTEGER) \
    - (strftime('%m-%d', 'now') < strftime('%m-%d', users.birth_date, 'unixepoch')))";

const VISIT_PREDICATES: &[Predicate<VisitKey>] = &[
    Predicate { key: VisitKey::FromDate, expr: "visits.visited_at", cmp: Cmp::Gt },
    Predicate { key: VisitKey::ToDate, expr: "visits.visited_at", cmp: Cmp::Lt },
    Predicate { key: VisitKey::Country, expr: "locations.country", cmp: Cmp::Eq },
    Predicate { key: VisitKey::Distance, expr: "locations.distance", cmp: Cmp::Lt },
];

const AVERAGE_PREDICATES: &[Predicate<AverageKey>] = &[
    Predicate { key: AverageKey::FromDate, expr: "visits.visited_at", cmp: Cmp::Gt },
    Predicate { key: AverageKey::ToDate, expr: "visits.visited_at", cmp: Cmp::Lt },
    Predicate { key: AverageKey::FromAge, expr: AGE, cmp: Cmp::Gt },
    Predicate { key: AverageKey::ToAge, expr: AGE, cmp: Cmp::Lt },
    Predicate { key: AverageKey::Gender, expr: "users.gender", cmp: Cmp::Eq },
];

impl Filter for VisitFilter {
    type Key = VisitKey;

    fn predicates() -> &'static [Predicate<VisitKey>] {
        VISIT_PREDICATES
    }

    fn value(&self, key: VisitKey) -> Option<Arg> {
        match key {
            VisitKey::FromDate => self.from_date.map(Arg::from),
            VisitKey::ToDate => self.to_date.map(Arg::from),
            VisitKey::Country => self.country.as_deref().map(Arg::from),
            VisitKey::Distance => self.distance.map(Arg::from),
        }
    }
}

impl Filter for AverageFilter {
    type Key = AverageKey;

    fn predicates() -> &'static [Predicate<AverageKey>] {
        AVERAGE_PREDICATES
    }

    fn value(&self, key: AverageKey) -> Option<Arg> {
        match key {
            AverageKey::FromDate => self.from_date.map(Arg::from),
            AverageKey::ToDate => self.to_date.map(Arg::from),
            AverageKey::FromAge => self.from_age.map(Arg::from),
            AverageKey::ToAge => self.to_age.map(Arg::from),
            AverageKey::Gender => self.gender.map(Arg::from),
        }
    }
}

/// A full row of one table, in `Table::columns` order.
pub trait Record {
    const TABLE: Table;

    fn values(&self) -> Vec<Arg>;
}

impl Record for User {
    const TABLE: Table = Table::Users;

    fn values(&self) -> Vec<Arg> {
        vec![
            self.id.into(),
            self.email.as_str().into(),
            self.first_name.as_str().into(),
            self.last_name.as_str().into(),
            self.gender.into(),
            self.birth_date.into(),
        ]
    }
}

impl Record for Location {
    const TABLE: Table = Table::Locations;

    fn values(&self) -> Vec<Arg> {
        vec![
            self.id.into(),
            self.place.as_str().into(),
            self.country.as_str().into(),
            self.city.as_str().into(),
            self.distance.into(),
        ]
    }
}

impl Record for Visit {
    const TABLE: Table = Table::Visits;

    fn values(&self) -> Vec<Arg> {
        vec![
            self.id.into(),
            self.location.into(),
            self.user.into(),
            self.visited_at.into(),
            self.mark.into(),
        ]
    }
}

/// The subset of a table's columns a partial update touches.
pub trait Patch {
    const TABLE: Table;

    /// `(column, value)` for every present field, in column order.
    fn assignments(&self) -> Vec<(&'static str, Arg)>;
}

fn present_only(fields: Vec<(&'static str, Option<Arg>)>) -> Vec<(&'static str, Arg)> {
    fields
        .into_iter()
        .filter_map(|(column, value)| value.map(|value| (column, value)))
        .collect()
}

impl Patch for UserPatch {
    const TABLE: Table = Table::Users;

    fn assignments(&self) -> Vec<(&'static str, Arg)> {
        present_only(vec![
            ("email", self.email.as_deref().map(Arg::from)),
            ("first_name", self.first_name.as_deref().map(Arg::from)),
            ("last_name", self.last_name.as_deref().map(Arg::from)),
            ("gender", self.gender.map(Arg::from)),
            ("birth_date", self.birth_date.map(Arg::from)),
        ])
    }
}

impl Patch for LocationPatch {
    const TABLE: Table = Table::Locations;

    fn assignments(&self) -> Vec<(&'static str, Arg)> {
        present_only(vec![
            ("place", self.place.as_deref().map(Arg::from)),
            ("country", self.country.as_deref().map(Arg::from)),
            ("city", self.city.as_deref().map(Arg::from)),
            ("distance", self.distance.map(Arg::from)),
        ])
    }
}

impl Patch for VisitPatch {
    const TABLE: Table = Table::Visits;

    fn assignments(&self) -> Vec<(&'static str, Arg)> {
        present_only(vec![
            ("location", self.location.map(Arg::from)),
            ("\"user\"", self.user.map(Arg::from)),
            ("visited_at", self.visited_at.map(Arg::from)),
            ("mark", self.mark.map(Arg::from)),
        ])
    }
}

pub fn select_by_id(table: Table, id: u32) -> Statement {
    Statement {
        sql: format!("SELECT * FROM {} WHERE id = ?", table.name()),
        args: vec![id.into()],
    }
}

pub fn insert<R: Record>(record: &R) -> Statement {
    let columns = R::TABLE.columns();
    let args = record.values();
    debug_assert_eq!(columns.len(), args.len());

    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            R::TABLE.name(),
            columns.join(", ")
        ),
        args,
    }
}

/// `UPDATE` touching only the patch's present fields. An empty patch still
/// yields valid SQL that matches the row by id and changes nothing.
pub fn partial_update<P: Patch>(id: u32, patch: &P) -> Statement {
    let assignments = patch.assignments();
    let mut args = Vec::with_capacity(assignments.len() + 1);

    let set = if assignments.is_empty() {
        "id = id".to_string()
    } else {
        assignments
            .into_iter()
            .map(|(column, value)| {
                args.push(value);
                format!("{column} = ?")
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    args.push(id.into());

    Statement {
        sql: format!("UPDATE {} SET {set} WHERE id = ?", P::TABLE.name()),
        args,
    }
}

fn filtered<F: Filter>(head: &str, base: &str, id: u32, filter: &F) -> Statement {
    let mut statement = Statement {
        sql: format!("{head} WHERE {base} = ?"),
        args: vec![id.into()],
    };

    for predicate in F::predicates() {
        if let Some(value) = filter.value(predicate.key) {
            statement
                .sql
                .push_str(&format!(" AND {} {} ?", predicate.expr, predicate.cmp));
            statement.args.push(value);
        }
    }

    statement
}

pub fn user_visits(user_id: u32, filter: &VisitFilter) -> Statement {
    filtered(
        "SELECT visits.mark, visits.visited_at, locations.place \
         FROM visits \
         JOIN locations ON visits.location = locations.id",
        "visits.\"user\"",
        user_id,
        filter,
    )
}

pub fn location_average(location_id: u32, filter: &AverageFilter) -> Statement {
    filtered(
        "SELECT COALESCE(ROUND(AVG(visits.mark), 2), 0.0) AS avg \
         FROM locations \
         JOIN visits ON locations.id = visits.location \
         JOIN users ON visits.\"user\" = users.id",
        "locations.id",
        location_id,
        filter,
    )
}
