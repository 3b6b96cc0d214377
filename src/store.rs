use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Executor, FromRow};

use crate::models::{AverageFilter, AverageMark, Place, VisitFilter};
use crate::query::{self, Patch, Record};

pub async fn fetch<R>(db: &SqlitePool, id: u32) -> Result<Option<R>, sqlx::Error>
where
    R: Record + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let statement = query::select_by_id(R::TABLE, id);
    statement.query_as::<R>().fetch_optional(db).await
}

/// Insert one full row. Generic over the executor so the loader can run a
/// whole shard inside one transaction.
pub async fn insert<'e, E, R>(executor: E, record: &R) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
    R: Record,
{
    let statement = query::insert(record);
    statement.query().execute(executor).await?;
    Ok(())
}

/// Returns the number of rows matched by id.
pub async fn update<P: Patch>(db: &SqlitePool, id: u32, patch: &P) -> Result<u64, sqlx::Error> {
    let statement = query::partial_update(id, patch);
    let result = statement.query().execute(db).await?;
    Ok(result.rows_affected())
}

pub async fn user_visits(
    db: &SqlitePool,
    user_id: u32,
    filter: &VisitFilter,
) -> Result<Vec<Place>, sqlx::Error> {
    let statement = query::user_visits(user_id, filter);
    statement.query_as::<Place>().fetch_all(db).await
}

pub async fn location_average(
    db: &SqlitePool,
    location_id: u32,
    filter: &AverageFilter,
) -> Result<AverageMark, sqlx::Error> {
    let statement = query::location_average(location_id, filter);
    statement.query_as::<AverageMark>().fetch_one(db).await
}
