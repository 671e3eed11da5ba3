// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Execution of built statements against the concrete database backends.

use crate::db::sql::{Dialect, SqlBuilder};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::{PgArguments, PgRow, Postgres};
use sqlx::query::Query;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use std::collections::BTreeMap;
use time::OffsetDateTime;
#[cfg(feature = "postgres")]
use transit_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use transit_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use transit_core::db::{DbError, DbResult, Executor};
use transit_core::schema::{Entity, Field, Kind, Record, Schema, Stored, Value};
use uuid::Uuid;

/// An entity row as read from the database, before being converted to its typed form.
#[derive(Debug)]
pub(crate) struct RawRow {
    /// Identifier of the entity.
    pub(crate) uuid: Uuid,

    /// Values of the domain fields.
    pub(crate) record: Record,

    /// Creation time.
    pub(crate) created_at: OffsetDateTime,

    /// Last modification time.
    pub(crate) updated_at: OffsetDateTime,
}

impl RawRow {
    /// Builds the detail projection of this row without any of its relations.
    pub(crate) fn shallow_detail(&self) -> serde_json::Value {
        let mut object = self.record.to_json();
        object.insert("uuid".to_owned(), Value::Uuid(self.uuid).to_json());
        object.insert("created_at".to_owned(), Value::Timestamp(self.created_at).to_json());
        object.insert("updated_at".to_owned(), Value::Timestamp(self.updated_at).to_json());
        serde_json::Value::Object(object)
    }

    /// Converts this row into a typed entity with its eagerly-loaded `related` entities.
    pub(crate) fn into_stored<E: Entity>(
        self,
        related: BTreeMap<&'static str, serde_json::Value>,
    ) -> DbResult<Stored<E>> {
        let entity = E::from_record(&self.record)?;
        Ok(Stored::new(self.uuid, self.created_at, self.updated_at, entity, related))
    }
}

/// Returns the SQL dialect spoken by `ex`.
pub(crate) fn dialect(ex: &Executor) -> Dialect {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(_) => Dialect::Postgres,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(_) => Dialect::Sqlite,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Binds `value` as the next argument of a PostgreSQL `query`.
#[cfg(feature = "postgres")]
fn bind_postgres<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Text(s) => query.bind(s.clone()),
        Value::Uuid(u) => query.bind(*u),
        Value::Integer(i) => query.bind(*i),
        Value::Real(r) => query.bind(*r),
        Value::Timestamp(ts) => query.bind(*ts),
        Value::Null(Kind::Text) => query.bind(None::<String>),
        Value::Null(Kind::Uuid) => query.bind(None::<Uuid>),
        Value::Null(Kind::Integer) => query.bind(None::<i64>),
        Value::Null(Kind::Real) => query.bind(None::<f64>),
        Value::Null(Kind::Timestamp) => query.bind(None::<OffsetDateTime>),
    }
}

/// Binds `value` as the next argument of a SQLite `query`.
#[cfg(any(feature = "sqlite", test))]
fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Text(s) => query.bind(s.clone()),
        Value::Uuid(u) => query.bind(*u),
        Value::Integer(i) => query.bind(*i),
        Value::Real(r) => query.bind(*r),
        Value::Timestamp(ts) => query.bind(unpack_timestamp(*ts)),
        Value::Null(Kind::Text) => query.bind(None::<String>),
        Value::Null(Kind::Uuid) => query.bind(None::<Uuid>),
        Value::Null(Kind::Integer) | Value::Null(Kind::Timestamp) => query.bind(None::<i64>),
        Value::Null(Kind::Real) => query.bind(None::<f64>),
    }
}

/// Reads the value of `field` from a PostgreSQL `row`.
#[cfg(feature = "postgres")]
fn read_postgres_value(row: &PgRow, field: &Field) -> DbResult<Value> {
    let name = field.name;
    let value = match field.kind {
        Kind::Text => row.try_get::<Option<String>, _>(name).map(|v| v.map(Value::Text)),
        Kind::Uuid => row.try_get::<Option<Uuid>, _>(name).map(|v| v.map(Value::Uuid)),
        Kind::Integer => row.try_get::<Option<i64>, _>(name).map(|v| v.map(Value::Integer)),
        Kind::Real => row.try_get::<Option<f64>, _>(name).map(|v| v.map(Value::Real)),
        Kind::Timestamp => {
            row.try_get::<Option<OffsetDateTime>, _>(name).map(|v| v.map(Value::Timestamp))
        }
    }
    .map_err(postgres::map_sqlx_error)?;
    Ok(value.unwrap_or(Value::Null(field.kind)))
}

/// Reads an entity of `schema` from a PostgreSQL `row`.
#[cfg(feature = "postgres")]
fn read_postgres_row(row: &PgRow, schema: &Schema) -> DbResult<RawRow> {
    let uuid: Uuid = row.try_get("uuid").map_err(postgres::map_sqlx_error)?;
    let created_at: OffsetDateTime =
        row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
    let updated_at: OffsetDateTime =
        row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

    let mut record = Record::default();
    for field in schema.fields {
        record.insert(field.name, read_postgres_value(row, field)?);
    }
    Ok(RawRow { uuid, record, created_at, updated_at })
}

/// Reads the value of `field` from a SQLite `row`.
#[cfg(any(feature = "sqlite", test))]
fn read_sqlite_value(row: &SqliteRow, field: &Field) -> DbResult<Value> {
    let name = field.name;
    let value = match field.kind {
        Kind::Text => row.try_get::<Option<String>, _>(name).map(|v| v.map(Value::Text)),
        Kind::Uuid => row.try_get::<Option<Uuid>, _>(name).map(|v| v.map(Value::Uuid)),
        Kind::Integer => row.try_get::<Option<i64>, _>(name).map(|v| v.map(Value::Integer)),
        Kind::Real => row.try_get::<Option<f64>, _>(name).map(|v| v.map(Value::Real)),
        Kind::Timestamp => {
            let micros = row.try_get::<Option<i64>, _>(name).map_err(sqlite::map_sqlx_error)?;
            return match micros {
                Some(micros) => Ok(Value::Timestamp(build_timestamp(micros)?)),
                None => Ok(Value::Null(field.kind)),
            };
        }
    }
    .map_err(sqlite::map_sqlx_error)?;
    Ok(value.unwrap_or(Value::Null(field.kind)))
}

/// Reads an entity of `schema` from a SQLite `row`.
#[cfg(any(feature = "sqlite", test))]
fn read_sqlite_row(row: &SqliteRow, schema: &Schema) -> DbResult<RawRow> {
    let uuid: Uuid = row.try_get("uuid").map_err(sqlite::map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(sqlite::map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(sqlite::map_sqlx_error)?;

    let mut record = Record::default();
    for field in schema.fields {
        record.insert(field.name, read_sqlite_value(row, field)?);
    }
    Ok(RawRow {
        uuid,
        record,
        created_at: build_timestamp(created_at)?,
        updated_at: build_timestamp(updated_at)?,
    })
}

/// Runs `query` and reads every returned row as an entity of `schema`.
pub(crate) async fn fetch_rows(
    ex: &mut Executor,
    schema: &Schema,
    query: &SqlBuilder,
) -> DbResult<Vec<RawRow>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let mut q = sqlx::query(query.sql());
            for arg in query.args() {
                q = bind_postgres(q, arg);
            }
            let rows = q.fetch_all(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            rows.iter().map(|row| read_postgres_row(row, schema)).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let mut q = sqlx::query(query.sql());
            for arg in query.args() {
                q = bind_sqlite(q, arg);
            }
            let rows = q.fetch_all(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            rows.iter().map(|row| read_sqlite_row(row, schema)).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Runs a `query` that returns a single `count` column and returns its value.
pub(crate) async fn fetch_count(ex: &mut Executor, query: &SqlBuilder) -> DbResult<u64> {
    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let mut q = sqlx::query(query.sql());
            for arg in query.args() {
                q = bind_postgres(q, arg);
            }
            let row = q.fetch_one(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let mut q = sqlx::query(query.sql());
            for arg in query.args() {
                q = bind_sqlite(q, arg);
            }
            let row = q.fetch_one(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    u64::try_from(count)
        .map_err(|e| DbError::DataIntegrityError(format!("Invalid count {}: {}", count, e)))
}

/// Runs a `query` that modifies the database and returns the number of affected rows.
pub(crate) async fn execute(ex: &mut Executor, query: &SqlBuilder) -> DbResult<u64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let mut q = sqlx::query(query.sql());
            for arg in query.args() {
                q = bind_postgres(q, arg);
            }
            let done = q.execute(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            Ok(done.rows_affected())
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let mut q = sqlx::query(query.sql());
            for arg in query.args() {
                q = bind_sqlite(q, arg);
            }
            let done = q.execute(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            Ok(done.rows_affected())
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}
