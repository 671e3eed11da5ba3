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

//! Database abstraction to persist the entities of the booking service.
//!
//! All operations are generic over `Entity` and driven by the entity's static `Schema`, so the
//! same code stores countries, trips or payments.  Entities are never physically removed: a
//! deletion stamps `deleted_at` and every read and mutation only considers live rows.

use crate::db::rows::{RawRow, dialect, execute, fetch_count, fetch_rows};
use std::collections::BTreeMap;
use time::OffsetDateTime;
#[cfg(feature = "postgres")]
use transit_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use transit_core::db::sqlite;
use transit_core::db::{DbError, DbResult, Executor};
use transit_core::model::FieldErrors;
use transit_core::query::{Meta, Parameters};
use transit_core::schema::{Association, Entity, Record, Schema, Stored, Value};
use uuid::Uuid;

mod rows;
mod sql;

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Reads the live row `uuid` of `schema`, if any.
async fn find_row(ex: &mut Executor, schema: &Schema, uuid: Uuid) -> DbResult<Option<RawRow>> {
    let query = sql::select_live(dialect(ex), schema, uuid);
    let mut rows = fetch_rows(ex, schema, &query).await?;
    Ok(rows.pop())
}

/// Checks whether the live row `uuid` of `schema` exists.
async fn is_live(ex: &mut Executor, schema: &Schema, uuid: Uuid) -> DbResult<bool> {
    let query = sql::count_live(dialect(ex), schema, &[uuid]);
    Ok(fetch_count(ex, &query).await? > 0)
}

/// Loads the entities related to `row`: one shallow detail (or null) per reference field and
/// one array of shallow details per association.
async fn load_related(
    ex: &mut Executor,
    schema: &Schema,
    row: &RawRow,
) -> DbResult<BTreeMap<&'static str, serde_json::Value>> {
    let mut related = BTreeMap::new();

    for field in schema.fields {
        let Some(target) = field.references else { continue };
        let detail = match row.record.get(field.name) {
            Some(Value::Uuid(uuid)) => find_row(ex, target, *uuid)
                .await?
                .map(|row| row.shallow_detail())
                .unwrap_or(serde_json::Value::Null),
            _ => serde_json::Value::Null,
        };
        related.insert(field.relation_name(), detail);
    }

    for association in schema.associations {
        let query = sql::select_members(dialect(ex), association, row.uuid);
        let members = fetch_rows(ex, association.member, &query).await?;
        let members = members.iter().map(RawRow::shallow_detail).collect();
        related.insert(association.name, serde_json::Value::Array(members));
    }

    Ok(related)
}

/// Converts `row` into a typed entity with all of its relations loaded.
async fn hydrate<E: Entity>(ex: &mut Executor, row: RawRow) -> DbResult<Stored<E>> {
    let related = load_related(ex, E::schema(), &row).await?;
    row.into_stored(related)
}

/// Finds the unique fields of `record` whose values are already taken by live rows other than
/// `exclude`.
async fn unique_errors(
    ex: &mut Executor,
    schema: &Schema,
    record: &Record,
    exclude: Option<Uuid>,
) -> DbResult<FieldErrors> {
    let mut errors = FieldErrors::default();
    for field in schema.fields.iter().filter(|f| f.unique) {
        let value = match record.get(field.name) {
            None | Some(Value::Null(_)) => continue,
            Some(value) => value.clone(),
        };
        let query = sql::count_duplicates(dialect(ex), schema, field, value, exclude);
        if fetch_count(ex, &query).await? > 0 {
            errors.add(field.name, "already exists");
        }
    }
    Ok(errors)
}

/// Stores a new `entity` and returns it as persisted.
///
/// The entity is identified by `uuid` if given, or by a freshly-generated one otherwise.  A
/// supplied `uuid` must not have been used before, not even by a deleted entity.
pub async fn save<E: Entity>(
    ex: &mut Executor,
    uuid: Option<Uuid>,
    entity: &E,
    now: OffsetDateTime,
) -> DbResult<Stored<E>> {
    let schema = E::schema();
    let record = entity.to_record()?;

    let mut errors = FieldErrors::default();
    if let Some(uuid) = uuid {
        let query = sql::count_any(dialect(ex), schema, uuid);
        if fetch_count(ex, &query).await? > 0 {
            errors.add("uuid", "already exists");
        }
    }
    errors.extend(unique_errors(ex, schema, &record, None).await?);
    if !errors.is_empty() {
        return Err(DbError::InvalidFields(errors));
    }

    let uuid = uuid.unwrap_or_else(Uuid::new_v4);
    let query = sql::insert(dialect(ex), schema, uuid, &record, now);
    let rows_affected = execute(ex, &query).await?;
    if rows_affected != 1 {
        return Err(DbError::BackendError(format!(
            "Insertion into {} affected {} rows",
            schema.table, rows_affected
        )));
    }

    get(ex, uuid).await
}

/// Replaces all fields of the live entity `uuid` with those of `entity`.
pub async fn update<E: Entity>(
    ex: &mut Executor,
    uuid: Uuid,
    entity: &E,
    now: OffsetDateTime,
) -> DbResult<Stored<E>> {
    let schema = E::schema();
    let record = entity.to_record()?;

    if !is_live(ex, schema, uuid).await? {
        return Err(DbError::NotFound);
    }

    let errors = unique_errors(ex, schema, &record, Some(uuid)).await?;
    if !errors.is_empty() {
        return Err(DbError::InvalidFields(errors));
    }

    let query = sql::update(dialect(ex), schema, uuid, &record, now);
    if execute(ex, &query).await? == 0 {
        return Err(DbError::NotFound);
    }

    get(ex, uuid).await
}

/// Marks the live entity `uuid` as deleted.
pub async fn delete<E: Entity>(ex: &mut Executor, uuid: Uuid, now: OffsetDateTime) -> DbResult<()> {
    let query = sql::soft_delete(dialect(ex), E::schema(), uuid, now);
    match execute(ex, &query).await? {
        0 => Err(DbError::NotFound),
        _ => Ok(()),
    }
}

/// Gets the live entity `uuid` with its relations.
pub async fn get<E: Entity>(ex: &mut Executor, uuid: Uuid) -> DbResult<Stored<E>> {
    match find_row(ex, E::schema(), uuid).await? {
        Some(row) => hydrate(ex, row).await,
        None => Err(DbError::NotFound),
    }
}

/// Gets the page of live entities that match `params`, together with the pagination metadata.
pub async fn list<E: Entity>(
    ex: &mut Executor,
    params: &Parameters,
) -> DbResult<(Vec<Stored<E>>, Meta)> {
    let schema = E::schema();
    let (count_query, select_query) = sql::list(dialect(ex), schema, params);

    let total = fetch_count(ex, &count_query).await?;
    let rows = fetch_rows(ex, schema, &select_query).await?;

    let mut entities = Vec::with_capacity(rows.len());
    for row in rows {
        entities.push(hydrate(ex, row).await?);
    }
    Ok((entities, Meta::new(params, total)))
}

/// Links the `members` to the live `owner` entity through `association`.
///
/// All members must be live.  Members that are already linked are left untouched.
pub async fn add_members<E: Entity>(
    ex: &mut Executor,
    association: &Association,
    owner: Uuid,
    members: &[Uuid],
) -> DbResult<()> {
    if !is_live(ex, E::schema(), owner).await? {
        return Err(DbError::NotFound);
    }

    for member in members {
        if !is_live(ex, association.member, *member).await? {
            return Err(DbError::InvalidFields(FieldErrors::from([(
                association.name,
                format!("unknown {} {}", association.member.name, member),
            )])));
        }
    }

    for member in members {
        let query = sql::insert_member(dialect(ex), association, owner, *member);
        execute(ex, &query).await?;
    }
    Ok(())
}

/// Unlinks the `members` from the live `owner` entity.  Members that are not linked are ignored.
pub async fn remove_members<E: Entity>(
    ex: &mut Executor,
    association: &Association,
    owner: Uuid,
    members: &[Uuid],
) -> DbResult<()> {
    if !is_live(ex, E::schema(), owner).await? {
        return Err(DbError::NotFound);
    }

    for member in members {
        let query = sql::delete_member(dialect(ex), association, owner, *member);
        execute(ex, &query).await?;
    }
    Ok(())
}
