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

//! Construction of the SQL statements needed by the generic entity operations.
//!
//! Table and column names are taken verbatim from the static schemas, never from user input.
//! Every value, including those coming from list filters, is passed as a bound argument.

use std::fmt::Write;
use time::OffsetDateTime;
use transit_core::query::{Condition, Filter, Parameters};
use transit_core::schema::{Association, Field, Record, Schema, Value};
use uuid::Uuid;

/// SQL flavor to generate statements for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Dialect {
    /// PostgreSQL: numbered `$n` placeholders.
    Postgres,

    /// SQLite: positional `?` placeholders.
    Sqlite,
}

/// Accumulates the text of a statement and the arguments to bind to it.
#[derive(Debug)]
pub(crate) struct SqlBuilder {
    /// Flavor of the statement.
    dialect: Dialect,

    /// Text of the statement built so far.
    sql: String,

    /// Arguments referenced by the placeholders in `sql`, in order.
    args: Vec<Value>,
}

impl SqlBuilder {
    /// Creates an empty statement for `dialect`.
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self { dialect, sql: String::new(), args: vec![] }
    }

    /// Appends raw `sql` text to the statement.
    pub(crate) fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Appends a placeholder for `value` to the statement.
    pub(crate) fn push_arg(&mut self, value: Value) -> &mut Self {
        self.args.push(value);
        match self.dialect {
            Dialect::Postgres => {
                let _ = write!(self.sql, "${}", self.args.len());
            }
            Dialect::Sqlite => self.sql.push('?'),
        }
        self
    }

    /// Appends the condition for `filter` to the statement.
    fn push_filter(&mut self, filter: &Filter) -> &mut Self {
        let column = filter.field;
        match &filter.condition {
            Condition::Equals(value) => {
                self.push(column).push(" = ").push_arg(value.clone());
            }
            Condition::Contains(text) => {
                let function = match self.dialect {
                    Dialect::Postgres => "strpos",
                    Dialect::Sqlite => "instr",
                };
                self.push(function).push("(").push(column).push(", ");
                self.push_arg(Value::Text(text.clone())).push(") > 0");
            }
            Condition::Between(lo, hi) => {
                let mut first = true;
                if let Some(lo) = lo {
                    self.push(column).push(" >= ").push_arg(lo.clone());
                    first = false;
                }
                if let Some(hi) = hi {
                    if !first {
                        self.push(" AND ");
                    }
                    self.push(column).push(" <= ").push_arg(hi.clone());
                }
            }
        }
        self
    }

    /// Returns the text of the statement.
    pub(crate) fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the arguments to bind to the statement.
    pub(crate) fn args(&self) -> &[Value] {
        &self.args
    }
}

/// Returns the comma-separated list of columns to read an entity of `schema`, with each column
/// name prefixed by `prefix`.
fn columns(schema: &Schema, prefix: &str) -> String {
    let mut columns = format!("{}uuid", prefix);
    for field in schema.fields {
        let _ = write!(columns, ", {}{}", prefix, field.name);
    }
    let _ = write!(columns, ", {}created_at, {}updated_at", prefix, prefix);
    columns
}

/// Returns the value of `field` in `record`, which is null if missing.
fn value_of(record: &Record, field: &Field) -> Value {
    record.get(field.name).cloned().unwrap_or(Value::Null(field.kind))
}

/// Builds a statement that reads the live entity `uuid`.
pub(crate) fn select_live(dialect: Dialect, schema: &Schema, uuid: Uuid) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!("SELECT {} FROM {} WHERE uuid = ", columns(schema, ""), schema.table));
    query.push_arg(Value::Uuid(uuid)).push(" AND deleted_at IS NULL");
    query
}

/// Builds a statement that counts the live entities among `uuids`.
pub(crate) fn count_live(dialect: Dialect, schema: &Schema, uuids: &[Uuid]) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!("SELECT COUNT(*) AS count FROM {} WHERE uuid IN (", schema.table));
    for (i, uuid) in uuids.iter().enumerate() {
        if i > 0 {
            query.push(", ");
        }
        query.push_arg(Value::Uuid(*uuid));
    }
    query.push(") AND deleted_at IS NULL");
    query
}

/// Builds a statement that counts the entities with `uuid`, including deleted ones.
pub(crate) fn count_any(dialect: Dialect, schema: &Schema, uuid: Uuid) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!("SELECT COUNT(*) AS count FROM {} WHERE uuid = ", schema.table));
    query.push_arg(Value::Uuid(uuid));
    query
}

/// Builds a statement that counts the live entities other than `exclude` whose `field` has
/// `value`.
pub(crate) fn count_duplicates(
    dialect: Dialect,
    schema: &Schema,
    field: &Field,
    value: Value,
    exclude: Option<Uuid>,
) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!("SELECT COUNT(*) AS count FROM {} WHERE {} = ", schema.table, field.name));
    query.push_arg(value).push(" AND deleted_at IS NULL");
    if let Some(exclude) = exclude {
        query.push(" AND uuid <> ").push_arg(Value::Uuid(exclude));
    }
    query
}

/// Builds a statement that inserts a new entity.
pub(crate) fn insert(
    dialect: Dialect,
    schema: &Schema,
    uuid: Uuid,
    record: &Record,
    now: OffsetDateTime,
) -> SqlBuilder {
    let mut names = "uuid".to_owned();
    for field in schema.fields {
        let _ = write!(names, ", {}", field.name);
    }

    let mut query = SqlBuilder::new(dialect);
    query.push(&format!(
        "INSERT INTO {} ({}, created_at, updated_at) VALUES (",
        schema.table, names
    ));
    query.push_arg(Value::Uuid(uuid));
    for field in schema.fields {
        query.push(", ").push_arg(value_of(record, field));
    }
    query.push(", ").push_arg(Value::Timestamp(now));
    query.push(", ").push_arg(Value::Timestamp(now));
    query.push(")");
    query
}

/// Builds a statement that replaces all fields of the live entity `uuid`.
pub(crate) fn update(
    dialect: Dialect,
    schema: &Schema,
    uuid: Uuid,
    record: &Record,
    now: OffsetDateTime,
) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!("UPDATE {} SET ", schema.table));
    for field in schema.fields {
        query.push(field.name).push(" = ").push_arg(value_of(record, field)).push(", ");
    }
    query.push("updated_at = ").push_arg(Value::Timestamp(now));
    query.push(" WHERE uuid = ").push_arg(Value::Uuid(uuid)).push(" AND deleted_at IS NULL");
    query
}

/// Builds a statement that marks the live entity `uuid` as deleted.
pub(crate) fn soft_delete(
    dialect: Dialect,
    schema: &Schema,
    uuid: Uuid,
    now: OffsetDateTime,
) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!("UPDATE {} SET deleted_at = ", schema.table));
    query.push_arg(Value::Timestamp(now));
    query.push(" WHERE uuid = ").push_arg(Value::Uuid(uuid)).push(" AND deleted_at IS NULL");
    query
}

/// Appends the `WHERE` clause that selects the live entities matching `params`.
fn push_list_conditions(query: &mut SqlBuilder, params: &Parameters) {
    query.push(" WHERE deleted_at IS NULL");
    for filter in params.filters() {
        query.push(" AND ");
        query.push_filter(filter);
    }
}

/// Builds the statements for a list query: one that counts all matches and one that fetches the
/// requested page.
pub(crate) fn list(
    dialect: Dialect,
    schema: &Schema,
    params: &Parameters,
) -> (SqlBuilder, SqlBuilder) {
    let mut count = SqlBuilder::new(dialect);
    count.push(&format!("SELECT COUNT(*) AS count FROM {}", schema.table));
    push_list_conditions(&mut count, params);

    let mut select = SqlBuilder::new(dialect);
    select.push(&format!("SELECT {} FROM {}", columns(schema, ""), schema.table));
    push_list_conditions(&mut select, params);

    let direction = params.sort_direction().as_sql();
    select.push(" ORDER BY ");
    if let Some(sort_by) = params.sort_by() {
        select.push(&format!("{} {}, ", sort_by, direction));
    }
    select.push(&format!("created_at {}, uuid {}", direction, direction));

    let limit = i64::try_from(*params.per_page()).unwrap_or(i64::MAX);
    let offset = i64::try_from(params.offset()).unwrap_or(i64::MAX);
    select.push(" LIMIT ").push_arg(Value::Integer(limit));
    select.push(" OFFSET ").push_arg(Value::Integer(offset));

    (count, select)
}

/// Builds a statement that reads the live members of `association` owned by `owner`.
pub(crate) fn select_members(
    dialect: Dialect,
    association: &Association,
    owner: Uuid,
) -> SqlBuilder {
    let member = association.member;
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!(
        "SELECT {} FROM {} m JOIN {} j ON j.{} = m.uuid WHERE j.{} = ",
        columns(member, "m."),
        member.table,
        association.table,
        association.member_column,
        association.owner_column,
    ));
    query.push_arg(Value::Uuid(owner));
    query.push(" AND m.deleted_at IS NULL ORDER BY m.created_at, m.uuid");
    query
}

/// Builds a statement that links `member` to `owner`, doing nothing if they already are.
pub(crate) fn insert_member(
    dialect: Dialect,
    association: &Association,
    owner: Uuid,
    member: Uuid,
) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!(
        "INSERT INTO {} ({}, {}) VALUES (",
        association.table, association.owner_column, association.member_column
    ));
    query.push_arg(Value::Uuid(owner)).push(", ").push_arg(Value::Uuid(member));
    query.push(") ON CONFLICT DO NOTHING");
    query
}

/// Builds a statement that unlinks `member` from `owner`.
pub(crate) fn delete_member(
    dialect: Dialect,
    association: &Association,
    owner: Uuid,
    member: Uuid,
) -> SqlBuilder {
    let mut query = SqlBuilder::new(dialect);
    query.push(&format!("DELETE FROM {} WHERE {} = ", association.table, association.owner_column));
    query.push_arg(Value::Uuid(owner));
    query.push(&format!(" AND {} = ", association.member_column));
    query.push_arg(Value::Uuid(member));
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{COUNTRY, DRIVER, PRICE};
    use transit_core::schema::Kind;

    #[test]
    fn test_select_live_placeholders() {
        let uuid = Uuid::new_v4();

        let query = select_live(Dialect::Postgres, &COUNTRY, uuid);
        assert_eq!(
            "SELECT uuid, name, code, created_at, updated_at FROM countries \
                WHERE uuid = $1 AND deleted_at IS NULL",
            query.sql()
        );
        assert_eq!(&[Value::Uuid(uuid)], query.args());

        let query = select_live(Dialect::Sqlite, &COUNTRY, uuid);
        assert_eq!(
            "SELECT uuid, name, code, created_at, updated_at FROM countries \
                WHERE uuid = ? AND deleted_at IS NULL",
            query.sql()
        );
    }

    #[test]
    fn test_insert() {
        let uuid = Uuid::new_v4();
        let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
        let mut record = Record::default();
        record.insert("name", Value::Text("Spain".to_owned()));

        let query = insert(Dialect::Postgres, &COUNTRY, uuid, &record, now);
        assert_eq!(
            "INSERT INTO countries (uuid, name, code, created_at, updated_at) \
                VALUES ($1, $2, $3, $4, $5)",
            query.sql()
        );
        assert_eq!(
            &[
                Value::Uuid(uuid),
                Value::Text("Spain".to_owned()),
                Value::Null(Kind::Text),
                Value::Timestamp(now),
                Value::Timestamp(now),
            ],
            query.args()
        );
    }

    #[test]
    fn test_update() {
        let uuid = Uuid::new_v4();
        let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
        let query = update(Dialect::Sqlite, &COUNTRY, uuid, &Record::default(), now);
        assert_eq!(
            "UPDATE countries SET name = ?, code = ?, updated_at = ? \
                WHERE uuid = ? AND deleted_at IS NULL",
            query.sql()
        );
        assert_eq!(4, query.args().len());
    }

    #[test]
    fn test_count_duplicates_excluding_self() {
        let uuid = Uuid::new_v4();
        let field = COUNTRY.field("code").unwrap();
        let query = count_duplicates(
            Dialect::Postgres,
            &COUNTRY,
            field,
            Value::Text("ES".to_owned()),
            Some(uuid),
        );
        assert_eq!(
            "SELECT COUNT(*) AS count FROM countries \
                WHERE code = $1 AND deleted_at IS NULL AND uuid <> $2",
            query.sql()
        );
    }

    #[test]
    fn test_list_defaults() {
        let (count, select) = list(Dialect::Postgres, &PRICE, &Parameters::default());
        assert_eq!("SELECT COUNT(*) AS count FROM prices WHERE deleted_at IS NULL", count.sql());
        assert!(count.args().is_empty());
        assert_eq!(
            "SELECT uuid, passenger_type_uuid, price, created_at, updated_at FROM prices \
                WHERE deleted_at IS NULL ORDER BY created_at ASC, uuid ASC LIMIT $1 OFFSET $2",
            select.sql()
        );
        assert_eq!(&[Value::Integer(5), Value::Integer(0)], select.args());
    }

    #[test]
    fn test_list_filters_and_sort() {
        let params = Parameters::from_query(
            Some("price=10..20&sort_by=price&sort_direction=desc&page=3&per_page=10"),
            PRICE.fields,
        )
        .unwrap();
        let (count, select) = list(Dialect::Sqlite, &PRICE, &params);
        assert_eq!(
            "SELECT COUNT(*) AS count FROM prices WHERE deleted_at IS NULL \
                AND price >= ? AND price <= ?",
            count.sql()
        );
        assert_eq!(&[Value::Real(10.0), Value::Real(20.0)], count.args());
        assert_eq!(
            "SELECT uuid, passenger_type_uuid, price, created_at, updated_at FROM prices \
                WHERE deleted_at IS NULL AND price >= ? AND price <= ? \
                ORDER BY price DESC, created_at DESC, uuid DESC LIMIT ? OFFSET ?",
            select.sql()
        );
        assert_eq!(
            &[Value::Real(10.0), Value::Real(20.0), Value::Integer(10), Value::Integer(20)],
            select.args()
        );
    }

    #[test]
    fn test_list_contains() {
        let params = Parameters::from_query(Some("name=ai&code=ES"), COUNTRY.fields).unwrap();

        let (count, _select) = list(Dialect::Postgres, &COUNTRY, &params);
        assert_eq!(
            "SELECT COUNT(*) AS count FROM countries WHERE deleted_at IS NULL \
                AND strpos(name, $1) > 0 AND code = $2",
            count.sql()
        );

        let (count, _select) = list(Dialect::Sqlite, &COUNTRY, &params);
        assert_eq!(
            "SELECT COUNT(*) AS count FROM countries WHERE deleted_at IS NULL \
                AND instr(name, ?) > 0 AND code = ?",
            count.sql()
        );
    }

    #[test]
    fn test_list_open_range() {
        let params = Parameters::from_query(Some("price=..20"), PRICE.fields).unwrap();
        let (count, _select) = list(Dialect::Postgres, &PRICE, &params);
        assert_eq!(
            "SELECT COUNT(*) AS count FROM prices WHERE deleted_at IS NULL AND price <= $1",
            count.sql()
        );
    }

    #[test]
    fn test_members() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let association = &DRIVER.associations[0];

        let query = select_members(Dialect::Postgres, association, owner);
        assert_eq!(
            "SELECT m.uuid, m.model, m.registration_number, m.capacity, m.created_at, \
                m.updated_at FROM vehicles m JOIN driver_vehicles j ON j.vehicle_uuid = m.uuid \
                WHERE j.driver_uuid = $1 AND m.deleted_at IS NULL ORDER BY m.created_at, m.uuid",
            query.sql()
        );

        let query = insert_member(Dialect::Sqlite, association, owner, member);
        assert_eq!(
            "INSERT INTO driver_vehicles (driver_uuid, vehicle_uuid) VALUES (?, ?) \
                ON CONFLICT DO NOTHING",
            query.sql()
        );
        assert_eq!(&[Value::Uuid(owner), Value::Uuid(member)], query.args());

        let query = delete_member(Dialect::Postgres, association, owner, member);
        assert_eq!(
            "DELETE FROM driver_vehicles WHERE driver_uuid = $1 AND vehicle_uuid = $2",
            query.sql()
        );
    }

    #[test]
    fn test_count_live_many() {
        let uuids = [Uuid::new_v4(), Uuid::new_v4()];
        let query = count_live(Dialect::Postgres, &COUNTRY, &uuids);
        assert_eq!(
            "SELECT COUNT(*) AS count FROM countries WHERE uuid IN ($1, $2) \
                AND deleted_at IS NULL",
            query.sql()
        );
    }
}
