//! Statement builder.
//!
//! Assembles `SELECT` / `INSERT` / `UPDATE` / `DELETE` statements from column
//! and value pairs. Table and column names are `&'static str` supplied by this
//! crate; values are always bound as positional `?N` parameters.

use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};
use tracing::debug;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Tokens,
    Messages,
    Upvotes,
    PopularMessages,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Tokens => "tokens",
            Table::Messages => "messages",
            Table::Upvotes => "upvotes",
            Table::PopularMessages => "popular_messages",
        }
    }
}

/// A row type that can be read back with [`get`]. `COLUMNS` is the select
/// list, and `from_row` reads them back by position.
pub trait FromRow: Sized {
    const TABLE: Table;
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// SQL text plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Conjunction of exact-match `column = value` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pairs: Vec<(&'static str, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.pairs.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn render(&self, separator: &str, params: &mut Vec<Value>) -> String {
        render_pairs(&self.pairs, separator, params)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    filter: Filter,
    or_filter: Filter,
    contains: Vec<(&'static str, String)>,
    limit: Option<u32>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `WHERE` conjunction.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Alternative conjunction appended as `OR (...)`. Ignored unless a
    /// primary filter is also set.
    pub fn or_filter(mut self, filter: Filter) -> Self {
        self.or_filter = filter;
        self
    }

    /// Substring match on `column`. Multiple calls are OR-ed together.
    pub fn contains(mut self, column: &'static str, term: &str) -> Self {
        self.contains.push((column, term.to_owned()));
        self
    }

    /// Row cap; zero means unlimited.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn statement(&self, table: Table, columns: &[&'static str]) -> Statement {
        let mut params = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            columns.iter().map(|c| ident(c)).collect::<Vec<_>>().join(", "),
            ident(table.name())
        );

        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter.render(" AND ", &mut params));
        }

        if !self.contains.is_empty() {
            sql.push_str(if self.filter.is_empty() { " WHERE " } else { " AND " });
            let likes: Vec<String> = self
                .contains
                .iter()
                .map(|(column, term)| {
                    params.push(Value::Text(format!("%{term}%")));
                    format!("{} LIKE ?{}", ident(column), params.len())
                })
                .collect();
            sql.push('(');
            sql.push_str(&likes.join(" OR "));
            sql.push(')');
        }

        if !self.filter.is_empty() && !self.or_filter.is_empty() {
            sql.push_str(" OR (");
            sql.push_str(&self.or_filter.render(" AND ", &mut params));
            sql.push(')');
        }

        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            params.push(Value::Integer(i64::from(limit)));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        Statement { sql, params }
    }
}

pub fn insert_statement(table: Table, values: &[(&'static str, Value)]) -> Statement {
    if values.is_empty() {
        return Statement {
            sql: format!("INSERT INTO {} DEFAULT VALUES RETURNING \"id\"", ident(table.name())),
            params: Vec::new(),
        };
    }

    let columns: Vec<String> = values.iter().map(|(c, _)| ident(c)).collect();
    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();

    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING \"id\"",
            ident(table.name()),
            columns.join(", "),
            placeholders.join(", ")
        ),
        params: values.iter().map(|(_, v)| v.clone()).collect(),
    }
}

pub fn update_statement(table: Table, set: &[(&'static str, Value)], filter: &Filter) -> Statement {
    let mut params = Vec::new();
    let mut sql = format!(
        "UPDATE {} SET {}",
        ident(table.name()),
        render_pairs(set, ", ", &mut params)
    );

    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.render(" AND ", &mut params));
    }

    Statement { sql, params }
}

pub fn delete_statement(table: Table, filter: &Filter) -> Statement {
    let mut params = Vec::new();
    let mut sql = format!("DELETE FROM {}", ident(table.name()));

    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.render(" AND ", &mut params));
    }

    Statement { sql, params }
}

/// Inserts one row and returns its `id`.
pub fn write(conn: &Connection, table: Table, values: &[(&'static str, Value)]) -> Result<i64, DbError> {
    let stmt = insert_statement(table, values);
    debug!(sql = %stmt.sql, "write");
    let id = conn.query_row(&stmt.sql, params_from_iter(stmt.params.iter()), |row| row.get(0))?;
    Ok(id)
}

pub fn get<T: FromRow>(conn: &Connection, select: &Select) -> Result<Vec<T>, DbError> {
    let stmt = select.statement(T::TABLE, T::COLUMNS);
    debug!(sql = %stmt.sql, "get");

    let mut prepared = conn.prepare(&stmt.sql)?;
    let rows = prepared
        .query_map(params_from_iter(stmt.params.iter()), |row| T::from_row(row))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn get_one<T: FromRow>(conn: &Connection, select: Select) -> Result<Option<T>, DbError> {
    Ok(get(conn, &select.limit(1))?.into_iter().next())
}

/// Returns the number of rows changed. An empty `set` is a no-op.
pub fn update(
    conn: &Connection,
    table: Table,
    set: &[(&'static str, Value)],
    filter: &Filter,
) -> Result<usize, DbError> {
    if set.is_empty() {
        return Ok(0);
    }

    let stmt = update_statement(table, set, filter);
    debug!(sql = %stmt.sql, "update");
    Ok(conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?)
}

pub fn delete(conn: &Connection, table: Table, filter: &Filter) -> Result<usize, DbError> {
    let stmt = delete_statement(table, filter);
    debug!(sql = %stmt.sql, "delete");
    Ok(conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?)
}

fn render_pairs(pairs: &[(&'static str, Value)], separator: &str, params: &mut Vec<Value>) -> String {
    pairs
        .iter()
        .map(|(column, value)| {
            params.push(value.clone());
            format!("{} = ?{}", ident(column), params.len())
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRow;

    const COLS: &[&str] = &["id", "message"];

    #[test]
    fn select_without_filters() {
        let stmt = Select::new().statement(Table::Messages, COLS);
        assert_eq!(stmt.sql, r#"SELECT "id", "message" FROM "messages""#);
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn select_where_and_contains_then_or_then_limit() {
        let stmt = Select::new()
            .filter(Filter::new().eq("private", false))
            .contains("message", "hi")
            .or_filter(Filter::new().eq("user_id", 7_i64).eq("private", true))
            .limit(10)
            .statement(Table::Messages, COLS);

        assert_eq!(
            stmt.sql,
            r#"SELECT "id", "message" FROM "messages" WHERE "private" = ?1 AND ("message" LIKE ?2) OR ("user_id" = ?3 AND "private" = ?4) LIMIT ?5"#
        );
        assert_eq!(
            stmt.params,
            vec![
                Value::Integer(0),
                Value::Text("%hi%".into()),
                Value::Integer(7),
                Value::Integer(1),
                Value::Integer(10),
            ]
        );
    }

    #[test]
    fn contains_alone_opens_where_clause() {
        let stmt = Select::new()
            .contains("message", "a")
            .contains("email", "b")
            .statement(Table::Messages, COLS);
        assert_eq!(
            stmt.sql,
            r#"SELECT "id", "message" FROM "messages" WHERE ("message" LIKE ?1 OR "email" LIKE ?2)"#
        );
    }

    #[test]
    fn or_filter_needs_primary_filter() {
        let stmt = Select::new()
            .or_filter(Filter::new().eq("user_id", 1_i64))
            .statement(Table::Messages, COLS);
        assert_eq!(stmt.sql, r#"SELECT "id", "message" FROM "messages""#);
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let stmt = Select::new().limit(0).statement(Table::Messages, COLS);
        assert!(!stmt.sql.contains("LIMIT"));
    }

    #[test]
    fn hostile_values_stay_out_of_sql_text() {
        let evil = "'; DROP TABLE users; --";
        let stmt = Select::new()
            .filter(Filter::new().eq("message", evil.to_owned()))
            .statement(Table::Messages, COLS);
        assert!(!stmt.sql.contains("DROP"));
        assert_eq!(stmt.params, vec![Value::Text(evil.into())]);
    }

    #[test]
    fn update_and_delete_shapes() {
        let filter = Filter::new().eq("id", 3_i64);
        let update = update_statement(
            Table::Messages,
            &[("message", Value::Text("x".into())), ("private", Value::from(true))],
            &filter,
        );
        assert_eq!(
            update.sql,
            r#"UPDATE "messages" SET "message" = ?1, "private" = ?2 WHERE "id" = ?3"#
        );
        assert_eq!(update.params.len(), 3);

        let delete = delete_statement(Table::Messages, &Filter::new().eq("user_id", 1_i64).eq("id", 3_i64));
        assert_eq!(delete.sql, r#"DELETE FROM "messages" WHERE "user_id" = ?1 AND "id" = ?2"#);
    }

    #[test]
    fn insert_shape() {
        let stmt = insert_statement(
            Table::Tokens,
            &[("token", Value::Text("t".into())), ("user_id", Value::Integer(1))],
        );
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "tokens" ("token", "user_id") VALUES (?1, ?2) RETURNING "id""#
        );
    }

    #[test]
    fn executes_against_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run(&conn).unwrap();

        let user = write(
            &conn,
            Table::Users,
            &[("email", Value::Text("a@x.com".into())), ("password", Value::Text("h".into()))],
        )
        .unwrap();

        for (text, private) in [("hello world", false), ("secret hello", true), ("bye", false)] {
            write(
                &conn,
                Table::Messages,
                &[
                    ("user_id", Value::Integer(user)),
                    ("message", Value::Text(text.into())),
                    ("private", Value::from(private)),
                ],
            )
            .unwrap();
        }

        let public_hello: Vec<MessageRow> = get(
            &conn,
            &Select::new()
                .filter(Filter::new().eq("private", false))
                .contains("message", "hello"),
        )
        .unwrap();
        assert_eq!(public_hello.len(), 1);
        assert_eq!(public_hello[0].message, "hello world");

        let first: Option<MessageRow> = get_one(&conn, Select::new()).unwrap();
        assert!(first.is_some());

        let changed = update(
            &conn,
            Table::Messages,
            &[("private", Value::from(true))],
            &Filter::new().eq("message", "bye".to_owned()),
        )
        .unwrap();
        assert_eq!(changed, 1);

        assert_eq!(update(&conn, Table::Messages, &[], &Filter::new()).unwrap(), 0);

        let removed = delete(&conn, Table::Messages, &Filter::new().eq("private", true)).unwrap();
        assert_eq!(removed, 2);
    }

    #[test]
    fn duplicate_insert_is_a_unique_violation() {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run(&conn).unwrap();

        let values = [("email", Value::Text("a@x.com".into())), ("password", Value::Text("h".into()))];
        write(&conn, Table::Users, &values).unwrap();
        let err = write(&conn, Table::Users, &values).unwrap_err();
        assert!(err.is_unique_violation());
    }
}
