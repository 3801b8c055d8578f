//! Partial update statement builder
//!
//! Turns a fixed list of `(column, Option<value>)` pairs into a parameterized
//! `SET` clause. Only columns whose value is present are emitted, each bound to
//! the next `$k` placeholder. Values never enter the SQL text; column names are
//! `&'static str` so they can only come from code.

use thiserror::Error;
use tokio_postgres::types::ToSql;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("No fields to update")]
    NoFieldsProvided,
}

/// A value bound to a placeholder in an update statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Bool(bool),
}

impl SqlValue {
    /// Borrow the value as a tokio-postgres query parameter
    pub fn as_param(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlValue::Text(v) => v,
            SqlValue::Bool(v) => v,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateStatement {
    table: &'static str,
    columns: Vec<&'static str>,
    set_clause: String,
    args: Vec<SqlValue>,
    next_arg_index: usize,
}

impl UpdateStatement {
    /// `col = $1, col = $2, ...` for the supplied fields, in supply order
    pub fn set_clause(&self) -> &str {
        &self.set_clause
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Placeholder index the caller should use for its own trailing argument
    pub fn next_arg_index(&self) -> usize {
        self.next_arg_index
    }

    /// Column/value pairs in placeholder order
    pub fn assignments(&self) -> impl Iterator<Item = (&'static str, &SqlValue)> {
        self.columns.iter().copied().zip(self.args.iter())
    }

    /// Also set `column` to the store's current time. Uses no placeholder.
    pub fn touching(mut self, column: &'static str) -> Self {
        self.set_clause.push_str(&format!(", {column} = NOW()"));
        self
    }

    /// Render the full statement keyed on `key_column = $next_arg_index`.
    ///
    /// The caller binds `args()` followed by the key value.
    pub fn to_sql(&self, key_column: &'static str, returning: &str) -> String {
        format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
            self.table,
            self.set_clause(),
            key_column,
            self.next_arg_index(),
            returning
        )
    }
}

/// Build the `SET` clause for the present fields of a partial update.
///
/// Fails with [`UpdateError::NoFieldsProvided`] when every value is `None`.
/// Content validation (e.g. blank text) is the caller's job.
pub fn build_update(
    table: &'static str,
    fields: Vec<(&'static str, Option<SqlValue>)>,
) -> Result<UpdateStatement, UpdateError> {
    let mut columns = Vec::new();
    let mut set_parts = Vec::new();
    let mut args = Vec::new();
    let mut arg_index = 1;

    for (column, value) in fields {
        let Some(value) = value else { continue };
        set_parts.push(format!("{column} = ${arg_index}"));
        columns.push(column);
        args.push(value);
        arg_index += 1;
    }

    if set_parts.is_empty() {
        return Err(UpdateError::NoFieldsProvided);
    }

    Ok(UpdateStatement {
        table,
        columns,
        set_clause: set_parts.join(", "),
        args,
        next_arg_index: arg_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_present_fields_is_rejected() {
        let result = build_update(
            "todos",
            vec![("todo", None), ("completed", None)],
        );
        assert_eq!(result.unwrap_err(), UpdateError::NoFieldsProvided);

        assert_eq!(build_update("todos", vec![]).unwrap_err(), UpdateError::NoFieldsProvided);
    }

    #[test]
    fn test_single_field() {
        let stmt = build_update(
            "todos",
            vec![
                ("todo", Some(SqlValue::Text("x".to_string()))),
                ("completed", None),
            ],
        )
        .unwrap();

        assert_eq!(stmt.set_clause(), "todo = $1");
        assert_eq!(stmt.args(), &[SqlValue::Text("x".to_string())]);
        assert_eq!(stmt.next_arg_index(), 2);
    }

    #[test]
    fn test_two_fields_keep_supply_order() {
        let stmt = build_update(
            "todos",
            vec![
                ("todo", Some(SqlValue::Text("x".to_string()))),
                ("completed", Some(SqlValue::Bool(true))),
            ],
        )
        .unwrap();

        assert_eq!(stmt.set_clause(), "todo = $1, completed = $2");
        assert_eq!(
            stmt.args(),
            &[SqlValue::Text("x".to_string()), SqlValue::Bool(true)]
        );
        assert_eq!(stmt.next_arg_index(), 3);

        let pairs: Vec<_> = stmt.assignments().map(|(c, _)| c).collect();
        assert_eq!(pairs, vec!["todo", "completed"]);
    }

    #[test]
    fn test_skipped_field_does_not_consume_placeholder() {
        let stmt = build_update(
            "todos",
            vec![("todo", None), ("completed", Some(SqlValue::Bool(false)))],
        )
        .unwrap();

        assert_eq!(stmt.set_clause(), "completed = $1");
        assert_eq!(stmt.next_arg_index(), 2);
    }

    #[test]
    fn test_rendered_statement_keys_on_next_placeholder() {
        let stmt = build_update(
            "todos",
            vec![("completed", Some(SqlValue::Bool(true)))],
        )
        .unwrap()
        .touching("updated_at");

        assert_eq!(
            stmt.to_sql("id", "id, todo"),
            "UPDATE todos SET completed = $1, updated_at = NOW() WHERE id = $2 RETURNING id, todo"
        );
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let hostile = "'; DROP TABLE todos; --".to_string();
        let stmt = build_update(
            "todos",
            vec![("todo", Some(SqlValue::Text(hostile.clone())))],
        )
        .unwrap();

        assert!(!stmt.to_sql("id", "id").contains(&hostile));
        assert_eq!(stmt.args(), &[SqlValue::Text(hostile)]);
    }
}
