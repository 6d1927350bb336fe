use chrono::{DateTime, NaiveTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

/// ===============================
/// SQL bindable value enum
/// ===============================
///
/// Nullable columns carry their `Option` so Postgres still sees a typed NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(Option<String>),
    I64(i64),
    DateTime(DateTime<Utc>),
    Time(Option<NaiveTime>),
}

/// A single `column = value` pair of a merge-update.
pub type Assignment = (&'static str, SqlValue);

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Only the supplied columns appear in the SET clause, the rest of the row is
/// left alone. The statement returns the full row so the caller never needs a
/// second read. With no assignments it degrades to a plain select of the row.
pub fn build_update_sql(
    table: &str,
    assignments: Vec<Assignment>,
    id_column: &str,
    id_value: i64,
    returning: &str,
) -> SqlUpdate {
    if assignments.is_empty() {
        return SqlUpdate {
            sql: format!(
                "SELECT {} FROM {} WHERE {} = $1",
                returning, table, id_column
            ),
            values: vec![SqlValue::I64(id_value)],
        };
    }

    let set_clause = assignments
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        set_clause,
        id_column,
        assignments.len() + 1,
        returning
    );

    let mut values = Vec::with_capacity(assignments.len() + 1);
    values.extend(assignments.into_iter().map(|(_, value)| value));

    // WHERE id = $n
    values.push(SqlValue::I64(id_value));

    SqlUpdate { sql, values }
}

/// ===============================
/// Execute the update
/// ===============================
///
/// `None` means no row carried the given id.
pub async fn execute_update<T>(pool: &PgPool, update: SqlUpdate) -> Result<Option<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut query = sqlx::query_as::<_, T>(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
        };
    }

    query.fetch_optional(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_update_with_returning_clause() {
        let update = build_update_sql(
            "projects",
            vec![
                ("name", SqlValue::String(Some("Apollo".into()))),
                ("owner", SqlValue::String(None)),
            ],
            "id",
            7,
            "id, name, owner",
        );

        assert_eq!(
            update.sql,
            "UPDATE projects SET name = $1, owner = $2 WHERE id = $3 RETURNING id, name, owner"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::String(Some("Apollo".into())),
                SqlValue::String(None),
                SqlValue::I64(7),
            ]
        );
    }

    #[test]
    fn empty_assignments_select_the_current_row() {
        let update = build_update_sql("tasks", Vec::new(), "id", 3, "id, title");

        assert_eq!(update.sql, "SELECT id, title FROM tasks WHERE id = $1");
        assert_eq!(update.values, vec![SqlValue::I64(3)]);
    }
}
