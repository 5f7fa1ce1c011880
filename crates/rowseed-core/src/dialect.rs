use crate::schema::TableRef;
use crate::value::Value;

/// Quoting rules of a SQL target.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn quote_identifier(&self, identifier: &str) -> String;

    fn quote_literal(&self, value: &Value) -> String;

    /// Encode a value as one field of a CSV copy stream. NULL is an empty unquoted field.
    fn copy_field(&self, value: &Value) -> String;

    fn quote_table(&self, table: &TableRef) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&table.name)
            ),
            None => self.quote_identifier(&table.name),
        }
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| self.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// PostgreSQL quoting (standard-conforming strings, CSV copy format).
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn quote_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) if value.is_finite() => value.to_string(),
            Value::Float(value) => format!("'{value}'"),
            other => {
                let text = other.to_text().unwrap_or_default();
                format!("'{}'", text.replace('\'', "''"))
            }
        }
    }

    fn copy_field(&self, value: &Value) -> String {
        match value.to_text() {
            None => String::new(),
            Some(text) => format!("\"{}\"", text.replace('"', "\"\"")),
        }
    }
}
