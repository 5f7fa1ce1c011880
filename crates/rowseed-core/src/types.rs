/// Semantic column type used to pick a value generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    /// Enumerated type with its permitted labels, resolved once.
    Enum(Vec<String>),
    DateTime,
    Date,
    Boolean,
    Uuid,
    /// Anything the generators do not understand; carries the declared type.
    Other(String),
}

impl ColumnKind {
    pub fn label(&self) -> &str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Text => "text",
            ColumnKind::Enum(_) => "enum",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Date => "date",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Uuid => "uuid",
            ColumnKind::Other(name) => name.as_str(),
        }
    }
}

/// Classify a declared SQL type into a column kind and storage limit.
///
/// `enum_labels` is provided by the catalog when the type is a named
/// enumerated type.
pub fn classify_sql_type(
    data_type: &str,
    character_max_length: Option<i32>,
    enum_labels: Option<Vec<String>>,
) -> (ColumnKind, Option<u32>) {
    if let Some(labels) = enum_labels {
        return (ColumnKind::Enum(labels), None);
    }
    if let Some(labels) = parse_inline_enum(data_type) {
        return (ColumnKind::Enum(labels), None);
    }

    let normalized = data_type.trim().to_lowercase();
    let base = normalized
        .split('(')
        .next()
        .unwrap_or(&normalized)
        .trim()
        .to_string();
    let char_limit = character_max_length
        .and_then(|len| u32::try_from(len).ok())
        .or_else(|| parenthesized_limit(&normalized));

    match base.as_str() {
        "smallint" | "int2" | "smallserial" => (ColumnKind::Integer, Some(2)),
        "integer" | "int" | "int4" | "serial" => (ColumnKind::Integer, Some(4)),
        "bigint" | "int8" | "bigserial" => (ColumnKind::Integer, Some(8)),
        "character varying" | "varchar" | "character" | "char" | "bpchar" => {
            (ColumnKind::Text, char_limit)
        }
        "text" | "citext" => (ColumnKind::Text, None),
        "timestamp without time zone"
        | "timestamp with time zone"
        | "timestamp"
        | "timestamptz"
        | "datetime" => (ColumnKind::DateTime, None),
        "date" => (ColumnKind::Date, None),
        "boolean" | "bool" => (ColumnKind::Boolean, None),
        "uuid" => (ColumnKind::Uuid, None),
        _ => (ColumnKind::Other(data_type.to_string()), None),
    }
}

/// Parse an inline choice list such as `enum('small','large')`.
pub fn parse_inline_enum(data_type: &str) -> Option<Vec<String>> {
    let trimmed = data_type.trim();
    if !trimmed.to_lowercase().starts_with("enum") {
        return None;
    }
    let open = trimmed.find('(')?;
    let close = trimmed.rfind(')')?;
    if close <= open {
        return None;
    }

    let mut labels = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = trimmed[open + 1..close].chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' if in_quote && chars.peek() == Some(&'\'') => {
                current.push('\'');
                chars.next();
            }
            '\'' if in_quote => {
                labels.push(std::mem::take(&mut current));
                in_quote = false;
            }
            '\'' => in_quote = true,
            _ if in_quote => current.push(ch),
            _ => {}
        }
    }

    if labels.is_empty() { None } else { Some(labels) }
}

fn parenthesized_limit(data_type: &str) -> Option<u32> {
    let open = data_type.find('(')?;
    let close = data_type[open..].find(')')? + open;
    data_type[open + 1..close].trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_widths_follow_storage_size() {
        assert_eq!(classify_sql_type("smallint", None, None).1, Some(2));
        assert_eq!(classify_sql_type("integer", None, None).1, Some(4));
        assert_eq!(classify_sql_type("bigint", None, None).1, Some(8));
    }

    #[test]
    fn varchar_limit_is_read_from_declaration() {
        let (kind, limit) = classify_sql_type("character varying(12)", None, None);
        assert_eq!(kind, ColumnKind::Text);
        assert_eq!(limit, Some(12));
    }

    #[test]
    fn inline_enum_labels_are_parsed() {
        let labels = parse_inline_enum("enum('small','it''s','large')").expect("labels");
        assert_eq!(labels, vec!["small", "it's", "large"]);
        assert!(parse_inline_enum("varchar(10)").is_none());
    }

    #[test]
    fn unknown_types_are_reported_as_other() {
        let (kind, _) = classify_sql_type("jsonb", None, None);
        assert_eq!(kind, ColumnKind::Other("jsonb".to_string()));
    }
}
