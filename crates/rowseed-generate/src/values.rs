use rand::Rng;

use rowseed_core::{ColumnKind, ColumnSpec, TableRef, Value};

use crate::context::GenerationContext;
use crate::errors::{GenerationError, Result};

/// Upper bound applied to generated integers regardless of column width.
pub const INTEGER_CAP: i64 = 1_000_000_000;

const PERSON_WORDS: &[&str] = &["customer", "human", "employee", "person", "user"];
const ORGANIZATION_WORDS: &[&str] = &[
    "business",
    "company",
    "enterprise",
    "legalentity",
    "organization",
];

/// Built-in generator chosen from a column's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueGenerator {
    /// Uniform integer in `0..=max`.
    Integer { max: i64 },
    Text {
        intent: TextIntent,
        limit: Option<usize>,
    },
    Enum(Vec<String>),
    DateTime,
    Date,
    Boolean,
    Uuid,
}

/// What a text column most likely holds, guessed from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextIntent {
    PersonFullName,
    FirstName,
    MiddleName,
    LastName,
    OrganizationName,
    Identifier,
}

impl ValueGenerator {
    /// Whether a built-in generator exists for `kind`.
    pub fn supports(kind: &ColumnKind) -> bool {
        !matches!(kind, ColumnKind::Other(_))
    }

    /// Pick the generator for `column` of `table`.
    pub fn for_column(table: &TableRef, column: &ColumnSpec) -> Result<Self> {
        match &column.kind {
            ColumnKind::Integer => Ok(Self::Integer {
                max: integer_upper_bound(column.limit),
            }),
            ColumnKind::Text => Ok(Self::Text {
                intent: text_intent(&table.name, &column.name),
                limit: column.limit.map(|limit| limit as usize),
            }),
            ColumnKind::Enum(labels) if labels.is_empty() => Err(GenerationError::Config(
                format!(
                    "column '{}' of '{table}' is an enum without labels",
                    column.name
                ),
            )),
            ColumnKind::Enum(labels) => Ok(Self::Enum(labels.clone())),
            ColumnKind::DateTime => Ok(Self::DateTime),
            ColumnKind::Date => Ok(Self::Date),
            ColumnKind::Boolean => Ok(Self::Boolean),
            ColumnKind::Uuid => Ok(Self::Uuid),
            ColumnKind::Other(sql_type) => Err(GenerationError::Config(format!(
                "column '{}' of type '{sql_type}' in table '{table}' not supported",
                column.name
            ))),
        }
    }

    pub fn generate(&self, row: u64, ctx: &mut GenerationContext) -> Value {
        match self {
            Self::Integer { max } => Value::Int(ctx.rng.random_range(0..=*max)),
            Self::Text { intent, limit } => {
                let text = generate_text(*intent, ctx);
                Value::Text(truncate(text, *limit))
            }
            Self::Enum(labels) => {
                let index = ctx.rng.random_range(0..labels.len());
                Value::Text(labels[index].clone())
            }
            Self::DateTime => Value::Timestamp(ctx.row_timestamp(row)),
            Self::Date => Value::Date(ctx.row_timestamp(row).date()),
            Self::Boolean => Value::Bool(ctx.rng.random()),
            Self::Uuid => Value::Uuid(random_uuid(ctx)),
        }
    }
}

/// Largest integer generated for a column of `byte_width` bytes (default 8).
pub fn integer_upper_bound(byte_width: Option<u32>) -> i64 {
    let bytes = byte_width.unwrap_or(8).clamp(1, 8);
    let max = if bytes == 8 {
        i64::MAX
    } else {
        (1_i64 << (8 * bytes - 1)) - 1
    };
    max.min(INTEGER_CAP)
}

/// Guess the intent of a text column from its name and its table's name.
pub fn text_intent(table: &str, column: &str) -> TextIntent {
    let column = column.to_lowercase();
    let entity = entity_name(table);

    match column.as_str() {
        "name" if mentions_any(&entity, PERSON_WORDS) => TextIntent::PersonFullName,
        "first_name" | "firstname" => TextIntent::FirstName,
        "middle_name" | "middlename" => TextIntent::MiddleName,
        "last_name" | "lastname" => TextIntent::LastName,
        "company_name" | "companyname" | "business_name" | "businessname" => {
            TextIntent::OrganizationName
        }
        "name" if mentions_any(&entity, ORGANIZATION_WORDS) => TextIntent::OrganizationName,
        _ => TextIntent::Identifier,
    }
}

// Tables are usually plural; compare against the singular entity name.
fn entity_name(table: &str) -> String {
    let name: String = table
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect();

    if name.ends_with("people") {
        format!("{}person", &name[..name.len() - "people".len()])
    } else if let Some(stem) = name.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = name.strip_suffix("sses") {
        format!("{stem}ss")
    } else if name.ends_with('s') && !name.ends_with("ss") {
        name[..name.len() - 1].to_string()
    } else {
        name
    }
}

fn mentions_any(entity: &str, words: &[&str]) -> bool {
    words
        .iter()
        .any(|word| entity.starts_with(word) || entity.ends_with(word))
}

fn generate_text(intent: TextIntent, ctx: &mut GenerationContext) -> String {
    let faker = ctx.faker();
    match intent {
        TextIntent::PersonFullName => faker.full_name(&mut ctx.rng),
        TextIntent::FirstName => faker.first_name(&mut ctx.rng),
        TextIntent::MiddleName => faker.middle_name(&mut ctx.rng),
        TextIntent::LastName => faker.last_name(&mut ctx.rng),
        TextIntent::OrganizationName => faker.company_name(&mut ctx.rng),
        TextIntent::Identifier => random_uuid(ctx),
    }
}

fn truncate(text: String, limit: Option<usize>) -> String {
    match limit {
        Some(limit) if text.chars().count() > limit => text.chars().take(limit).collect(),
        _ => text,
    }
}

fn random_uuid(ctx: &mut GenerationContext) -> String {
    uuid::Builder::from_random_bytes(ctx.rng.random())
        .into_uuid()
        .to_string()
}
