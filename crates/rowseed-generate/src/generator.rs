use std::fmt;

use rowseed_core::Value;

/// Caller-declared column generator.
///
/// The variant is fixed when the generator is declared, and determines the
/// arguments it receives for every row.
pub enum GeneratorSpec {
    /// The same literal for every row.
    StaticValue(Value),
    ZeroArg(Box<dyn FnMut() -> Value + Send>),
    /// Receives the row number.
    RowIndexed(Box<dyn FnMut(u64) -> Value + Send>),
    /// Receives the row number and the column name.
    RowAndColumnIndexed(Box<dyn FnMut(u64, &str) -> Value + Send>),
}

impl GeneratorSpec {
    pub fn static_value(value: impl Into<Value>) -> Self {
        Self::StaticValue(value.into())
    }

    pub fn zero_arg<F>(f: F) -> Self
    where
        F: FnMut() -> Value + Send + 'static,
    {
        Self::ZeroArg(Box::new(f))
    }

    pub fn row_indexed<F>(f: F) -> Self
    where
        F: FnMut(u64) -> Value + Send + 'static,
    {
        Self::RowIndexed(Box::new(f))
    }

    pub fn row_and_column_indexed<F>(f: F) -> Self
    where
        F: FnMut(u64, &str) -> Value + Send + 'static,
    {
        Self::RowAndColumnIndexed(Box::new(f))
    }

    pub fn call(&mut self, row: u64, column: &str) -> Value {
        match self {
            Self::StaticValue(value) => value.clone(),
            Self::ZeroArg(f) => f(),
            Self::RowIndexed(f) => f(row),
            Self::RowAndColumnIndexed(f) => f(row, column),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::StaticValue(_) => "static",
            Self::ZeroArg(_) => "zero_arg",
            Self::RowIndexed(_) => "row_indexed",
            Self::RowAndColumnIndexed(_) => "row_and_column_indexed",
        }
    }
}

impl fmt::Debug for GeneratorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticValue(value) => f.debug_tuple("StaticValue").field(value).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

impl From<Value> for GeneratorSpec {
    fn from(value: Value) -> Self {
        Self::StaticValue(value)
    }
}
