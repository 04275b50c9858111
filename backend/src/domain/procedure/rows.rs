//! Raw result sets and their normalisation into JSON rows.
//!
//! Drivers expose rows in different shapes. An adapter picks one
//! [`RowBatch`] variant per result set, in this preference order:
//! mapping, named tuple, positional tuple zipped against the declared
//! columns, then reflected attributes. Normalisation never drops a value:
//! positional rows longer than the column list keep their extra cells under
//! `column_N` keys.

use serde_json::{Map, Number, Value};

/// A normalised row: column name to scalar JSON value.
pub type Row = Map<String, Value>;

/// A single cell as decoded by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// SQL `NULL`.
    Null,
    /// Boolean / bit.
    Bool(bool),
    /// Any integer width.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Character data.
    Text(String),
    /// Binary data; decoded as UTF-8 with replacement.
    Bytes(Vec<u8>),
    /// Any other type, already rendered to text by the adapter.
    Other(String),
}

impl CellValue {
    /// Convert to a scalar JSON value.
    ///
    /// Non-finite floats have no JSON number form and become strings.
    pub fn into_json(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(flag),
            Self::Int(value) => Value::from(value),
            Self::Float(value) => Number::from_f64(value)
                .map_or_else(|| Value::String(value.to_string()), Value::Number),
            Self::Text(text) | Self::Other(text) => Value::String(text),
            Self::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

/// Rows of one result set, in the shape the driver exposed them.
#[derive(Debug, Clone, PartialEq)]
pub enum RowBatch {
    /// Mapping-like rows: ordered name/value pairs.
    Mapping(Vec<Vec<(String, CellValue)>>),
    /// Named-tuple rows sharing one field list.
    Named {
        /// Field names, in tuple order.
        fields: Vec<String>,
        /// Tuples.
        rows: Vec<Vec<CellValue>>,
    },
    /// Bare tuples; names come from the set's declared columns.
    Positional(Vec<Vec<CellValue>>),
    /// Attribute pairs reflected from row objects, including private ones.
    Reflective(Vec<Vec<(String, CellValue)>>),
}

impl RowBatch {
    fn len(&self) -> usize {
        match self {
            Self::Mapping(rows) | Self::Reflective(rows) => rows.len(),
            Self::Named { rows, .. } | Self::Positional(rows) => rows.len(),
        }
    }
}

/// One result set as returned by a procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResultSet {
    /// Declared columns; `None` for non-query results such as row counts.
    pub columns: Option<Vec<String>>,
    /// Row data.
    pub rows: RowBatch,
}

fn zip_named(fields: &[String], values: Vec<CellValue>) -> Row {
    let mut row = Row::new();
    let mut values = values.into_iter();
    for field in fields {
        let value = values.next().unwrap_or(CellValue::Null);
        row.insert(field.clone(), value.into_json());
    }
    for (offset, extra) in values.enumerate() {
        row.insert(
            format!("column_{}", fields.len() + offset),
            extra.into_json(),
        );
    }
    row
}

fn from_pairs(pairs: Vec<(String, CellValue)>, skip_private: bool) -> Row {
    pairs
        .into_iter()
        .filter(|(name, _)| !(skip_private && name.starts_with('_')))
        .map(|(name, value)| (name, value.into_json()))
        .collect()
}

impl RawResultSet {
    /// A set with declared columns and positional rows.
    pub fn positional(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns: Some(columns),
            rows: RowBatch::Positional(rows),
        }
    }

    /// Number of declared columns, if the set describes any.
    pub fn column_count(&self) -> Option<usize> {
        self.columns.as_ref().map(Vec::len)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First cell of the first row, if present.
    pub fn first_value(&self) -> Option<CellValue> {
        match &self.rows {
            RowBatch::Mapping(rows) | RowBatch::Reflective(rows) => rows
                .first()
                .and_then(|row| row.first())
                .map(|(_, value)| value.clone()),
            RowBatch::Named { rows, .. } | RowBatch::Positional(rows) => {
                rows.first().and_then(|row| row.first()).cloned()
            }
        }
    }

    /// Normalise every row to a JSON mapping.
    pub fn normalize(self) -> Vec<Row> {
        let columns = self.columns.unwrap_or_default();
        match self.rows {
            RowBatch::Mapping(rows) => rows.into_iter().map(|r| from_pairs(r, false)).collect(),
            RowBatch::Named { fields, rows } => {
                rows.into_iter().map(|r| zip_named(&fields, r)).collect()
            }
            RowBatch::Positional(rows) => {
                rows.into_iter().map(|r| zip_named(&columns, r)).collect()
            }
            RowBatch::Reflective(rows) => rows.into_iter().map(|r| from_pairs(r, true)).collect(),
        }
    }
}
