//! Rendering procedure calls as SQL and decoding text-format cells.
//!
//! Only identifiers are spliced into SQL text. Parameter values travel as
//! bound arguments of a `DECLARE ... CURSOR` statement, and the call's rows
//! are then read with `FETCH` over the simple protocol so every cell comes
//! back as text.

use crate::domain::ports::ProcedureExecutorError;
use crate::domain::{CellValue, ParamValue, ProcedureCall};

/// Cursor holding the direct result of a procedure call.
pub(crate) const CALL_CURSOR: &str = "captura_call";

/// One bound argument of a procedure call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SqlArg {
    Int4(i32),
    Int8(i64),
    Text(String),
}

/// Whether `name` is a plain SQL identifier.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(name: &str) -> Result<String, ProcedureExecutorError> {
    if is_identifier(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(ProcedureExecutorError::invalid_call(format!(
            "not a plain identifier: {name:?}"
        )))
    }
}

/// `DECLARE "captura_call" NO SCROLL CURSOR FOR SELECT * FROM
/// "schema"."procedure"("Param" => $1, ...)`.
pub(crate) fn render_declare(
    schema: &str,
    call: &ProcedureCall,
) -> Result<String, ProcedureExecutorError> {
    let args = call
        .params()
        .iter()
        .enumerate()
        .map(|(index, param)| Ok(format!("{} => ${}", quote_identifier(param.name)?, index + 1)))
        .collect::<Result<Vec<_>, ProcedureExecutorError>>()?
        .join(", ");
    Ok(format!(
        "DECLARE {} NO SCROLL CURSOR FOR SELECT * FROM {}.{}({args})",
        quote_identifier(CALL_CURSOR)?,
        quote_identifier(schema)?,
        quote_identifier(call.procedure())?
    ))
}

/// Bound values for [`render_declare`], in placeholder order.
///
/// Integers that fit are sent as `int4` so they match `integer` parameters;
/// `int4` widens implicitly where a procedure declares `bigint`.
pub(crate) fn arguments(call: &ProcedureCall) -> Result<Vec<SqlArg>, ProcedureExecutorError> {
    call.params()
        .iter()
        .map(|param| match &param.value {
            ParamValue::Int(value) => Ok(i32::try_from(*value)
                .map_or(SqlArg::Int8(*value), SqlArg::Int4)),
            ParamValue::Text(text) if text.contains('\0') => Err(
                ProcedureExecutorError::invalid_call("text parameter contains a NUL byte"),
            ),
            ParamValue::Text(text) => Ok(SqlArg::Text(text.clone())),
        })
        .collect()
}

/// `FETCH ALL IN "cursor"` for a cursor name returned by a procedure.
pub(crate) fn render_fetch(cursor: &str) -> String {
    format!("FETCH ALL IN \"{}\"", cursor.replace('"', "\"\""))
}

/// Whether a column type is a cursor handle.
pub(crate) fn is_cursor_type(type_name: &str) -> bool {
    type_name.eq_ignore_ascii_case("refcursor")
}

/// Decode one text-format cell using the column's type name.
///
/// Values that fail to parse as their declared type are kept verbatim as
/// [`CellValue::Other`].
pub(crate) fn decode_text_cell(type_name: &str, raw: Option<&str>) -> CellValue {
    let Some(raw) = raw else {
        return CellValue::Null;
    };
    let kind = type_name.to_ascii_uppercase();
    let parsed = match kind.as_str() {
        "INT2" | "INT4" | "INT8" | "SMALLINT" | "INTEGER" | "BIGINT" | "OID" => {
            raw.parse().ok().map(CellValue::Int)
        }
        "FLOAT4" | "FLOAT8" | "REAL" | "DOUBLE PRECISION" => raw.parse().ok().map(CellValue::Float),
        "BOOL" | "BOOLEAN" => match raw {
            "t" | "true" => Some(CellValue::Bool(true)),
            "f" | "false" => Some(CellValue::Bool(false)),
            _ => None,
        },
        "BYTEA" => raw
            .strip_prefix("\\x")
            .and_then(|hex_digits| hex::decode(hex_digits).ok())
            .map(CellValue::Bytes),
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "REFCURSOR" | "UNKNOWN" => {
            Some(CellValue::Text(raw.to_owned()))
        }
        _ => None,
    };
    parsed.unwrap_or_else(|| CellValue::Other(raw.to_owned()))
}
