//! Stored-procedure calls and their normalised results.
//!
//! A [`ProcedureCall`] names a procedure and its named parameters. The
//! [`crate::domain::ports::ProcedureExecutor`] port runs it and returns raw
//! result sets ([`RawResultSet`]); [`ProcedureGateway`] turns those into a
//! [`ProcedureOutcome`] holding the primary rows and the optional note.

mod gateway;
mod rows;

pub use gateway::{ProcedureGateway, ProcedureOutcome, select_outcome};
pub use rows::{CellValue, RawResultSet, Row, RowBatch};

use serde_json::{Map, Value};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text parameter.
    Text(String),
    /// Integer parameter.
    Int(i64),
}

impl ParamValue {
    fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Int(value) => Value::from(*value),
        }
    }
}

/// A named parameter, e.g. `UUnidad_Academica`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureParam {
    /// Parameter name without any sigil.
    pub name: &'static str,
    /// Bound value.
    pub value: ParamValue,
}

/// A procedure invocation.
///
/// # Examples
/// ```
/// use captura::domain::ProcedureCall;
///
/// let call = ProcedureCall::new("SP_Valida_Matricula")
///     .text("PPeriodo", "2025-2026/1")
///     .int("semaforo", 3);
/// assert_eq!(call.procedure(), "SP_Valida_Matricula");
/// assert_eq!(call.params().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    procedure: &'static str,
    params: Vec<ProcedureParam>,
}

impl ProcedureCall {
    /// Start a call to `procedure` with no parameters.
    pub fn new(procedure: &'static str) -> Self {
        Self {
            procedure,
            params: Vec::new(),
        }
    }

    /// Append a text parameter.
    #[must_use]
    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push(ProcedureParam {
            name,
            value: ParamValue::Text(value.into()),
        });
        self
    }

    /// Append an integer parameter.
    #[must_use]
    pub fn int(mut self, name: &'static str, value: i64) -> Self {
        self.params.push(ProcedureParam {
            name,
            value: ParamValue::Int(value),
        });
        self
    }

    /// Procedure name.
    pub fn procedure(&self) -> &'static str {
        self.procedure
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[ProcedureParam] {
        &self.params
    }

    /// Value of a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| &param.value)
    }

    /// Parameters as a JSON object, for logs and debug payloads.
    pub fn params_json(&self) -> Value {
        let map: Map<String, Value> = self
            .params
            .iter()
            .map(|param| (param.name.to_owned(), param.value.to_json()))
            .collect();
        Value::Object(map)
    }
}
