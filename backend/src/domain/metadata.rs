//! Choice lists derived from procedure rows.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::Row;

/// Distinct, non-empty values per column, sorted lexicographically.
///
/// `columns` pairs each output key with the row column it reads. Missing
/// columns, nulls and blank strings contribute nothing. Numbers and booleans
/// are rendered to text; nested values are ignored. The result depends only
/// on the multiset of rows, never on their order.
///
/// # Examples
/// ```
/// use captura::domain::{Row, extract_unique};
/// use serde_json::json;
///
/// let rows: Vec<Row> = [json!({"Turno": "Vespertino"}), json!({"Turno": "Matutino"})]
///     .into_iter()
///     .filter_map(|v| v.as_object().cloned())
///     .collect();
/// let unique = extract_unique(&rows, &[("turnos", "Turno")]);
/// assert_eq!(unique["turnos"], vec!["Matutino", "Vespertino"]);
/// ```
pub fn extract_unique(rows: &[Row], columns: &[(&str, &str)]) -> BTreeMap<String, Vec<String>> {
    columns
        .iter()
        .map(|(key, column)| {
            let values: BTreeSet<String> = rows
                .iter()
                .filter_map(|row| row.get(*column))
                .filter_map(scalar_text)
                .collect();
            ((*key).to_owned(), values.into_iter().collect())
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Replace `null` and the literal `"NULL"` with empty strings, in place.
///
/// Data views send every row to the browser; empty strings render as blank
/// cells where `null` would print verbatim.
pub fn blank_nulls(rows: &mut [Row]) {
    for value in rows.iter_mut().flat_map(|row| row.values_mut()) {
        let is_null = match value {
            Value::Null => true,
            Value::String(text) => text == "NULL",
            _ => false,
        };
        if is_null {
            *value = Value::String(String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: &[Value]) -> Vec<Row> {
        values
            .iter()
            .filter_map(|value| value.as_object().cloned())
            .collect()
    }

    const COLUMNS: &[(&str, &str)] = &[("semestres", "Semestre"), ("matriculas", "Matricula")];

    #[test]
    fn skips_missing_null_and_blank_values() {
        let input = rows(&[
            json!({"Semestre": "Segundo", "Matricula": 10}),
            json!({"Semestre": null}),
            json!({"Semestre": "  "}),
            json!({"Matricula": [1, 2]}),
            json!({"Semestre": "Primer", "Matricula": 10}),
        ]);
        let unique = extract_unique(&input, COLUMNS);
        assert_eq!(unique["semestres"], vec!["Primer", "Segundo"]);
        assert_eq!(unique["matriculas"], vec!["10"]);
    }

    #[test]
    fn output_is_independent_of_row_order() {
        let mut input = rows(&[
            json!({"Semestre": "Tercer"}),
            json!({"Semestre": "Primer"}),
            json!({"Semestre": "Segundo"}),
            json!({"Semestre": "Primer"}),
        ]);
        let forward = extract_unique(&input, COLUMNS);
        input.reverse();
        let reversed = extract_unique(&input, COLUMNS);
        input.rotate_left(1);
        let rotated = extract_unique(&input, COLUMNS);
        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);
        assert_eq!(forward["semestres"], vec!["Primer", "Segundo", "Tercer"]);
    }

    #[test]
    fn empty_rows_still_produce_every_key() {
        let unique = extract_unique(&[], COLUMNS);
        assert!(unique["semestres"].is_empty());
        assert!(unique["matriculas"].is_empty());
    }

    #[test]
    fn blank_nulls_rewrites_null_markers_only() {
        let mut input = rows(&[json!({"A": null, "B": "NULL", "C": "null", "D": 0})]);
        blank_nulls(&mut input);
        assert_eq!(
            Value::Object(input.remove(0)),
            json!({"A": "", "B": "", "C": "null", "D": 0})
        );
    }
}
