//! Output normalization: storage values to JSON.
//!
//! Every row leaving the service goes through [`normalize_row`], so NUMERIC
//! money columns always serialize as JSON numbers rather than fixed-point
//! strings.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value};

use crate::models::{Record, Row, SqlValue};

/// Label for document type codes outside the known table.
pub const OTHER_DOCUMENT_TYPE: &str = "Outro";

/// Field defaults applied when storage holds NULL.
const STRING_DEFAULTS: [(&str, &str); 3] = [
    ("num_ressarcimento", ""),
    ("lote", "0"),
    ("parcela", "0"),
];

pub fn to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(v) => Value::Bool(v),
        SqlValue::Int(v) => Value::Number(v.into()),
        SqlValue::Float(v) => float_to_json(v),
        SqlValue::Decimal(v) => v.to_f64().map(float_to_json).unwrap_or(Value::Null),
        other => other.to_text().map(Value::String).unwrap_or(Value::Null),
    }
}

fn float_to_json(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Numeric view of a value, for totals.
pub fn to_f64(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Int(v) => Some(*v as f64),
        SqlValue::Float(v) => Some(*v),
        SqlValue::Decimal(v) => v.to_f64(),
        SqlValue::Text(v) => v.trim().parse().ok(),
        _ => None,
    }
}

pub fn normalize_row(row: Row) -> Record {
    row.into_iter()
        .map(|(name, value)| (name, to_json(value)))
        .collect()
}

pub fn document_type_label(code: &str) -> &'static str {
    match code.trim() {
        "0" => "Nota Fiscal",
        "1" => "Recibo",
        "2" => "Despesa no Exterior",
        "4" => "Nota Fiscal Eletrônica",
        _ => OTHER_DOCUMENT_TYPE,
    }
}

/// Expense-specific shaping on top of [`normalize_row`]: translate the
/// document type code and fill string defaults.
pub fn shape_expense(mut record: Record) -> Record {
    if let Some(field) = record.get_mut("tipo_documento") {
        let code = match field {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        };
        if let Some(code) = code {
            *field = Value::String(document_type_label(&code).to_string());
        }
    }

    for (name, default) in STRING_DEFAULTS {
        if let Some(field) = record.get_mut(name) {
            let replacement = match field {
                Value::Null => Some(default.to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            };
            if let Some(text) = replacement {
                *field = Value::String(text);
            }
        }
    }

    record
}
