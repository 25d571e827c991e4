use serde::Serialize;
use serde_json::Value;

use crate::error::ExportError;

/// A CSV body ready for download, with the name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub content: String,
}

/// Serialize `rows` to CSV with every field quoted.
///
/// Columns are the keys of the first row, in order. Later rows are projected onto
/// those columns: keys they lack become empty cells and extra keys are dropped.
/// `null` values become empty cells.
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<String, ExportError> {
    let first = rows.first().ok_or(ExportError::Empty)?;
    let columns: Vec<String> = match serde_json::to_value(first)? {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => return Err(ExportError::NotAnObject),
    };

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&columns)?;

    for row in rows {
        let Value::Object(map) = serde_json::to_value(row)? else {
            return Err(ExportError::NotAnObject);
        };
        let cells = columns.iter().map(|k| map.get(k).map(cell).unwrap_or_default());
        writer.write_record(cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| ExportError::Utf8)
}

/// Like [`to_csv`], paired with `filename`.
pub fn export_document<T: Serialize>(rows: &[T], filename: &str) -> Result<ExportDocument, ExportError> {
    Ok(ExportDocument { filename: filename.to_string(), content: to_csv(rows)? })
}

fn cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // Whole amounts are written without a trailing ".0".
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
