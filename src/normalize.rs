//! Raw import → canonical records.
//!
//! Both structured (JSON array of objects) and delimited (CSV with a header line)
//! input are first flattened to string cells keyed by column name, then coerced
//! through a single path. All leniency lives here: downstream code only ever sees
//! `Record`s with explicit `None` for anything absent or unparseable.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FormatError;
use crate::types::{Record, SourceFormat};

/// Column name → cell text. A key that is not present is "undefined" in the source.
type RawRow = HashMap<String, String>;

/// Symbols stripped from numeric cells before parsing.
const CURRENCY_SYMBOLS: &[char] = &['€', '$', '£', '¥', '¢', '¤', '₣', '₹', '₽', '₩', '₺', '₿', '₫', '₪'];

/// Parse `input` into a complete replacement collection.
///
/// Fails if the text is not valid for `format` or yields no rows. There is no
/// partial result: one bad document rejects the whole import.
pub fn normalize(input: &str, format: SourceFormat) -> Result<Vec<Record>, FormatError> {
    let rows = match format {
        SourceFormat::Json => read_json(input)?,
        SourceFormat::Csv => read_csv(input)?,
    };
    if rows.is_empty() {
        return Err(FormatError::Empty);
    }

    let records = build_records(rows);
    debug!(rows = records.len(), ?format, "normalized import");
    Ok(records)
}

fn read_json(input: &str) -> Result<Vec<RawRow>, FormatError> {
    let doc: Value = serde_json::from_str(input)?;
    let Value::Array(items) = doc else {
        return Err(FormatError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map
                .into_iter()
                .filter_map(|(k, v)| json_cell(v).map(|cell| (k, cell)))
                .collect::<RawRow>()),
            _ => Err(FormatError::NotAnObject { index }),
        })
        .collect()
}

/// `null` counts as absent; scalars keep their textual form so the numeric pass
/// treats `850000` and `"850 000"` identically.
fn json_cell(v: Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn read_csv(input: &str) -> Result<Vec<RawRow>, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input.trim().as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        // Short rows leave trailing columns undefined; extra cells are ignored.
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn build_records(rows: Vec<RawRow>) -> Vec<Record> {
    let mut taken: HashSet<String> = rows
        .iter()
        .filter_map(|r| r.get("id"))
        .filter(|id| !id.is_empty())
        .cloned()
        .collect();

    rows.into_iter()
        .enumerate()
        .map(|(idx, mut row)| {
            let line = idx + 1;
            let id = match text(&mut row, "id") {
                Some(id) => id,
                None => fallback_id(line, &mut taken),
            };
            Record {
                id,
                client: text(&mut row, "client"),
                entite: text(&mut row, "entite"),
                pays: text(&mut row, "pays"),
                region: text(&mut row, "region"),
                ligne: text(&mut row, "ligne"),
                police_locale: text(&mut row, "policeLocale"),
                assureur: text(&mut row, "assureur"),
                courtier: text(&mut row, "courtier"),
                devise: text(&mut row, "devise"),
                prime: amount(&row, "prime", line),
                limite: amount(&row, "limite", line),
                retention: amount(&row, "retention", line),
                date_effet: text(&mut row, "dateEffet"),
                date_echeance: text(&mut row, "dateEcheance"),
                sinistres_nombre: whole(&row, "sinistresNombre", line),
                sinistres_cout: amount(&row, "sinistresCout", line),
                sinistres_annee: whole(&row, "sinistresAnnee", line),
                severite_max: amount(&row, "severiteMax", line),
                compliance_statut: text(&mut row, "complianceStatut"),
                commentaires: text(&mut row, "commentaires"),
            }
        })
        .collect()
}

/// 1-based ordinal, suffixed when an explicit id in the batch already uses it.
fn fallback_id(ordinal: usize, taken: &mut HashSet<String>) -> String {
    let mut candidate = ordinal.to_string();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{ordinal}-{n}");
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

fn text(row: &mut RawRow, key: &str) -> Option<String> {
    row.remove(key).filter(|s| !s.is_empty())
}

fn amount(row: &RawRow, key: &str, line: usize) -> Option<f64> {
    let raw = row.get(key)?;
    let parsed = parse_amount(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        warn!(field = key, value = %raw, row = line, "numeric cell not parseable, treating as missing");
    }
    parsed
}

fn whole<T: TryFrom<i64>>(row: &RawRow, key: &str, line: usize) -> Option<T> {
    let value = amount(row, key, line)?;
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        warn!(field = key, value, row = line, "expected a whole number, treating as missing");
        return None;
    }
    T::try_from(value as i64).ok()
}

/// Coerce a locale-formatted amount such as `"1 200 000,50 €"` to a number.
///
/// Whitespace (including U+00A0 and U+202F) and currency symbols are removed.
/// When a comma is present it is the decimal separator and dots are grouping;
/// without one, several dots are grouping and a single dot is the decimal point.
/// Returns `None` for blank or unparseable input, never zero.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();
    let canonical = match (commas, dots) {
        (0, 0) | (0, 1) => cleaned,
        (0, _) => cleaned.replace('.', ""),
        (1, _) => cleaned.replace('.', "").replace(',', "."),
        _ => return None,
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Calendar year of an ISO 8601 date or datetime.
pub fn year_of_date(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.year());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.year())
}
