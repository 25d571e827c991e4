use std::path::Path;

use serde::{Deserialize, Serialize};

/// One insurance programme line for one legal entity.
///
/// Numeric fields are `None` when the source cell was absent or could not be
/// coerced; aggregation treats `None` as zero, normalization never does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub client: Option<String>,
    pub entite: Option<String>,
    pub pays: Option<String>,
    pub region: Option<String>,
    pub ligne: Option<String>,
    pub police_locale: Option<String>,
    pub assureur: Option<String>,
    pub courtier: Option<String>,
    pub devise: Option<String>,
    pub prime: Option<f64>,
    pub limite: Option<f64>,
    pub retention: Option<f64>,
    /// ISO 8601 date; not validated against `date_echeance`.
    pub date_effet: Option<String>,
    pub date_echeance: Option<String>,
    pub sinistres_nombre: Option<i64>,
    pub sinistres_cout: Option<f64>,
    pub sinistres_annee: Option<i32>,
    pub severite_max: Option<f64>,
    pub compliance_statut: Option<String>,
    pub commentaires: Option<String>,
}

impl Record {
    pub fn prime_or_zero(&self) -> f64 {
        self.prime.unwrap_or(0.0)
    }

    pub fn limite_or_zero(&self) -> f64 {
        self.limite.unwrap_or(0.0)
    }

    pub fn retention_or_zero(&self) -> f64 {
        self.retention.unwrap_or(0.0)
    }

    pub fn sinistres_cout_or_zero(&self) -> f64 {
        self.sinistres_cout.unwrap_or(0.0)
    }

    pub fn sinistres_nombre_or_zero(&self) -> i64 {
        self.sinistres_nombre.unwrap_or(0)
    }
}

/// Stage of a node in the region → line → insurer flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stage {
    Region,
    Line,
    Insurer,
}

impl Stage {
    /// Human-readable prefix applied to node labels once indices are fixed.
    pub fn display_prefix(self) -> &'static str {
        match self {
            Stage::Region => "Région: ",
            Stage::Line => "Ligne: ",
            Stage::Insurer => "Assureur: ",
        }
    }
}

/// Format hint accompanying raw import bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// `.json` (any case) is structured; every other name is read as delimited text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Csv,
        }
    }
}
