use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Record;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Countries kept in the top-N premium series.
    pub top_countries: usize,
    /// Group key used when a categorical field is absent.
    pub fallback_label: String,
    /// Line-of-business choices offered by the line filter.
    pub lignes: Vec<String>,
    pub compliance_statuses: Vec<String>,
    pub default_currency: String,
    pub export_filename: String,
    pub filtered_export_filename: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::canonical()
    }
}

impl DashboardConfig {
    pub fn canonical() -> Self {
        DashboardConfig {
            top_countries: 12,
            fallback_label: "Autres".to_string(),
            lignes: vec!["PDBI".to_string(), "Cyber".to_string(), "General Liability".to_string()],
            compliance_statuses: vec!["Compliant".to_string(), "Partiel".to_string(), "Non".to_string()],
            default_currency: "EUR".to_string(),
            export_filename: "programme.csv".to_string(),
            filtered_export_filename: "programme-filtre.csv".to_string(),
        }
    }

    /// Load from a TOML file; keys left out keep their canonical value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

/// The five-entity programme the dashboard opens on.
pub fn canonical_portfolio() -> Vec<Record> {
    #[allow(clippy::too_many_arguments)]
    fn line(
        id: &str,
        entite: &str,
        pays: &str,
        region: &str,
        ligne: &str,
        police: &str,
        assureur: &str,
        devise: &str,
        amounts: [f64; 3],
        dates: (&str, &str),
        claims: (i64, f64, i32, f64),
        compliance: &str,
        commentaires: &str,
    ) -> Record {
        let [prime, limite, retention] = amounts;
        let (nombre, cout, annee, severite) = claims;
        Record {
            id: id.to_string(),
            client: Some("Client Global SA".to_string()),
            entite: Some(entite.to_string()),
            pays: Some(pays.to_string()),
            region: Some(region.to_string()),
            ligne: Some(ligne.to_string()),
            police_locale: Some(police.to_string()),
            assureur: Some(assureur.to_string()),
            courtier: Some("SRS".to_string()),
            devise: Some(devise.to_string()),
            prime: Some(prime),
            limite: Some(limite),
            retention: Some(retention),
            date_effet: Some(dates.0.to_string()),
            date_echeance: Some(dates.1.to_string()),
            sinistres_nombre: Some(nombre),
            sinistres_cout: Some(cout),
            sinistres_annee: Some(annee),
            severite_max: Some(severite),
            compliance_statut: Some(compliance.to_string()),
            commentaires: Some(commentaires.to_string()),
        }
    }

    vec![
        line(
            "1",
            "France Holdings",
            "France",
            "EMEA",
            "PDBI",
            "FR-PDBI-001",
            "Allianz",
            "EUR",
            [850_000.0, 100_000_000.0, 250_000.0],
            ("2025-01-01", "2025-12-31"),
            (2, 1_200_000.0, 2024, 900_000.0),
            "Compliant",
            "Risque industriel – chimie",
        ),
        line(
            "2",
            "US Manufacturing LLC",
            "États-Unis",
            "AMER",
            "Cyber",
            "US-CYB-010",
            "AIG",
            "USD",
            [420_000.0, 50_000_000.0, 500_000.0],
            ("2025-04-01", "2026-03-31"),
            (3, 2_800_000.0, 2023, 1_500_000.0),
            "Partiel",
            "SOC2 partiel – MFA en cours",
        ),
        line(
            "3",
            "Brazil Agro Ltda",
            "Brésil",
            "AMER",
            "General Liability",
            "BR-GL-022",
            "AXA XL",
            "USD",
            [310_000.0, 20_000_000.0, 200_000.0],
            ("2025-02-01", "2026-01-31"),
            (1, 400_000.0, 2024, 400_000.0),
            "Compliant",
            "Extension produits export",
        ),
        line(
            "4",
            "India Tech Pvt",
            "Inde",
            "APAC",
            "Cyber",
            "IN-CYB-005",
            "Chubb",
            "USD",
            [180_000.0, 15_000_000.0, 300_000.0],
            ("2025-06-01", "2026-05-31"),
            (0, 0.0, 2024, 0.0),
            "Compliant",
            "Couverture ransom négociée",
        ),
        line(
            "5",
            "Germany Logistics GmbH",
            "Allemagne",
            "EMEA",
            "PDBI",
            "DE-PDBI-031",
            "HDI",
            "EUR",
            [260_000.0, 40_000_000.0, 150_000.0],
            ("2025-03-01", "2026-02-28"),
            (4, 950_000.0, 2022, 500_000.0),
            "Non",
            "Écart wording BI",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_portfolio_has_unique_ids() {
        let rows = canonical_portfolio();
        let mut ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rows.len());
    }

    #[test]
    fn canonical_portfolio_fields() {
        let rows = canonical_portfolio();
        let india = &rows[3];
        assert_eq!(india.pays.as_deref(), Some("Inde"));
        assert_eq!(india.assureur.as_deref(), Some("Chubb"));
        assert_eq!(india.prime, Some(180_000.0));
        assert_eq!(india.limite, Some(15_000_000.0));
        assert_eq!(india.sinistres_nombre, Some(0));
        assert_eq!(india.date_echeance.as_deref(), Some("2026-05-31"));
        assert_eq!(rows[4].compliance_statut.as_deref(), Some("Non"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: DashboardConfig = toml::from_str("top_countries = 3\n").expect("toml");
        assert_eq!(cfg.top_countries, 3);
        assert_eq!(cfg.fallback_label, "Autres");
        assert_eq!(cfg.lignes.len(), 3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DashboardConfig::load(Path::new("/nonexistent/progdash.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/progdash.toml"));
    }
}
