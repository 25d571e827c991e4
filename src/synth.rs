use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, LogNormal, Poisson};

use crate::types::Record;

/// (country, region, local policy prefix, currency)
const COUNTRIES: &[(&str, &str, &str, &str)] = &[
    ("France", "EMEA", "FR", "EUR"),
    ("Allemagne", "EMEA", "DE", "EUR"),
    ("Royaume-Uni", "EMEA", "UK", "GBP"),
    ("Italie", "EMEA", "IT", "EUR"),
    ("Espagne", "EMEA", "ES", "EUR"),
    ("États-Unis", "AMER", "US", "USD"),
    ("Canada", "AMER", "CA", "CAD"),
    ("Brésil", "AMER", "BR", "USD"),
    ("Mexique", "AMER", "MX", "USD"),
    ("Inde", "APAC", "IN", "USD"),
    ("Japon", "APAC", "JP", "JPY"),
    ("Australie", "APAC", "AU", "AUD"),
    ("Singapour", "APAC", "SG", "USD"),
    ("Chine", "APAC", "CN", "USD"),
];

/// (line, policy code, limit multiple of premium)
const LINES: &[(&str, &str, f64)] = &[
    ("PDBI", "PDBI", 120.0),
    ("Cyber", "CYB", 60.0),
    ("General Liability", "GL", 70.0),
];

const INSURERS: &[&str] = &["Allianz", "AIG", "AXA XL", "Chubb", "HDI", "Zurich", "Generali", "Tokio Marine"];
const COMPLIANCE: &[&str] = &["Compliant", "Partiel", "Non"];

/// Deterministic synthetic programme of `rows` records for benchmarks and demos.
///
/// Premiums are log-normal around ~300k; claim counts are Poisson(1.5) with a
/// log-normal cost per claim. Same seed, same portfolio.
pub fn generate_portfolio(rows: usize, seed: u64) -> Vec<Record> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let premium = LogNormal::new(12.6_f64, 0.6).expect("valid LogNormal params");
    let claim_cost = LogNormal::new(12.0_f64, 1.0).expect("valid LogNormal params");
    let claim_count = Poisson::new(1.5_f64).expect("valid Poisson param");

    (1..=rows)
        .map(|i| {
            let &(pays, region, prefix, devise) = COUNTRIES.choose(&mut rng).expect("non-empty");
            let &(ligne, code, limit_multiple) = LINES.choose(&mut rng).expect("non-empty");
            let assureur = *INSURERS.choose(&mut rng).expect("non-empty");
            let compliance = *COMPLIANCE.choose(&mut rng).expect("non-empty");

            let prime = premium.sample(&mut rng).round();
            let nombre = claim_count.sample(&mut rng) as i64;
            let cout: f64 = (0..nombre).map(|_| claim_cost.sample(&mut rng).round()).sum();
            let year = rng.random_range(2021..=2025);
            let month = rng.random_range(1..=12);

            Record {
                id: i.to_string(),
                client: Some("Client Global SA".to_string()),
                entite: Some(format!("{pays} Entity {i}")),
                pays: Some(pays.to_string()),
                region: Some(region.to_string()),
                ligne: Some(ligne.to_string()),
                police_locale: Some(format!("{prefix}-{code}-{i:03}")),
                assureur: Some(assureur.to_string()),
                courtier: Some("SRS".to_string()),
                devise: Some(devise.to_string()),
                prime: Some(prime),
                limite: Some((prime * limit_multiple / 1_000_000.0).round() * 1_000_000.0),
                retention: Some(rng.random_range(1..=10) as f64 * 50_000.0),
                date_effet: Some(format!("{year}-{month:02}-01")),
                date_echeance: Some(format!("{}-{month:02}-01", year + 1)),
                sinistres_nombre: Some(nombre),
                sinistres_cout: Some(cout),
                sinistres_annee: Some(year - 1),
                severite_max: Some(if nombre > 0 { (cout / nombre as f64).round() } else { 0.0 }),
                compliance_statut: Some(compliance.to_string()),
                commentaires: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_portfolio() {
        assert_eq!(generate_portfolio(50, 7), generate_portfolio(50, 7));
        assert_ne!(generate_portfolio(50, 7), generate_portfolio(50, 8));
    }

    #[test]
    fn ids_are_ordinal_and_premiums_positive() {
        let rows = generate_portfolio(20, 42);
        assert_eq!(rows.len(), 20);
        for (i, r) in rows.iter().enumerate() {
            assert_eq!(r.id, (i + 1).to_string());
            assert!(r.prime.is_some_and(|p| p > 0.0));
        }
    }

    #[test]
    fn amounts_are_whole() {
        for r in generate_portfolio(30, 3) {
            assert!(r.prime.is_some_and(|p| p.fract() == 0.0));
            assert!(r.sinistres_cout.is_some_and(|c| c.fract() == 0.0));
        }
    }
}
