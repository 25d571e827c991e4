use serde::{Deserialize, Serialize};

use crate::types::Record;

/// Sentinel accepted from UI controls meaning "no restriction".
pub const ALL: &str = "all";

/// A categorical criterion: either everything passes or only one value does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Facet {
    #[default]
    All,
    Is(String),
}

impl From<&str> for Facet {
    fn from(s: &str) -> Self {
        if s == ALL { Facet::All } else { Facet::Is(s.to_string()) }
    }
}

impl From<String> for Facet {
    fn from(s: String) -> Self {
        if s == ALL { Facet::All } else { Facet::Is(s) }
    }
}

impl From<Facet> for String {
    fn from(f: Facet) -> Self {
        match f {
            Facet::All => ALL.to_string(),
            Facet::Is(s) => s,
        }
    }
}

impl Facet {
    fn matches_exact(&self, field: Option<&str>) -> bool {
        match self {
            Facet::All => true,
            Facet::Is(want) => field == Some(want.as_str()),
        }
    }

    fn matches_ignore_case(&self, field: Option<&str>) -> bool {
        match self {
            Facet::All => true,
            Facet::Is(want) => field.is_some_and(|f| f.to_lowercase() == want.to_lowercase()),
        }
    }
}

/// The four filter controls of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub text: String,
    pub region: Facet,
    pub ligne: Facet,
    pub compliance: Facet,
}

impl Criteria {
    /// Criteria that let every record through.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, r: &Record) -> bool {
        self.text_hit(r)
            && self.region.matches_exact(r.region.as_deref())
            && self.ligne.matches_exact(r.ligne.as_deref())
            && self.compliance.matches_ignore_case(r.compliance_statut.as_deref())
    }

    fn text_hit(&self, r: &Record) -> bool {
        let q = self.text.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        [&r.entite, &r.pays, &r.assureur, &r.police_locale, &r.ligne, &r.courtier]
            .into_iter()
            .flatten()
            .any(|v| v.to_lowercase().contains(&q))
    }
}

/// Records passing every criterion, in their original relative order.
pub fn filter(records: &[Record], criteria: &Criteria) -> Vec<Record> {
    records.iter().filter(|r| criteria.matches(r)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::canonical_portfolio;

    fn ids(rows: &[Record]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_all_pass_is_identity() {
        let rows = canonical_portfolio();
        assert_eq!(filter(&rows, &Criteria::all()), rows);
    }

    #[test]
    fn test_region_exact_match() {
        let rows = canonical_portfolio();
        let c = Criteria { region: "EMEA".into(), ..Criteria::all() };
        assert_eq!(ids(&filter(&rows, &c)), vec!["1", "5"]);

        // Region is case-sensitive.
        let c = Criteria { region: "emea".into(), ..Criteria::all() };
        assert!(filter(&rows, &c).is_empty());
    }

    #[test]
    fn test_compliance_ignores_case() {
        let rows = canonical_portfolio();
        let c = Criteria { compliance: "partiel".into(), ..Criteria::all() };
        assert_eq!(ids(&filter(&rows, &c)), vec!["2"]);
    }

    #[test]
    fn test_text_searches_several_fields() {
        let rows = canonical_portfolio();
        let by_insurer = Criteria { text: "  allianz ".into(), ..Criteria::all() };
        assert_eq!(ids(&filter(&rows, &by_insurer)), vec!["1"]);

        let by_policy = Criteria { text: "cyb-0".into(), ..Criteria::all() };
        assert_eq!(ids(&filter(&rows, &by_policy)), vec!["2", "4"]);

        // `commentaires` is not searched.
        let by_comment = Criteria { text: "ransom".into(), ..Criteria::all() };
        assert!(filter(&rows, &by_comment).is_empty());
    }

    #[test]
    fn test_missing_fields_never_match() {
        let rows = vec![Record { id: "x".into(), ..Record::default() }];
        let text = Criteria { text: "a".into(), ..Criteria::all() };
        let comp = Criteria { compliance: "Non".into(), ..Criteria::all() };
        assert!(filter(&rows, &text).is_empty());
        assert!(filter(&rows, &comp).is_empty());
        assert_eq!(filter(&rows, &Criteria::all()).len(), 1);
    }

    #[test]
    fn test_criteria_are_anded() {
        let rows = canonical_portfolio();
        let c = Criteria {
            region: "AMER".into(),
            ligne: "Cyber".into(),
            ..Criteria::all()
        };
        assert_eq!(ids(&filter(&rows, &c)), vec!["2"]);
    }

    #[test]
    fn test_facet_serde_uses_all_sentinel() {
        let c: Criteria = serde_json::from_str(r#"{"region":"all","ligne":"PDBI"}"#).expect("criteria");
        assert_eq!(c.region, Facet::All);
        assert_eq!(c.ligne, Facet::Is("PDBI".into()));
        assert_eq!(c.text, "");
    }
}
