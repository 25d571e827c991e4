use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::Serialize;

use crate::normalize::year_of_date;
use crate::types::Record;

/// Portfolio-wide sums over the filtered records. Missing amounts count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiTotals {
    pub total_prime: f64,
    pub total_limite: f64,
    pub total_retention: f64,
    pub total_sinistres: f64,
}

impl KpiTotals {
    /// Claims cost / premium. Zero if no premium.
    pub fn loss_ratio(&self) -> f64 {
        if self.total_prime == 0.0 { 0.0 } else { self.total_sinistres / self.total_prime }
    }
}

/// Premium, claims and retentions for one line of business.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineBreakdown {
    pub name: String,
    #[serde(rename = "Prime")]
    pub prime: f64,
    #[serde(rename = "Sinistres")]
    pub sinistres: f64,
    #[serde(rename = "Retentions")]
    pub retentions: f64,
}

impl LineBreakdown {
    fn zero(name: String) -> Self {
        Self { name, prime: 0.0, sinistres: 0.0, retentions: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryBreakdown {
    pub name: String,
    #[serde(rename = "Prime")]
    pub prime: f64,
    #[serde(rename = "Sinistres")]
    pub sinistres: f64,
}

impl CountryBreakdown {
    fn zero(name: String) -> Self {
        Self { name, prime: 0.0, sinistres: 0.0 }
    }
}

/// Claims severity (cost) and frequency (count) for one claims year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBreakdown {
    pub annee: i32,
    #[serde(rename = "Sinistres")]
    pub sinistres: f64,
    #[serde(rename = "Frequence")]
    pub frequence: i64,
}

impl YearBreakdown {
    fn zero(annee: i32) -> Self {
        Self { annee, sinistres: 0.0, frequence: 0 }
    }
}

/// Limit against premium for one risk type (line of business).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub risque: String,
    #[serde(rename = "Limite")]
    pub limite: f64,
    #[serde(rename = "Prime")]
    pub prime: f64,
}

impl RadarPoint {
    fn zero(risque: String) -> Self {
        Self { risque, limite: 0.0, prime: 0.0 }
    }
}

/// Groups kept in the order their key was first seen, with an index table from
/// key to slot.
pub(crate) struct FirstSeen<K, G> {
    index: HashMap<K, usize>,
    groups: Vec<G>,
}

impl<K: Hash + Eq + Clone, G> FirstSeen<K, G> {
    pub(crate) fn new() -> Self {
        Self { index: HashMap::new(), groups: Vec::new() }
    }

    /// Slot for `key`, created with `make` on first sight. Returns `(index, group)`.
    pub(crate) fn entry(&mut self, key: &K, make: impl FnOnce() -> G) -> (usize, &mut G) {
        let idx = match self.index.get(key) {
            Some(&i) => i,
            None => {
                let i = self.groups.len();
                self.groups.push(make());
                self.index.insert(key.clone(), i);
                i
            }
        };
        (idx, &mut self.groups[idx])
    }

    pub(crate) fn into_vec(self) -> Vec<G> {
        self.groups
    }
}

fn label_or(field: &Option<String>, fallback: &str) -> String {
    field.clone().unwrap_or_else(|| fallback.to_string())
}

pub fn kpis(rows: &[Record]) -> KpiTotals {
    rows.iter().fold(KpiTotals::default(), |mut k, r| {
        k.total_prime += r.prime_or_zero();
        k.total_limite += r.limite_or_zero();
        k.total_retention += r.retention_or_zero();
        k.total_sinistres += r.sinistres_cout_or_zero();
        k
    })
}

/// One entry per line of business, in first-seen order.
pub fn by_line(rows: &[Record], fallback: &str) -> Vec<LineBreakdown> {
    let mut groups = FirstSeen::new();
    for r in rows {
        let key = label_or(&r.ligne, fallback);
        let (_, g) = groups.entry(&key, || LineBreakdown::zero(key.clone()));
        g.prime += r.prime_or_zero();
        g.sinistres += r.sinistres_cout_or_zero();
        g.retentions += r.retention_or_zero();
    }
    groups.into_vec()
}

/// The `n` countries with the highest premium, descending.
///
/// Countries with equal premium keep their first-seen order.
pub fn top_countries(rows: &[Record], fallback: &str, n: usize) -> Vec<CountryBreakdown> {
    let mut groups = FirstSeen::new();
    for r in rows {
        let key = label_or(&r.pays, fallback);
        let (_, g) = groups.entry(&key, || CountryBreakdown::zero(key.clone()));
        g.prime += r.prime_or_zero();
        g.sinistres += r.sinistres_cout_or_zero();
    }
    let mut out = groups.into_vec();
    // `sort_by` is stable, which gives the tie-break above.
    out.sort_by(|a, b| b.prime.partial_cmp(&a.prime).unwrap_or(std::cmp::Ordering::Equal));
    out.truncate(n);
    out
}

/// Claims year of a record: `sinistres_annee`, else the year of `date_effet`.
///
/// A zero claims year is treated as unset.
pub fn claims_year(r: &Record) -> Option<i32> {
    r.sinistres_annee
        .filter(|&y| y != 0)
        .or_else(|| r.date_effet.as_deref().and_then(year_of_date))
}

/// Severity and frequency per claims year, ascending. Records with no
/// resolvable year are left out.
pub fn by_year(rows: &[Record]) -> Vec<YearBreakdown> {
    let mut stats: BTreeMap<i32, YearBreakdown> = BTreeMap::new();
    for r in rows {
        let Some(year) = claims_year(r) else {
            continue;
        };
        let s = stats.entry(year).or_insert_with(|| YearBreakdown::zero(year));
        s.sinistres += r.sinistres_cout_or_zero();
        s.frequence = s.frequence.saturating_add(r.sinistres_nombre_or_zero());
    }
    stats.into_values().collect()
}

pub fn risk_radar(rows: &[Record], fallback: &str) -> Vec<RadarPoint> {
    let mut groups = FirstSeen::new();
    for r in rows {
        let key = label_or(&r.ligne, fallback);
        let (_, g) = groups.entry(&key, || RadarPoint::zero(key.clone()));
        g.limite += r.limite_or_zero();
        g.prime += r.prime_or_zero();
    }
    groups.into_vec()
}

/// Number of distinct values of `field` among `rows`, absent values counted once.
pub fn distinct_count(rows: &[Record], field: impl Fn(&Record) -> Option<&str>) -> usize {
    let mut seen = std::collections::HashSet::new();
    for r in rows {
        seen.insert(field(r));
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::canonical_portfolio;
    use crate::filter::{Criteria, filter};

    fn rec(id: &str) -> Record {
        Record { id: id.to_string(), ..Record::default() }
    }

    #[test]
    fn test_emea_kpis() {
        let rows = canonical_portfolio();
        let c = Criteria { region: "EMEA".into(), ..Criteria::all() };
        let k = kpis(&filter(&rows, &c));
        assert_eq!(k.total_prime, 1_110_000.0);
        assert_eq!(k.total_limite, 140_000_000.0);
        assert_eq!(k.total_retention, 400_000.0);
        assert_eq!(k.total_sinistres, 2_150_000.0);
    }

    #[test]
    fn test_empty_rows_give_zero_and_empty_series() {
        assert_eq!(kpis(&[]), KpiTotals::default());
        assert!(by_line(&[], "Autres").is_empty());
        assert!(top_countries(&[], "Autres", 12).is_empty());
        assert!(by_year(&[]).is_empty());
        assert!(risk_radar(&[], "Autres").is_empty());
        assert_eq!(KpiTotals::default().loss_ratio(), 0.0);
    }

    #[test]
    fn test_by_line_first_seen_order_and_fallback() {
        let rows = canonical_portfolio();
        let names: Vec<String> = by_line(&rows, "Autres").into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["PDBI", "Cyber", "General Liability"]);

        let mut odd = rec("9");
        odd.prime = Some(5.0);
        let groups = by_line(&[odd], "Autres");
        assert_eq!(groups, vec![LineBreakdown { name: "Autres".into(), prime: 5.0, sinistres: 0.0, retentions: 0.0 }]);
    }

    #[test]
    fn test_by_line_sums_match_kpis() {
        let rows = canonical_portfolio();
        let total: f64 = by_line(&rows, "Autres").iter().map(|g| g.prime).sum();
        assert_eq!(total, kpis(&rows).total_prime);
        let pdbi = &by_line(&rows, "Autres")[0];
        assert_eq!(pdbi.prime, 1_110_000.0);
        assert_eq!(pdbi.retentions, 400_000.0);
    }

    #[test]
    fn test_top_countries_sorted_truncated_and_stable() {
        let mut rows = Vec::new();
        for i in 0..13 {
            let mut r = rec(&i.to_string());
            r.pays = Some(format!("P{i}"));
            r.prime = Some(if i < 3 { 10.0 } else { i as f64 * 100.0 });
            rows.push(r);
        }
        let top = top_countries(&rows, "Autres", 12);
        assert_eq!(top.len(), 12);
        assert!(top.windows(2).all(|w| w[0].prime >= w[1].prime));
        assert_eq!(top[0].name, "P12");
        // P0..P2 tie at 10; the cut keeps the two seen first.
        assert_eq!(top[10].name, "P0");
        assert_eq!(top[11].name, "P1");
    }

    #[test]
    fn test_by_year_uses_claims_year_then_effective_date() {
        let mut a = rec("a");
        a.sinistres_annee = Some(2024);
        a.sinistres_cout = Some(100.0);
        a.sinistres_nombre = Some(1);
        let mut b = rec("b");
        b.date_effet = Some("2022-05-01".into());
        b.sinistres_cout = Some(50.0);
        let mut c = rec("c");
        c.sinistres_cout = Some(999.0);
        let mut d = rec("d");
        d.sinistres_annee = Some(2024);
        d.sinistres_nombre = Some(2);

        let years = by_year(&[a, b, c, d]);
        assert_eq!(
            years,
            vec![
                YearBreakdown { annee: 2022, sinistres: 50.0, frequence: 0 },
                YearBreakdown { annee: 2024, sinistres: 100.0, frequence: 3 },
            ]
        );
    }

    #[test]
    fn test_by_year_frequency_saturates() {
        let mut a = rec("a");
        a.sinistres_annee = Some(2024);
        a.sinistres_nombre = Some(9_000_000_000_000_000_000);
        let mut b = a.clone();
        b.id = "b".into();

        let years = by_year(&[a, b]);
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].frequence, i64::MAX);
    }

    #[test]
    fn test_canonical_years_ascending() {
        let years: Vec<i32> = by_year(&canonical_portfolio()).into_iter().map(|y| y.annee).collect();
        assert_eq!(years, vec![2022, 2023, 2024]);
    }

    #[test]
    fn test_radar_groups_by_line() {
        let radar = risk_radar(&canonical_portfolio(), "Autres");
        let cyber = radar.iter().find(|p| p.risque == "Cyber").expect("cyber present");
        assert_eq!(cyber.limite, 65_000_000.0);
        assert_eq!(cyber.prime, 600_000.0);
    }

    #[test]
    fn test_distinct_count() {
        let rows = canonical_portfolio();
        assert_eq!(distinct_count(&rows, |r| r.pays.as_deref()), 5);
        assert_eq!(distinct_count(&rows, |r| r.region.as_deref()), 3);
    }

    #[test]
    fn test_loss_ratio() {
        let k = KpiTotals { total_prime: 200.0, total_sinistres: 50.0, ..KpiTotals::default() };
        assert!((k.loss_ratio() - 0.25).abs() < 1e-12);
    }
}
