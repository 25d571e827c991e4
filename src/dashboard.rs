//! Explicit pipeline state: the active collection, the filter criteria, and the
//! view model derived from both.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{
    self, CountryBreakdown, KpiTotals, LineBreakdown, RadarPoint, YearBreakdown,
};
use crate::config::{DashboardConfig, canonical_portfolio};
use crate::error::{ExportError, FormatError};
use crate::export::{ExportDocument, export_document};
use crate::filter::{Criteria, filter};
use crate::flow::{FlowGraph, build_flow_graph};
use crate::normalize::normalize;
use crate::types::{Record, SourceFormat};

/// Choices offered by the filter controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub lignes: Vec<String>,
    pub compliance: Vec<String>,
}

/// Everything the rendering layer needs, recomputed from scratch on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub filtered: Vec<Record>,
    pub kpis: KpiTotals,
    pub by_line: Vec<LineBreakdown>,
    pub by_country: Vec<CountryBreakdown>,
    pub by_year: Vec<YearBreakdown>,
    pub radar: Vec<RadarPoint>,
    pub flow: FlowGraph,
    pub country_count: usize,
    pub entity_count: usize,
    pub options: FilterOptions,
}

pub struct Dashboard {
    records: Vec<Record>,
    criteria: Criteria,
    config: DashboardConfig,
}

impl Dashboard {
    /// Starts on the canonical portfolio with all-pass criteria.
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_records(canonical_portfolio(), config)
    }

    pub fn with_records(records: Vec<Record>, config: DashboardConfig) -> Self {
        Self { records, criteria: Criteria::all(), config }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Replace the whole collection with the parsed `input`.
    ///
    /// On error the current collection is kept unchanged. Returns the new row count.
    pub fn import(&mut self, input: &str, format: SourceFormat) -> Result<usize, FormatError> {
        match normalize(input, format) {
            Ok(records) => {
                info!(previous = self.records.len(), rows = records.len(), "collection replaced");
                self.records = records;
                Ok(self.records.len())
            }
            Err(e) => {
                warn!(error = %e, "import rejected, keeping current collection");
                Err(e)
            }
        }
    }

    pub fn set_criteria(&mut self, criteria: Criteria) {
        self.criteria = criteria;
    }

    pub fn reset_filters(&mut self) {
        self.criteria = Criteria::all();
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn filtered(&self) -> Vec<Record> {
        filter(&self.records, &self.criteria)
    }

    /// Distinct non-empty regions of the whole collection, first-seen order.
    pub fn region_options(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter_map(|r| r.region.as_deref())
            .filter(|region| seen.insert(*region))
            .map(str::to_string)
            .collect()
    }

    pub fn options(&self) -> FilterOptions {
        FilterOptions {
            regions: self.region_options(),
            lignes: self.config.lignes.clone(),
            compliance: self.config.compliance_statuses.clone(),
        }
    }

    pub fn view(&self) -> DashboardView {
        let filtered = self.filtered();
        let fallback = self.config.fallback_label.as_str();
        DashboardView {
            kpis: analysis::kpis(&filtered),
            by_line: analysis::by_line(&filtered, fallback),
            by_country: analysis::top_countries(&filtered, fallback, self.config.top_countries),
            by_year: analysis::by_year(&filtered),
            radar: analysis::risk_radar(&filtered, fallback),
            flow: build_flow_graph(&filtered, fallback),
            country_count: analysis::distinct_count(&filtered, |r| r.pays.as_deref()),
            entity_count: analysis::distinct_count(&filtered, |r| r.entite.as_deref()),
            options: self.options(),
            filtered,
        }
    }

    /// Any collection as a CSV download, saved as `export_filename` unless named.
    pub fn export<T: Serialize>(
        &self,
        rows: &[T],
        filename: Option<&str>,
    ) -> Result<ExportDocument, ExportError> {
        export_document(rows, filename.unwrap_or(self.config.export_filename.as_str()))
    }

    /// The filtered rows as a CSV download; `filename` defaults to the configured one.
    pub fn export_filtered(&self, filename: Option<&str>) -> Result<ExportDocument, ExportError> {
        let name = filename.unwrap_or(self.config.filtered_export_filename.as_str());
        export_document(&self.filtered(), name)
    }
}
