//! Run summary
//!
//! Row counts per stage and per source rank. Consumers validate coverage
//! against it; it is logged, appended to `run_summary` and optionally
//! written as JSON.

use chrono::{DateTime, Utc};
use ffgeo_common::model::{Criterion, FirstFilingType, SourceRank, Variant};
use ffgeo_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Output coverage of one (variant, criterion) resolver run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub variant: Variant,
    pub criterion: Criterion,
    /// First filings resolved, keyed by source rank (1-7)
    pub by_source: BTreeMap<u8, usize>,
    /// First filings without any value
    pub unresolved: usize,
    /// Output rows written (country rows are per person)
    pub rows: usize,
}

impl Coverage {
    pub fn new(variant: Variant, criterion: Criterion) -> Self {
        Self {
            variant,
            criterion,
            by_source: BTreeMap::new(),
            unresolved: 0,
            rows: 0,
        }
    }

    pub fn record(&mut self, source: SourceRank) {
        *self.by_source.entry(source.as_u8()).or_insert(0) += 1;
    }

    pub fn resolved(&self) -> usize {
        self.by_source.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub filings: usize,
    /// Relationship edges ignored because an end is unknown or both ends are equal
    pub dropped_edges: usize,
    pub first_filings_by_type: BTreeMap<FirstFilingType, usize>,
    pub bridge_rows: usize,
    pub coverage: Vec<Coverage>,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            filings: 0,
            dropped_edges: 0,
            first_filings_by_type: BTreeMap::new(),
            bridge_rows: 0,
            coverage: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn first_filings(&self) -> usize {
        self.first_filings_by_type.values().sum()
    }

    pub fn coverage_for(&self, variant: Variant, criterion: Criterion) -> Option<&Coverage> {
        self.coverage
            .iter()
            .find(|c| c.variant == variant && c.criterion == criterion)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        info!("Run summary written to {}", path.display());
        Ok(())
    }

    pub fn log(&self) {
        info!(
            "Run {}: {} filings, {} first filings, {} bridge rows",
            self.run_id,
            self.filings,
            self.first_filings(),
            self.bridge_rows
        );
        for (ty, n) in &self.first_filings_by_type {
            info!("  {:<12} {}", ty.as_str(), n);
        }
        for c in &self.coverage {
            info!(
                "  {}/{}: {} resolved {:?}, {} unresolved, {} rows",
                c.variant.as_str(),
                c.criterion.as_str(),
                c.resolved(),
                c.by_source,
                c.unresolved,
                c.rows
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_counts() {
        let mut c = Coverage::new(Variant::Geo, Criterion::Inventor);
        c.record(SourceRank::OwnPrimary);
        c.record(SourceRank::OwnPrimary);
        c.record(SourceRank::EquivalentSecondary);

        assert_eq!(c.resolved(), 3);
        assert_eq!(c.by_source.get(&1), Some(&2));
        assert_eq!(c.by_source.get(&5), Some(&1));
    }

    #[test]
    fn test_summary_json() {
        let mut summary = RunSummary::start();
        summary.filings = 3;
        summary.first_filings_by_type.insert(FirstFilingType::Priority, 1);
        summary.first_filings_by_type.insert(FirstFilingType::Single, 1);
        summary.coverage.push(Coverage::new(Variant::Country, Criterion::Applicant));
        summary.finish();

        let json = summary.to_json().unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
        assert_eq!(parsed.first_filings(), 2);
        assert!(json.contains("\"PRIORITY\""));
        assert!(parsed.coverage_for(Variant::Country, Criterion::Applicant).is_some());
        assert!(parsed.coverage_for(Variant::Geo, Criterion::Applicant).is_none());
    }
}
