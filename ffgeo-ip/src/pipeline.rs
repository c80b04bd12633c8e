//! Pipeline Orchestrator
//!
//! # Stages
//! - **Load**: schema check, then every input table into one snapshot
//! - **Classify**: tag first filings (`resolver`)
//! - **Pool**: donor pools per first filing (`pool`)
//! - **Impute**: one resolver run per selected (variant, criterion)
//! - **Bridge**: first filing / filing bridge rows
//! - **Write**: rebuild output tables and append the run log, in one transaction
//!
//! Every stage is a pure function of the previous stage's output; only
//! load and write touch the store. A failed run leaves the previous
//! outputs in place.
//!
//! # Example
//! ```rust,ignore
//! let options = PipelineOptions::from_config(&config);
//! let output = run_on_store(&pool, &options).await?;
//! output.summary.log();
//! ```

use crate::bridge::build_bridge;
use crate::corpus::Corpus;
use crate::db::{self, outputs};
use crate::impute::{country, geo, AttributeResolver, CountryDonors, GeoDonors};
use crate::pool::CandidatePool;
use crate::resolver::{classify, Classification};
use crate::summary::{Coverage, RunSummary};
use ffgeo_common::config::{StudyConfig, TomlConfig};
use ffgeo_common::db::{check_input_schema, recreate_output_tables};
use ffgeo_common::model::{BridgeRow, Criterion, ImputedCountry, ImputedGeo, Variant};
use ffgeo_common::Result;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use tracing::info;

/// What a run computes
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub study: StudyConfig,
    pub criteria: BTreeSet<Criterion>,
    pub variants: BTreeSet<Variant>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            study: config.study.clone(),
            criteria: config.run.criteria.iter().copied().collect(),
            variants: config.run.variants.iter().copied().collect(),
        }
    }
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub classification: Classification,
    pub bridge: Vec<BridgeRow>,
    pub geo: Vec<ImputedGeo>,
    pub country: Vec<ImputedCountry>,
    pub summary: RunSummary,
}

/// Run every in-memory stage over an indexed corpus
pub fn run_pipeline(corpus: &Corpus, options: &PipelineOptions) -> PipelineOutput {
    run_stages(corpus, options, RunSummary::start())
}

fn run_stages(corpus: &Corpus, options: &PipelineOptions, mut summary: RunSummary) -> PipelineOutput {
    summary.filings = corpus.filing_count();
    summary.dropped_edges = corpus.dropped_edges();

    info!("=== Classifying first filings ===");
    let classification = classify(corpus, &options.study);
    summary.first_filings_by_type = classification.count_by_type();

    info!("=== Building candidate pools ===");
    let pool = CandidatePool::build(corpus, &classification, &options.study);

    info!("=== Imputing attributes ===");
    let resolver = AttributeResolver::new(corpus, &classification, &pool);
    let mut geo_records = Vec::new();
    let mut country_records = Vec::new();

    for variant in &options.variants {
        for criterion in &options.criteria {
            let mut coverage = Coverage::new(*variant, *criterion);
            match variant {
                Variant::Geo => {
                    let run = resolver.resolve_all(&GeoDonors::new(corpus), *criterion);
                    run.resolved.iter().for_each(|r| coverage.record(r.source));
                    coverage.unresolved = run.unresolved;
                    let records = geo::to_records(*criterion, run.resolved);
                    coverage.rows = records.len();
                    geo_records.extend(records);
                }
                Variant::Country => {
                    let donors = CountryDonors::new(corpus, &options.study);
                    let run = resolver.resolve_all(&donors, *criterion);
                    run.resolved.iter().for_each(|r| coverage.record(r.source));
                    coverage.unresolved = run.unresolved;
                    let records = country::to_records(*criterion, run.resolved);
                    coverage.rows = records.len();
                    country_records.extend(records);
                }
            }
            info!(
                "  {}/{}: {} resolved, {} unresolved",
                variant.as_str(),
                criterion.as_str(),
                coverage.resolved(),
                coverage.unresolved
            );
            summary.coverage.push(coverage);
        }
    }

    info!("=== Building bridge table ===");
    let bridge = build_bridge(corpus, &classification, &pool);
    summary.bridge_rows = bridge.len();

    PipelineOutput {
        classification,
        bridge,
        geo: geo_records,
        country: country_records,
        summary,
    }
}

/// Full run against the store: check, load, compute, rebuild outputs
pub async fn run_on_store(pool: &SqlitePool, options: &PipelineOptions) -> Result<PipelineOutput> {
    let summary = RunSummary::start();
    info!("Starting run {}", summary.run_id);

    check_input_schema(pool).await?;
    let snapshot = db::load_snapshot(pool).await?;
    let corpus = Corpus::build(snapshot);

    let mut output = run_stages(&corpus, options, summary);

    info!("=== Writing output tables ===");
    let mut tx = pool.begin().await?;
    recreate_output_tables(&mut tx).await?;
    outputs::write_first_filings(&mut tx, &output.classification).await?;
    outputs::write_bridge(&mut tx, &output.bridge).await?;
    outputs::write_imputed_geo(&mut tx, &output.geo).await?;
    outputs::write_imputed_country(&mut tx, &output.country).await?;
    output.summary.finish();
    outputs::write_run_summary(&mut tx, &output.summary).await?;
    tx.commit().await?;

    info!("Run {} committed", output.summary.run_id);
    Ok(output)
}
