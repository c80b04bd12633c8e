//! First filing / filing bridge table
//!
//! One row per pool entry plus a self row per first filing, so every first
//! filing (SINGLE ones included) can be joined back to its own publication.

use crate::corpus::Corpus;
use crate::pool::CandidatePool;
use crate::resolver::Classification;
use ffgeo_common::model::{ApplnId, BridgeRow, FirstFilingType};
use tracing::info;

/// Bridge rows ordered by first filing, then self row, then pool order
pub fn build_bridge(
    corpus: &Corpus,
    classification: &Classification,
    pool: &CandidatePool,
) -> Vec<BridgeRow> {
    let mut rows = Vec::with_capacity(classification.len() + pool.len());

    for (first_filing, ty) in classification.iter() {
        if let Some(row) = bridge_row(corpus, first_filing, first_filing, 0, ty) {
            rows.push(row);
        }
        for entry in pool.entries_for(first_filing) {
            if let Some(row) =
                bridge_row(corpus, first_filing, entry.subsequent, entry.nb_priorities, ty)
            {
                rows.push(row);
            }
        }
    }

    info!("Bridge table: {} rows", rows.len());
    rows
}

fn bridge_row(
    corpus: &Corpus,
    first_filing_id: ApplnId,
    appln_id: ApplnId,
    nb_priorities: u32,
    ty: FirstFilingType,
) -> Option<BridgeRow> {
    let filing = corpus.filing(appln_id)?;
    let publication = corpus.first_publication(appln_id);
    Some(BridgeRow {
        first_filing_id,
        appln_id,
        appln_auth: filing.auth.clone(),
        publn_auth: publication.map(|p| p.publn_auth.clone()),
        publn_nr: publication.map(|p| p.publn_nr.clone()),
        publn_kind: publication.map(|p| p.publn_kind.clone()),
        publn_date: publication.and_then(|p| p.publn_date),
        nb_priorities,
        ty,
    })
}
