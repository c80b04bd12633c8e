//! Candidate Pool Builder
//!
//! For every first filing, the subsequent filings that can donate data,
//! with the fan-in count that separates equivalents from weaker donors.
//!
//! | First filing type | Subsequent filings | `nb_priorities` |
//! |---|---|---|
//! | PRIORITY | children via priority claims | distinct priorities the child claims |
//! | CONTINUATION | children via continuation edges | distinct continuation parents of the child |
//! | TECH_REL | children via technical relations | distinct technical parents of the child |
//! | PCT | phase entries | 1 regional, 2 national |
//! | SINGLE | none | |

use crate::corpus::Corpus;
use crate::resolver::Classification;
use crate::tie_break::Candidate;
use chrono::NaiveDate;
use ffgeo_common::config::StudyConfig;
use ffgeo_common::model::{ApplnId, FirstFilingType, PctPhase, RelationKind};
use std::collections::BTreeMap;
use tracing::info;

/// Forced fan-in of a regional phase entry
const REGIONAL_PHASE_RANK: u32 = 1;
/// Forced fan-in of a national phase entry
const NATIONAL_PHASE_RANK: u32 = 2;

/// Donor strength class of a pool entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DonorBucket {
    /// Single-parent subsequent filing
    Equivalent,
    /// Subsequent filing aggregating several first filings
    OtherSubsequent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolEntry {
    pub first_filing: ApplnId,
    pub subsequent: ApplnId,
    pub subsequent_date: NaiveDate,
    pub nb_priorities: u32,
}

impl PoolEntry {
    pub fn bucket(&self) -> DonorBucket {
        if self.nb_priorities <= 1 {
            DonorBucket::Equivalent
        } else {
            DonorBucket::OtherSubsequent
        }
    }

    pub fn candidate(&self) -> Candidate {
        Candidate {
            first_filing: self.first_filing,
            subsequent: self.subsequent,
            subsequent_date: self.subsequent_date,
        }
    }
}

/// Pools of every first filing, keyed by first filing id
///
/// Entries of one first filing are sorted by subsequent date, then id.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    entries: BTreeMap<ApplnId, Vec<PoolEntry>>,
}

impl CandidatePool {
    pub fn build(corpus: &Corpus, classification: &Classification, study: &StudyConfig) -> Self {
        let mut entries = BTreeMap::new();

        for (first_filing, ty) in classification.iter() {
            let mut pool = match ty {
                FirstFilingType::Priority => {
                    edge_pool(corpus, RelationKind::PriorityClaim, first_filing)
                }
                FirstFilingType::Continuation => {
                    edge_pool(corpus, RelationKind::Continuation, first_filing)
                }
                FirstFilingType::TechRel => edge_pool(corpus, RelationKind::TechRel, first_filing),
                FirstFilingType::Pct => phase_pool(corpus, study, first_filing),
                FirstFilingType::Single => Vec::new(),
            };
            if pool.is_empty() {
                continue;
            }
            pool.sort_by_key(|e| (e.subsequent_date, e.subsequent));
            entries.insert(first_filing, pool);
        }

        let pool = Self { entries };
        info!(
            "Candidate pool: {} entries across {} first filings",
            pool.len(),
            pool.entries.len()
        );
        pool
    }

    /// Pool of one first filing, earliest first
    pub fn entries_for(&self, first_filing: ApplnId) -> &[PoolEntry] {
        self.entries
            .get(&first_filing)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All entries, by first filing id, then subsequent date and id
    pub fn iter(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn edge_pool(corpus: &Corpus, kind: RelationKind, first_filing: ApplnId) -> Vec<PoolEntry> {
    let edges = corpus.edges(kind);
    edges
        .children_of(first_filing)
        .filter_map(|child| corpus.filing(child))
        .map(|child| PoolEntry {
            first_filing,
            subsequent: child.appln_id,
            subsequent_date: child.filing_date,
            nb_priorities: edges.parent_count(child.appln_id) as u32,
        })
        .collect()
}

fn phase_pool(corpus: &Corpus, study: &StudyConfig, first_filing: ApplnId) -> Vec<PoolEntry> {
    corpus
        .edges(RelationKind::PctPhase)
        .children_of(first_filing)
        .filter_map(|child| corpus.filing(child))
        .filter_map(|child| {
            let rank = match child.pct_phase(study.is_supranational(&child.auth))? {
                PctPhase::Regional => REGIONAL_PHASE_RANK,
                PctPhase::National => NATIONAL_PHASE_RANK,
            };
            Some(PoolEntry {
                first_filing,
                subsequent: child.appln_id,
                subsequent_date: child.filing_date,
                nb_priorities: rank,
            })
        })
        .collect()
}
