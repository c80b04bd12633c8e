//! Attribute Resolver
//!
//! One scaffold, two payloads. For every first filing the resolver walks the
//! seven source ranks strongest first and commits the first rank that yields
//! a value; later ranks are never consulted, so a weaker donor can never
//! overwrite a stronger one.
//!
//! | Rank | Donor | Role |
//! |---|---|---|
//! | 1 | the first filing | primary |
//! | 2 | earliest equivalent with data | primary |
//! | 3 | earliest other subsequent filing with data | primary |
//! | 4 | the first filing | secondary |
//! | 5 | earliest equivalent with data | secondary |
//! | 6 | earliest other subsequent filing with data | secondary |
//! | 7 | the filing office | payload-specific |
//!
//! Primary and secondary roles come from the `Criterion`. Payloads plug in
//! through `DonorData`: see `geo` and `country`.

pub mod country;
pub mod geo;

pub use country::CountryDonors;
pub use geo::GeoDonors;

use crate::corpus::Corpus;
use crate::pool::{CandidatePool, DonorBucket};
use crate::resolver::Classification;
use crate::tie_break::pick_earliest;
use ffgeo_common::model::{ApplnId, Criterion, Filing, FirstFilingType, Role, SourceRank};
use tracing::debug;

/// Ranks in resolution order
pub const RANK_LADDER: [SourceRank; 7] = [
    SourceRank::OwnPrimary,
    SourceRank::EquivalentPrimary,
    SourceRank::OtherSubsequentPrimary,
    SourceRank::OwnSecondary,
    SourceRank::EquivalentSecondary,
    SourceRank::OtherSubsequentSecondary,
    SourceRank::JurisdictionFallback,
];

/// Attribute payload read from donor filings
pub trait DonorData {
    type Value;

    /// Data of `role` persons on `appln_id`, `None` when there is nothing usable
    fn lookup(&self, appln_id: ApplnId, role: Role) -> Option<Self::Value>;

    /// Cheap presence check used to filter pool candidates before the tie-break
    fn has_data(&self, appln_id: ApplnId, role: Role) -> bool {
        self.lookup(appln_id, role).is_some()
    }

    /// Rank 7 value derived from the first filing itself
    fn jurisdiction_fallback(&self, _first_filing: &Filing) -> Option<Self::Value> {
        None
    }
}

/// A committed value with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<V> {
    pub first_filing: ApplnId,
    pub ty: FirstFilingType,
    pub source: SourceRank,
    /// Filing the value was copied from; the first filing itself for ranks 1, 4 and 7
    pub donor_appln_id: ApplnId,
    pub value: V,
}

/// Outcome of one resolver run over all first filings
#[derive(Debug, Clone)]
pub struct ResolverRun<V> {
    pub resolved: Vec<Resolution<V>>,
    /// First filings with no value at any rank
    pub unresolved: usize,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Own,
    Pool(DonorBucket),
    Fallback,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Primary,
    Secondary,
}

fn step_of(rank: SourceRank) -> (Step, Side) {
    match rank {
        SourceRank::OwnPrimary => (Step::Own, Side::Primary),
        SourceRank::EquivalentPrimary => (Step::Pool(DonorBucket::Equivalent), Side::Primary),
        SourceRank::OtherSubsequentPrimary => {
            (Step::Pool(DonorBucket::OtherSubsequent), Side::Primary)
        }
        SourceRank::OwnSecondary => (Step::Own, Side::Secondary),
        SourceRank::EquivalentSecondary => (Step::Pool(DonorBucket::Equivalent), Side::Secondary),
        SourceRank::OtherSubsequentSecondary => {
            (Step::Pool(DonorBucket::OtherSubsequent), Side::Secondary)
        }
        SourceRank::JurisdictionFallback => (Step::Fallback, Side::Primary),
    }
}

pub struct AttributeResolver<'a> {
    corpus: &'a Corpus,
    classification: &'a Classification,
    pool: &'a CandidatePool,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(
        corpus: &'a Corpus,
        classification: &'a Classification,
        pool: &'a CandidatePool,
    ) -> Self {
        Self {
            corpus,
            classification,
            pool,
        }
    }

    /// Value available at exactly `rank`, ignoring all other ranks
    pub fn try_rank<D: DonorData>(
        &self,
        donors: &D,
        criterion: Criterion,
        first_filing: ApplnId,
        rank: SourceRank,
    ) -> Option<Resolution<D::Value>> {
        let ty = self.classification.get(first_filing)?;
        let (step, side) = step_of(rank);
        let role = match side {
            Side::Primary => criterion.primary_role(),
            Side::Secondary => criterion.secondary_role(),
        };

        let (donor_appln_id, value) = match step {
            Step::Own => (first_filing, donors.lookup(first_filing, role)?),
            Step::Pool(bucket) => {
                let winner = pick_earliest(
                    self.pool
                        .entries_for(first_filing)
                        .iter()
                        .filter(|e| e.bucket() == bucket)
                        .filter(|e| donors.has_data(e.subsequent, role))
                        .map(|e| e.candidate()),
                )?;
                (winner.subsequent, donors.lookup(winner.subsequent, role)?)
            }
            Step::Fallback => {
                let filing = self.corpus.filing(first_filing)?;
                (first_filing, donors.jurisdiction_fallback(filing)?)
            }
        };

        Some(Resolution {
            first_filing,
            ty,
            source: rank,
            donor_appln_id,
            value,
        })
    }

    /// Strongest available value for one first filing
    pub fn resolve<D: DonorData>(
        &self,
        donors: &D,
        criterion: Criterion,
        first_filing: ApplnId,
    ) -> Option<Resolution<D::Value>> {
        RANK_LADDER
            .iter()
            .find_map(|rank| self.try_rank(donors, criterion, first_filing, *rank))
    }

    /// Resolve every first filing, in ascending id order
    pub fn resolve_all<D: DonorData>(&self, donors: &D, criterion: Criterion) -> ResolverRun<D::Value> {
        let mut resolved = Vec::with_capacity(self.classification.len());
        let mut unresolved = 0;

        for (first_filing, _) in self.classification.iter() {
            match self.resolve(donors, criterion, first_filing) {
                Some(resolution) => resolved.push(resolution),
                None => unresolved += 1,
            }
        }

        debug!(
            "Criterion {}: {} resolved, {} unresolved",
            criterion.as_str(),
            resolved.len(),
            unresolved
        );
        ResolverRun {
            resolved,
            unresolved,
        }
    }
}
