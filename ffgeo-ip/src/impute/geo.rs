//! Coordinate payload
//!
//! A donor has data when at least one location of the role carries
//! coordinates. The committed value is every such location of the donor,
//! never a mix across donors.

use super::{DonorData, Resolution};
use crate::corpus::Corpus;
use ffgeo_common::model::{ApplnId, Criterion, ImputedGeo, PersonLocation, Role};

pub struct GeoDonors<'a> {
    corpus: &'a Corpus,
}

impl<'a> GeoDonors<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }
}

impl DonorData for GeoDonors<'_> {
    type Value = Vec<PersonLocation>;

    fn lookup(&self, appln_id: ApplnId, role: Role) -> Option<Self::Value> {
        let mut located: Vec<PersonLocation> = self
            .corpus
            .locations(appln_id, role)
            .iter()
            .filter(|loc| loc.has_coordinates())
            .cloned()
            .collect();
        if located.is_empty() {
            return None;
        }
        // Stable: keeps coordinate source, then coordinate order within a person
        located.sort_by_key(|loc| loc.person_id);
        Some(located)
    }

    fn has_data(&self, appln_id: ApplnId, role: Role) -> bool {
        self.corpus
            .locations(appln_id, role)
            .iter()
            .any(|loc| loc.has_coordinates())
    }
}

/// One geographic output record per resolved first filing
pub fn to_records(
    criterion: Criterion,
    resolved: Vec<Resolution<Vec<PersonLocation>>>,
) -> Vec<ImputedGeo> {
    resolved
        .into_iter()
        .map(|r| ImputedGeo {
            criterion,
            appln_id: r.first_filing,
            ty: r.ty,
            source: r.source,
            donor_appln_id: r.donor_appln_id,
            locations: r.value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impute::AttributeResolver;
    use crate::pool::CandidatePool;
    use crate::resolver::classify;
    use crate::testing::{filing, location, SnapshotBuilder};
    use ffgeo_common::config::StudyConfig;
    use ffgeo_common::model::{ApplnKind, FirstFilingType, SourceRank, UNKNOWN_PERSON};

    fn resolve(builder: SnapshotBuilder, criterion: Criterion) -> Vec<ImputedGeo> {
        let corpus = builder.build();
        let study = StudyConfig::default();
        let classification = classify(&corpus, &study);
        let pool = CandidatePool::build(&corpus, &classification, &study);
        let resolver = AttributeResolver::new(&corpus, &classification, &pool);
        to_records(
            criterion,
            resolver.resolve_all(&GeoDonors::new(&corpus), criterion).resolved,
        )
    }

    /// A (DE, 1995) claimed as sole priority by B (US, 1996)
    fn de_us() -> SnapshotBuilder {
        SnapshotBuilder::new()
            .filing(filing(1, "DE", "1995-04-12"))
            .filing(filing(2, "US", "1996-04-10"))
            .priority(2, 1)
            .inventor(1, 11)
            .inventor(2, 21)
    }

    #[test]
    fn test_first_filing_with_own_coordinates() {
        let rows = resolve(
            de_us()
                .location(location(1, 11, Role::Inventor, Some((48.14, 11.58)), Some("DE")))
                .location(location(2, 21, Role::Inventor, Some((37.77, -122.42)), Some("US"))),
            Criterion::Inventor,
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.appln_id, 1);
        assert_eq!(row.ty, FirstFilingType::Priority);
        assert_eq!(row.source, SourceRank::OwnPrimary);
        assert_eq!(row.locations[0].coords.unwrap().lat, 48.14);
    }

    #[test]
    fn test_copied_from_sole_equivalent() {
        let rows = resolve(
            de_us()
                .location(location(1, 11, Role::Inventor, None, Some("DE")))
                .location(location(2, 21, Role::Inventor, Some((37.77, -122.42)), Some("US")))
                .location(location(2, UNKNOWN_PERSON, Role::Inventor, Some((37.0, -122.0)), Some("US"))),
            Criterion::Inventor,
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.source, SourceRank::EquivalentPrimary);
        assert_eq!(row.donor_appln_id, 2);
        assert_eq!(
            row.locations.iter().map(|l| l.person_id).collect::<Vec<_>>(),
            vec![UNKNOWN_PERSON, 21]
        );
    }

    #[test]
    fn test_no_coordinates_anywhere_is_absent() {
        let rows = resolve(
            de_us().location(location(1, 11, Role::Inventor, None, Some("DE"))),
            Criterion::Inventor,
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_claim_on_unloaded_priority_demotes_donor() {
        let rows = resolve(
            de_us()
                .priority(2, 999)
                .location(location(1, 11, Role::Inventor, None, Some("DE")))
                .location(location(2, 21, Role::Inventor, Some((37.77, -122.42)), Some("US"))),
            Criterion::Inventor,
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, SourceRank::OtherSubsequentPrimary);
        assert_eq!(rows[0].donor_appln_id, 2);
    }

    #[test]
    fn test_regional_entry_beats_earlier_national_entry() {
        let mut w = filing(100, "WO", "2000-03-01");
        w.kind = ApplnKind::International;
        w.reg_phase = true;
        w.nat_phase = true;
        let mut us = filing(101, "US", "2001-06-01");
        us.internat_appln_id = Some(100);
        us.is_earliest_filing = false;
        us.nat_phase = true;
        let mut ep = filing(102, "EP", "2001-09-01");
        ep.internat_appln_id = Some(100);
        ep.is_earliest_filing = false;
        ep.reg_phase = true;

        let rows = resolve(
            SnapshotBuilder::new()
                .filing(w)
                .filing(us)
                .filing(ep)
                .inventor(101, 31)
                .inventor(102, 32)
                .location(location(101, 31, Role::Inventor, Some((40.71, -74.0)), Some("US")))
                .location(location(102, 32, Role::Inventor, Some((48.85, 2.35)), Some("FR"))),
            Criterion::Inventor,
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.appln_id, 100);
        assert_eq!(row.ty, FirstFilingType::Pct);
        assert_eq!(row.source, SourceRank::EquivalentPrimary);
        assert_eq!(row.donor_appln_id, 102);
    }
}
