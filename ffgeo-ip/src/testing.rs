//! Fixture builders for unit tests

use crate::corpus::Corpus;
use chrono::Datelike;
use ffgeo_common::model::{
    parse_date, ApplnId, ApplnKind, Coordinates, Filing, InputSnapshot, PersonId, PersonLocation,
    PersonRole, Publication, RelationKind, Relationship, Role,
};

/// National filing in docdb family 1, earliest of its lineage, no phase flags
pub fn filing(appln_id: ApplnId, auth: &str, date: &str) -> Filing {
    let filing_date = parse_date(date).unwrap();
    Filing {
        appln_id,
        kind: ApplnKind::NationalOrRegional,
        auth: auth.to_string(),
        filing_date,
        filing_year: filing_date.year(),
        docdb_family_id: Some(1),
        inpadoc_family_id: Some(1),
        internat_appln_id: None,
        is_earliest_filing: true,
        reg_phase: false,
        nat_phase: false,
    }
}

pub fn location(
    appln_id: ApplnId,
    person_id: PersonId,
    role: Role,
    coords: Option<(f64, f64)>,
    ctry_code: Option<&str>,
) -> PersonLocation {
    PersonLocation {
        appln_id,
        person_id,
        role,
        origin: PersonLocation::origin_for(person_id),
        coords: coords.map(|(lat, lng)| Coordinates { lat, lng }),
        exact: None,
        admin: Default::default(),
        ctry_code: ctry_code.map(|c| c.to_string()),
        coord_source: coords.map(|_| "fixture".to_string()),
    }
}

#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: InputSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filing(mut self, filing: Filing) -> Self {
        self.snapshot.filings.push(filing);
        self
    }

    fn edge(mut self, kind: RelationKind, child: ApplnId, parent: ApplnId) -> Self {
        self.snapshot.relationships.push(Relationship { child, parent, kind });
        self
    }

    pub fn priority(self, child: ApplnId, parent: ApplnId) -> Self {
        self.edge(RelationKind::PriorityClaim, child, parent)
    }

    pub fn continuation(self, child: ApplnId, parent: ApplnId) -> Self {
        self.edge(RelationKind::Continuation, child, parent)
    }

    pub fn tech_rel(self, child: ApplnId, parent: ApplnId) -> Self {
        self.edge(RelationKind::TechRel, child, parent)
    }

    pub fn inventor(mut self, appln_id: ApplnId, person_id: PersonId) -> Self {
        self.snapshot.person_roles.push(PersonRole {
            person_id,
            appln_id,
            applt_seq_nr: 0,
            invt_seq_nr: 1,
        });
        self
    }

    pub fn publication(mut self, appln_id: ApplnId, pat_publn_id: i64, kind: &str, date: Option<&str>) -> Self {
        let auth = self
            .snapshot
            .filings
            .iter()
            .find(|f| f.appln_id == appln_id)
            .map(|f| f.auth.clone())
            .unwrap_or_default();
        self.snapshot.publications.push(Publication {
            pat_publn_id,
            appln_id,
            publn_auth: auth,
            publn_nr: format!("{}", pat_publn_id * 1000),
            publn_kind: kind.to_string(),
            publn_date: date.map(|d| parse_date(d).unwrap()),
        });
        self
    }

    pub fn location(mut self, location: PersonLocation) -> Self {
        self.snapshot.locations.push(location);
        self
    }

    pub fn build(self) -> Corpus {
        Corpus::build(self.snapshot)
    }
}
