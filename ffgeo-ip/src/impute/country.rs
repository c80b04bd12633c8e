//! Country-code payload
//!
//! Per-person country codes of the donor. Bibliographic rows are read
//! before gazetteer rows, and the first code seen for a person id wins.
//! Rank 7 falls back to the filing office unless it is supranational.

use super::{DonorData, Resolution};
use crate::corpus::Corpus;
use ffgeo_common::config::StudyConfig;
use ffgeo_common::model::{
    ApplnId, Criterion, Filing, ImputedCountry, PersonId, PersonLocation, Role, UNKNOWN_PERSON,
};
use std::collections::BTreeMap;

pub struct CountryDonors<'a> {
    corpus: &'a Corpus,
    study: &'a StudyConfig,
}

impl<'a> CountryDonors<'a> {
    pub fn new(corpus: &'a Corpus, study: &'a StudyConfig) -> Self {
        Self { corpus, study }
    }
}

fn country_of(loc: &PersonLocation) -> Option<&str> {
    loc.ctry_code.as_deref().map(str::trim).filter(|c| !c.is_empty())
}

impl DonorData for CountryDonors<'_> {
    type Value = BTreeMap<PersonId, String>;

    fn lookup(&self, appln_id: ApplnId, role: Role) -> Option<Self::Value> {
        let mut countries = BTreeMap::new();
        for loc in self.corpus.locations(appln_id, role) {
            if let Some(code) = country_of(loc) {
                countries
                    .entry(loc.person_id)
                    .or_insert_with(|| code.to_string());
            }
        }
        (!countries.is_empty()).then_some(countries)
    }

    fn has_data(&self, appln_id: ApplnId, role: Role) -> bool {
        self.corpus
            .locations(appln_id, role)
            .iter()
            .any(|loc| country_of(loc).is_some())
    }

    fn jurisdiction_fallback(&self, first_filing: &Filing) -> Option<Self::Value> {
        if self.study.is_supranational(&first_filing.auth) {
            return None;
        }
        Some(BTreeMap::from([(UNKNOWN_PERSON, first_filing.auth.clone())]))
    }
}

/// One country row per (first filing, person), ordered by first filing then person
pub fn to_records(
    criterion: Criterion,
    resolved: Vec<Resolution<BTreeMap<PersonId, String>>>,
) -> Vec<ImputedCountry> {
    resolved
        .into_iter()
        .flat_map(|r| {
            let Resolution {
                first_filing,
                ty,
                source,
                donor_appln_id,
                value,
            } = r;
            value.into_iter().map(move |(person_id, ctry_code)| ImputedCountry {
                criterion,
                appln_id: first_filing,
                person_id,
                ctry_code,
                ty,
                source,
                donor_appln_id,
            })
        })
        .collect()
}
