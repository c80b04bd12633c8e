//! Persons on filings and their locations

use super::filing::ApplnId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Person identifier (PATSTAT `person_id`)
pub type PersonId = i64;

/// Sentinel for gazetteer rows keyed only by filing
pub const UNKNOWN_PERSON: PersonId = 0;

/// Role a person holds on a filing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Inventor,
    Applicant,
}

impl Role {
    pub fn code(&self) -> &'static str {
        match self {
            Role::Inventor => "INV",
            Role::Applicant => "APP",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "INV" => Ok(Role::Inventor),
            "APP" => Ok(Role::Applicant),
            other => Err(Error::InvalidData(format!("unknown person role '{}'", other))),
        }
    }
}

/// Person-role-on-filing edge; a sequence number > 0 signals the role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRole {
    pub person_id: PersonId,
    pub appln_id: ApplnId,
    pub applt_seq_nr: i64,
    pub invt_seq_nr: i64,
}

impl PersonRole {
    pub fn roles(&self) -> impl Iterator<Item = Role> {
        let inv = (self.invt_seq_nr > 0).then_some(Role::Inventor);
        let app = (self.applt_seq_nr > 0).then_some(Role::Applicant);
        inv.into_iter().chain(app)
    }
}

/// Where a person location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocationOrigin {
    /// Bibliographic database, real person identifier
    Bibliographic,
    /// External geocoding/gazetteer source, person unknown
    Gazetteer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

/// Number of administrative levels carried per location
pub const ADMIN_LEVELS: usize = 5;

/// A location attached to a person acting in a role on a filing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonLocation {
    pub appln_id: ApplnId,
    pub person_id: PersonId,
    pub role: Role,
    pub origin: LocationOrigin,
    /// Approximate coordinates
    pub coords: Option<Coordinates>,
    /// Exact coordinates, when the geocoder resolved the street address
    pub exact: Option<Coordinates>,
    /// Administrative hierarchy, broadest first
    pub admin: [Option<String>; ADMIN_LEVELS],
    pub ctry_code: Option<String>,
    pub coord_source: Option<String>,
}

impl PersonLocation {
    /// Country-only location derived from the bibliographic person table
    pub fn country_only(appln_id: ApplnId, person_id: PersonId, role: Role, ctry_code: String) -> Self {
        Self {
            appln_id,
            person_id,
            role,
            origin: LocationOrigin::Bibliographic,
            coords: None,
            exact: None,
            admin: Default::default(),
            ctry_code: Some(ctry_code),
            coord_source: None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.coords.is_some()
    }

    pub fn origin_for(person_id: PersonId) -> LocationOrigin {
        if person_id == UNKNOWN_PERSON {
            LocationOrigin::Gazetteer
        } else {
            LocationOrigin::Bibliographic
        }
    }
}
