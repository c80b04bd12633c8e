//! First-filing tags, imputation provenance and output records

use super::filing::ApplnId;
use super::person::{PersonId, PersonLocation, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical first-filing type, declared in precedence order
///
/// `Ord` follows precedence: `Priority < Pct < Continuation < TechRel < Single`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FirstFilingType {
    Priority,
    Pct,
    Continuation,
    TechRel,
    Single,
}

impl FirstFilingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirstFilingType::Priority => "PRIORITY",
            FirstFilingType::Pct => "PCT",
            FirstFilingType::Continuation => "CONTINUATION",
            FirstFilingType::TechRel => "TECH_REL",
            FirstFilingType::Single => "SINGLE",
        }
    }
}

impl fmt::Display for FirstFilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which role's data is preferred (ranks 1-3) and which is the fallback (4-6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Inventor,
    Applicant,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Inventor => "inventor",
            Criterion::Applicant => "applicant",
        }
    }

    pub fn primary_role(&self) -> Role {
        match self {
            Criterion::Inventor => Role::Inventor,
            Criterion::Applicant => Role::Applicant,
        }
    }

    pub fn secondary_role(&self) -> Role {
        match self {
            Criterion::Inventor => Role::Applicant,
            Criterion::Applicant => Role::Inventor,
        }
    }
}

/// Attribute payload a resolver run imputes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Coordinates and administrative names
    Geo,
    /// Per-person country codes
    Country,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Geo => "geo",
            Variant::Country => "country",
        }
    }
}

/// Donor tier that supplied an imputed value, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceRank {
    /// The first filing's own primary-role data
    OwnPrimary = 1,
    /// Earliest single-parent equivalent, primary role
    EquivalentPrimary = 2,
    /// Earliest multi-parent subsequent filing, primary role
    OtherSubsequentPrimary = 3,
    /// The first filing's own secondary-role data
    OwnSecondary = 4,
    EquivalentSecondary = 5,
    OtherSubsequentSecondary = 6,
    /// Country code taken from the filing office
    JurisdictionFallback = 7,
}

impl SourceRank {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Geographic output: one per first filing and criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputedGeo {
    pub criterion: Criterion,
    pub appln_id: ApplnId,
    pub ty: FirstFilingType,
    pub source: SourceRank,
    pub donor_appln_id: ApplnId,
    /// Every coordinate-bearing location of the winning donor and role
    pub locations: Vec<PersonLocation>,
}

/// Country-code output: one per first filing, person and criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputedCountry {
    pub criterion: Criterion,
    pub appln_id: ApplnId,
    pub person_id: PersonId,
    pub ctry_code: String,
    pub ty: FirstFilingType,
    pub source: SourceRank,
    pub donor_appln_id: ApplnId,
}

/// Row of the first filing / filing bridge table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRow {
    pub first_filing_id: ApplnId,
    pub appln_id: ApplnId,
    pub appln_auth: String,
    pub publn_auth: Option<String>,
    pub publn_nr: Option<String>,
    pub publn_kind: Option<String>,
    pub publn_date: Option<chrono::NaiveDate>,
    /// 0 on the first filing's own row
    pub nb_priorities: u32,
    pub ty: FirstFilingType,
}
