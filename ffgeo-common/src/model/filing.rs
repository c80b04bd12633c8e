//! Filings, relationship edges and publications

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque filing identifier (PATSTAT `appln_id`)
pub type ApplnId = i64;

/// Application kind: national/regional filing or international (PCT) application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplnKind {
    NationalOrRegional,
    International,
}

impl ApplnKind {
    /// `W` is the international application; any other kind code is a
    /// national or regional filing
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "" => Err(Error::InvalidData("empty appln_kind".to_string())),
            "W" => Ok(ApplnKind::International),
            _ => Ok(ApplnKind::NationalOrRegional),
        }
    }
}

/// Phase of a PCT-route filing that entered a national or regional phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PctPhase {
    Regional,
    National,
}

/// A patent application record, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    pub appln_id: ApplnId,
    pub kind: ApplnKind,
    /// Filing office (jurisdiction) code
    pub auth: String,
    pub filing_date: NaiveDate,
    pub filing_year: i32,
    /// Narrow "document family"; `None` when the upstream record has none
    pub docdb_family_id: Option<i64>,
    /// Broad "technical family"
    pub inpadoc_family_id: Option<i64>,
    /// International application this filing entered the phase from
    pub internat_appln_id: Option<ApplnId>,
    /// Earliest member of its own international-application lineage
    pub is_earliest_filing: bool,
    pub reg_phase: bool,
    pub nat_phase: bool,
}

impl Filing {
    pub fn is_international(&self) -> bool {
        self.kind == ApplnKind::International
    }

    /// A national/regional filing that entered the phase from a PCT application
    pub fn is_phase_entry(&self) -> bool {
        !self.is_international() && self.internat_appln_id.is_some()
    }

    /// Phase of a phase-entry filing
    ///
    /// When the upstream record sets neither flag, a filing at a
    /// supranational office is taken as regional.
    pub fn pct_phase(&self, at_supranational_office: bool) -> Option<PctPhase> {
        if !self.is_phase_entry() {
            return None;
        }
        Some(if self.reg_phase {
            PctPhase::Regional
        } else if self.nat_phase || !at_supranational_office {
            PctPhase::National
        } else {
            PctPhase::Regional
        })
    }
}

/// Typed, directed edge between two filings (child -> parent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    /// Child cites the parent as priority
    PriorityClaim,
    /// Child is a continuation of the parent
    Continuation,
    /// Child is technically related to the parent
    TechRel,
    /// Child is a national/regional phase entry of the parent PCT application
    PctPhase,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationKind::PriorityClaim => "PRIORITY_CLAIM",
            RelationKind::Continuation => "CONTINUATION",
            RelationKind::TechRel => "TECH_REL",
            RelationKind::PctPhase => "PCT_PHASE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub child: ApplnId,
    pub parent: ApplnId,
    pub kind: RelationKind,
}

/// Publication metadata of a filing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub pat_publn_id: i64,
    pub appln_id: ApplnId,
    pub publn_auth: String,
    pub publn_nr: String,
    pub publn_kind: String,
    pub publn_date: Option<NaiveDate>,
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidData(format!("malformed date '{}': {}", raw, e)))
}

/// Parse a PATSTAT `Y`/`N` flag
pub fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim() {
        "Y" | "y" => Ok(true),
        "N" | "n" | "" => Ok(false),
        other => Err(Error::InvalidData(format!("malformed Y/N flag '{}'", other))),
    }
}
