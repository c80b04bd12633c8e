//! Domain model
//!
//! Input records are immutable snapshots of the upstream bibliographic
//! database; output records are rebuilt from scratch on every run.

pub mod filing;
pub mod imputed;
pub mod person;

pub use filing::*;
pub use imputed::*;
pub use person::*;

/// Everything a run reads from the upstream store, before indexing
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub filings: Vec<Filing>,
    /// PRIORITY_CLAIM, CONTINUATION and TECH_REL edges; PCT_PHASE edges are
    /// implied by `Filing::internat_appln_id`
    pub relationships: Vec<Relationship>,
    pub publications: Vec<Publication>,
    pub person_roles: Vec<PersonRole>,
    pub locations: Vec<PersonLocation>,
}
