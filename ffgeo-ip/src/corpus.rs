//! Indexed, immutable view of one input snapshot
//!
//! Every stage reads from the same `Corpus`; nothing mutates it after
//! `Corpus::build`.

use ffgeo_common::model::{
    ApplnId, Filing, InputSnapshot, PersonLocation, Publication, RelationKind, Role,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Both directions of one relationship kind
#[derive(Debug, Default, Clone)]
pub struct EdgeIndex {
    parents: HashMap<ApplnId, BTreeSet<ApplnId>>,
    children: HashMap<ApplnId, BTreeSet<ApplnId>>,
    /// Every distinct parent a known child declares, loaded or not
    declared: HashMap<ApplnId, BTreeSet<ApplnId>>,
}

impl EdgeIndex {
    fn declare(&mut self, child: ApplnId, parent: ApplnId) {
        self.declared.entry(child).or_default().insert(parent);
    }

    fn insert(&mut self, child: ApplnId, parent: ApplnId) {
        self.parents.entry(child).or_default().insert(parent);
        self.children.entry(parent).or_default().insert(child);
    }

    /// Filings `child` points at, ascending
    pub fn parents_of(&self, child: ApplnId) -> impl Iterator<Item = ApplnId> + '_ {
        self.parents.get(&child).into_iter().flatten().copied()
    }

    /// Filings pointing at `parent`, ascending
    pub fn children_of(&self, parent: ApplnId) -> impl Iterator<Item = ApplnId> + '_ {
        self.children.get(&parent).into_iter().flatten().copied()
    }

    /// Fan-in: how many distinct parents `child` declares
    ///
    /// Counts parents missing from the corpus too; only self edges are left out.
    pub fn parent_count(&self, child: ApplnId) -> usize {
        self.declared.get(&child).map(|p| p.len()).unwrap_or(0)
    }

    /// Every filing that at least one other filing points at
    pub fn all_parents(&self) -> impl Iterator<Item = ApplnId> + '_ {
        self.children.keys().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.parents.values().map(|p| p.len()).sum()
    }
}

#[derive(Debug, Default)]
pub struct Corpus {
    filings: BTreeMap<ApplnId, Filing>,
    priority: EdgeIndex,
    continuation: EdgeIndex,
    tech_rel: EdgeIndex,
    pct_phase: EdgeIndex,
    docdb_family_sizes: HashMap<i64, usize>,
    publications: HashMap<ApplnId, Vec<Publication>>,
    role_holders: HashSet<(ApplnId, Role)>,
    locations: HashMap<(ApplnId, Role), Vec<PersonLocation>>,
    dropped_edges: usize,
}

impl Corpus {
    /// Index a snapshot
    ///
    /// Edges touching unknown filings, and self edges, are dropped and counted.
    pub fn build(snapshot: InputSnapshot) -> Self {
        let InputSnapshot {
            filings,
            relationships,
            publications,
            person_roles,
            locations,
        } = snapshot;

        let mut corpus = Corpus {
            filings: filings.into_iter().map(|f| (f.appln_id, f)).collect(),
            ..Default::default()
        };

        for family in corpus.filings.values().filter_map(|f| f.docdb_family_id) {
            *corpus.docdb_family_sizes.entry(family).or_insert(0) += 1;
        }

        let phase_edges: Vec<(ApplnId, ApplnId)> = corpus
            .filings
            .values()
            .filter(|f| f.is_phase_entry())
            .filter_map(|f| f.internat_appln_id.map(|w| (f.appln_id, w)))
            .collect();
        for (child, parent) in phase_edges {
            corpus.add_edge(RelationKind::PctPhase, child, parent);
        }

        for rel in relationships {
            corpus.add_edge(rel.kind, rel.child, rel.parent);
        }

        for publn in publications {
            corpus.publications.entry(publn.appln_id).or_default().push(publn);
        }
        for list in corpus.publications.values_mut() {
            list.sort_by(first_publication_order);
        }

        for pr in person_roles {
            for role in pr.roles() {
                corpus.role_holders.insert((pr.appln_id, role));
            }
        }

        for loc in locations {
            corpus.locations.entry((loc.appln_id, loc.role)).or_default().push(loc);
        }
        for list in corpus.locations.values_mut() {
            list.sort_by(location_order);
        }

        if corpus.dropped_edges > 0 {
            debug!(
                "Dropped {} edges pointing at unknown filings or at themselves",
                corpus.dropped_edges
            );
        }
        info!(
            "Corpus indexed: {} filings, {} priority claims, {} continuations, {} technical relations, {} phase entries",
            corpus.filings.len(),
            corpus.priority.edge_count(),
            corpus.continuation.edge_count(),
            corpus.tech_rel.edge_count(),
            corpus.pct_phase.edge_count()
        );

        corpus
    }

    fn add_edge(&mut self, kind: RelationKind, child: ApplnId, parent: ApplnId) {
        if child == parent || !self.filings.contains_key(&child) {
            self.dropped_edges += 1;
            return;
        }
        let parent_known = self.filings.contains_key(&parent);
        let index = match kind {
            RelationKind::PriorityClaim => &mut self.priority,
            RelationKind::Continuation => &mut self.continuation,
            RelationKind::TechRel => &mut self.tech_rel,
            RelationKind::PctPhase => &mut self.pct_phase,
        };
        // An unknown parent still counts toward the child's fan-in
        index.declare(child, parent);
        if parent_known {
            index.insert(child, parent);
        } else {
            self.dropped_edges += 1;
        }
    }

    pub fn filing(&self, appln_id: ApplnId) -> Option<&Filing> {
        self.filings.get(&appln_id)
    }

    pub fn filings(&self) -> impl Iterator<Item = &Filing> {
        self.filings.values()
    }

    pub fn filing_count(&self) -> usize {
        self.filings.len()
    }

    pub fn edges(&self, kind: RelationKind) -> &EdgeIndex {
        match kind {
            RelationKind::PriorityClaim => &self.priority,
            RelationKind::Continuation => &self.continuation,
            RelationKind::TechRel => &self.tech_rel,
            RelationKind::PctPhase => &self.pct_phase,
        }
    }

    pub fn docdb_family_size(&self, docdb_family_id: i64) -> usize {
        self.docdb_family_sizes.get(&docdb_family_id).copied().unwrap_or(0)
    }

    /// Earliest publication (unknown dates last, then lowest publication id)
    pub fn first_publication(&self, appln_id: ApplnId) -> Option<&Publication> {
        self.publications.get(&appln_id).and_then(|list| list.first())
    }

    pub fn publication_kinds(&self, appln_id: ApplnId) -> impl Iterator<Item = &str> {
        self.publications
            .get(&appln_id)
            .into_iter()
            .flatten()
            .map(|p| p.publn_kind.as_str())
    }

    /// At least one person holds `role` on the filing
    pub fn has_role(&self, appln_id: ApplnId, role: Role) -> bool {
        self.role_holders.contains(&(appln_id, role))
    }

    /// Locations of persons acting in `role`, bibliographic rows first
    pub fn locations(&self, appln_id: ApplnId, role: Role) -> &[PersonLocation] {
        self.locations
            .get(&(appln_id, role))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }
}

fn first_publication_order(a: &Publication, b: &Publication) -> Ordering {
    match (a.publn_date, b.publn_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then(a.pat_publn_id.cmp(&b.pat_publn_id))
}

fn location_order(a: &PersonLocation, b: &PersonLocation) -> Ordering {
    a.origin
        .cmp(&b.origin)
        .then(a.person_id.cmp(&b.person_id))
        .then_with(|| a.coord_source.cmp(&b.coord_source))
        .then_with(|| match (a.coords, b.coords) {
            (Some(x), Some(y)) => x.lat.total_cmp(&y.lat).then(x.lng.total_cmp(&y.lng)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
