//! Filing Relationship Resolver
//!
//! Tags every filing that is the earliest identifiable member of its lineage
//! with exactly one `FirstFilingType`.
//!
//! # Rule table
//! Rules run in precedence order. Each rule is a seed (where candidates come
//! from) plus a predicate over the candidate filing. A pass only admits
//! filings that are untagged when the pass begins and inserts its whole
//! result at once, so a filing matching several rules keeps the tag of the
//! first one.
//!
//! | Pass | Seed | Predicate |
//! |---|---|---|
//! | PRIORITY | claimed as priority | national kind, study office, has inventor, year window, no excluded publication kind |
//! | PCT | international applications | no phase entered, earliest of lineage |
//! | PCT | international application of a phase entry | international kind, earliest of lineage |
//! | CONTINUATION | declared continuation parent | some child has no tagged filing in its priority chain |
//! | TECH_REL | declared technical parent | same, over technical edges |
//! | SINGLE | every filing | docdb family of one |
//!
//! Filings matching no rule are pure subsequent filings and stay untagged.

use crate::corpus::Corpus;
use ffgeo_common::config::StudyConfig;
use ffgeo_common::model::{ApplnId, Filing, FirstFilingType, RelationKind, Role};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

/// Result of classification: at most one tag per filing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    tags: BTreeMap<ApplnId, FirstFilingType>,
}

impl Classification {
    pub fn get(&self, appln_id: ApplnId) -> Option<FirstFilingType> {
        self.tags.get(&appln_id).copied()
    }

    pub fn contains(&self, appln_id: ApplnId) -> bool {
        self.tags.contains_key(&appln_id)
    }

    /// First filings in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (ApplnId, FirstFilingType)> + '_ {
        self.tags.iter().map(|(id, ty)| (*id, *ty))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn count_by_type(&self) -> BTreeMap<FirstFilingType, usize> {
        let mut counts = BTreeMap::new();
        for ty in self.tags.values() {
            *counts.entry(*ty).or_insert(0) += 1;
        }
        counts
    }
}

/// Where a rule draws its candidates from
#[derive(Debug, Clone, Copy)]
enum Seed {
    /// Filings some other filing points at through this edge kind
    ClaimedVia(RelationKind),
    InternationalApplications,
    /// The international application of every phase-entry filing
    PhaseEntryRoots,
    AllFilings,
}

impl Seed {
    fn candidates(&self, corpus: &Corpus) -> BTreeSet<ApplnId> {
        match self {
            Seed::ClaimedVia(kind) => corpus.edges(*kind).all_parents().collect(),
            Seed::InternationalApplications => corpus
                .filings()
                .filter(|f| f.is_international())
                .map(|f| f.appln_id)
                .collect(),
            Seed::PhaseEntryRoots => corpus
                .filings()
                .filter(|f| f.is_phase_entry())
                .filter_map(|f| f.internat_appln_id)
                .collect(),
            Seed::AllFilings => corpus.filings().map(|f| f.appln_id).collect(),
        }
    }
}

struct RuleContext<'a> {
    corpus: &'a Corpus,
    study: &'a StudyConfig,
    tagged: &'a BTreeMap<ApplnId, FirstFilingType>,
}

struct ClassificationRule {
    name: &'static str,
    ty: FirstFilingType,
    seed: Seed,
    predicate: fn(&RuleContext<'_>, &Filing) -> bool,
}

const RULES: [ClassificationRule; 6] = [
    ClassificationRule {
        name: "priority claims",
        ty: FirstFilingType::Priority,
        seed: Seed::ClaimedVia(RelationKind::PriorityClaim),
        predicate: priority_root,
    },
    ClassificationRule {
        name: "PCT without phase entry",
        ty: FirstFilingType::Pct,
        seed: Seed::InternationalApplications,
        predicate: pct_unentered_root,
    },
    ClassificationRule {
        name: "PCT with phase entries",
        ty: FirstFilingType::Pct,
        seed: Seed::PhaseEntryRoots,
        predicate: pct_entered_root,
    },
    ClassificationRule {
        name: "continuations",
        ty: FirstFilingType::Continuation,
        seed: Seed::ClaimedVia(RelationKind::Continuation),
        predicate: continuation_root,
    },
    ClassificationRule {
        name: "technical relations",
        ty: FirstFilingType::TechRel,
        seed: Seed::ClaimedVia(RelationKind::TechRel),
        predicate: tech_rel_root,
    },
    ClassificationRule {
        name: "singletons",
        ty: FirstFilingType::Single,
        seed: Seed::AllFilings,
        predicate: singleton,
    },
];

/// Classify every filing of the corpus
pub fn classify(corpus: &Corpus, study: &StudyConfig) -> Classification {
    let mut tags: BTreeMap<ApplnId, FirstFilingType> = BTreeMap::new();

    for rule in RULES.iter() {
        let ctx = RuleContext {
            corpus,
            study,
            tagged: &tags,
        };

        let seeded = rule.seed.candidates(corpus);
        let admitted: Vec<ApplnId> = seeded
            .iter()
            .filter(|id| !ctx.tagged.contains_key(*id))
            .filter_map(|id| corpus.filing(*id))
            .filter(|f| (rule.predicate)(&ctx, f))
            .map(|f| f.appln_id)
            .collect();

        debug!(
            "Pass '{}': {} seeded, {} admitted as {}",
            rule.name,
            seeded.len(),
            admitted.len(),
            rule.ty
        );

        for appln_id in admitted {
            tags.insert(appln_id, rule.ty);
        }
    }

    let classification = Classification { tags };
    info!(
        "Classified {} first filings: {:?}",
        classification.len(),
        classification
            .count_by_type()
            .iter()
            .map(|(ty, n)| format!("{}={}", ty, n))
            .collect::<Vec<_>>()
    );
    classification
}

fn priority_root(ctx: &RuleContext<'_>, filing: &Filing) -> bool {
    !filing.is_international()
        && ctx.study.is_study_jurisdiction(&filing.auth)
        && ctx.corpus.has_role(filing.appln_id, Role::Inventor)
        && ctx.study.in_year_window(filing.filing_year)
        && !ctx
            .corpus
            .publication_kinds(filing.appln_id)
            .any(|kind| ctx.study.is_excluded_kind(&filing.auth, kind))
}

fn pct_unentered_root(_ctx: &RuleContext<'_>, filing: &Filing) -> bool {
    filing.is_international() && !filing.reg_phase && !filing.nat_phase && filing.is_earliest_filing
}

fn pct_entered_root(_ctx: &RuleContext<'_>, filing: &Filing) -> bool {
    filing.is_international() && filing.is_earliest_filing
}

fn continuation_root(ctx: &RuleContext<'_>, filing: &Filing) -> bool {
    has_unrooted_child(ctx, RelationKind::Continuation, filing.appln_id)
}

fn tech_rel_root(ctx: &RuleContext<'_>, filing: &Filing) -> bool {
    has_unrooted_child(ctx, RelationKind::TechRel, filing.appln_id)
}

fn singleton(ctx: &RuleContext<'_>, filing: &Filing) -> bool {
    filing
        .docdb_family_id
        .is_some_and(|family| ctx.corpus.docdb_family_size(family) == 1)
}

/// Some child declaring `parent` through `kind` whose own priority chain
/// reaches no tagged filing
fn has_unrooted_child(ctx: &RuleContext<'_>, kind: RelationKind, parent: ApplnId) -> bool {
    ctx.corpus
        .edges(kind)
        .children_of(parent)
        .any(|child| !priority_chain_is_tagged(ctx, child))
}

/// Walk the transitive priority claims of `start` (excluding `start`)
///
/// The visited set keeps cyclic claim data from looping.
fn priority_chain_is_tagged(ctx: &RuleContext<'_>, start: ApplnId) -> bool {
    let claims = ctx.corpus.edges(RelationKind::PriorityClaim);
    let mut visited: HashSet<ApplnId> = HashSet::from([start]);
    let mut stack: Vec<ApplnId> = claims.parents_of(start).collect();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if ctx.tagged.contains_key(&id) {
            return true;
        }
        stack.extend(claims.parents_of(id));
    }
    false
}
