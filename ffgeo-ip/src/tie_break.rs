//! Earliest-candidate tie-breaker
//!
//! Total order over candidates of one first filing: earliest subsequent
//! filing date, then lowest subsequent filing id. Day-granular filing dates
//! tie often (simultaneous phase entries), so the id is what makes the
//! result reproducible.

use chrono::NaiveDate;
use ffgeo_common::model::ApplnId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub first_filing: ApplnId,
    pub subsequent: ApplnId,
    pub subsequent_date: NaiveDate,
}

impl Candidate {
    fn sort_key(&self) -> (NaiveDate, ApplnId) {
        (self.subsequent_date, self.subsequent)
    }
}

/// Pick the earliest candidate of one group
///
/// Callers pass candidates of a single first filing; first-filing ids are
/// not compared.
pub fn pick_earliest<I>(candidates: I) -> Option<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates.into_iter().min_by_key(Candidate::sort_key)
}

/// Reduce a candidate set to exactly one winner per first filing
pub fn earliest_per_first_filing<I>(candidates: I) -> BTreeMap<ApplnId, Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut winners: BTreeMap<ApplnId, Candidate> = BTreeMap::new();
    for candidate in candidates {
        winners
            .entry(candidate.first_filing)
            .and_modify(|current| {
                if candidate.sort_key() < current.sort_key() {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }
    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn candidate(first_filing: ApplnId, subsequent: ApplnId, raw_date: &str) -> Candidate {
        Candidate {
            first_filing,
            subsequent,
            subsequent_date: date(raw_date),
        }
    }

    #[test]
    fn test_same_day_tie_goes_to_lowest_id() {
        let candidates = vec![
            candidate(1, 3, "2005-02-01"),
            candidate(1, 2, "2005-01-01"),
            candidate(1, 1, "2005-01-01"),
        ];

        let winner = pick_earliest(candidates.clone()).unwrap();
        assert_eq!(winner.subsequent, 1);
        assert_eq!(pick_earliest(candidates).unwrap(), winner);
    }

    #[test]
    fn test_date_beats_id() {
        let winner = pick_earliest(vec![
            candidate(1, 2, "2004-12-31"),
            candidate(1, 1, "2005-01-01"),
        ])
        .unwrap();
        assert_eq!(winner.subsequent, 2);
    }

    #[test]
    fn test_empty_group_has_no_winner() {
        assert_eq!(pick_earliest(Vec::new()), None);
        assert!(earliest_per_first_filing(Vec::new()).is_empty());
    }

    #[test]
    fn test_one_winner_per_first_filing() {
        let winners = earliest_per_first_filing(vec![
            candidate(10, 12, "2001-05-01"),
            candidate(20, 21, "2003-01-01"),
            candidate(10, 11, "2001-05-01"),
            candidate(20, 22, "2002-01-01"),
        ]);

        assert_eq!(winners.len(), 2);
        assert_eq!(winners[&10].subsequent, 11);
        assert_eq!(winners[&20].subsequent, 22);
    }

    fn candidates() -> impl Strategy<Value = Vec<Candidate>> {
        // Dates derive from the subsequent id, as a filing has one date.
        proptest::collection::vec((1i64..5, 1i64..60), 0..40).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(first_filing, subsequent)| Candidate {
                    first_filing,
                    subsequent,
                    subsequent_date: NaiveDate::from_ymd_opt(2005, 1, 1).unwrap()
                        + chrono::Duration::days(subsequent % 7),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn reduction_ignores_input_order(input in candidates()) {
            let forward = earliest_per_first_filing(input.clone());
            let mut reversed = input.clone();
            reversed.reverse();
            prop_assert_eq!(&forward, &earliest_per_first_filing(reversed));
            prop_assert_eq!(&forward, &earliest_per_first_filing(input));
        }

        #[test]
        fn winner_is_minimal_in_its_group(input in candidates()) {
            let winners = earliest_per_first_filing(input.clone());
            for c in &input {
                let w = winners[&c.first_filing];
                prop_assert!((w.subsequent_date, w.subsequent) <= (c.subsequent_date, c.subsequent));
            }
            for (ff, w) in &winners {
                let group = input.iter().copied().filter(|c| c.first_filing == *ff);
                prop_assert_eq!(pick_earliest(group), Some(*w));
            }
        }
    }
}
