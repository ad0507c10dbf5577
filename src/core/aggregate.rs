use crate::domain::model::{AggregatedTally, VoteRecord, Winner};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Anything that carries votes for a (region, municipality, candidate, party) key.
pub trait Tally {
    fn region(&self) -> &str;
    fn municipality(&self) -> &str;
    fn candidate(&self) -> &str;
    fn party(&self) -> &str;
    fn votes(&self) -> u64;
}

impl Tally for VoteRecord {
    fn region(&self) -> &str {
        &self.region
    }
    fn municipality(&self) -> &str {
        &self.municipality
    }
    fn candidate(&self) -> &str {
        &self.candidate
    }
    fn party(&self) -> &str {
        &self.party
    }
    fn votes(&self) -> u64 {
        self.votes
    }
}

impl Tally for AggregatedTally {
    fn region(&self) -> &str {
        &self.region
    }
    fn municipality(&self) -> &str {
        &self.municipality
    }
    fn candidate(&self) -> &str {
        &self.candidate
    }
    fn party(&self) -> &str {
        &self.party
    }
    fn votes(&self) -> u64 {
        self.votes
    }
}

type TallyKey<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Sums votes per (region, municipality, candidate, party), sorted by that key.
///
/// Re-aggregating the output returns it unchanged.
pub fn aggregate<T: Tally>(items: &[T]) -> Vec<AggregatedTally> {
    let mut totals: BTreeMap<TallyKey<'_>, u64> = BTreeMap::new();
    for item in items {
        let key = (
            item.region(),
            item.municipality(),
            item.candidate(),
            item.party(),
        );
        *totals.entry(key).or_insert(0) += item.votes();
    }

    totals
        .into_iter()
        .map(
            |((region, municipality, candidate, party), votes)| AggregatedTally {
                region: region.to_string(),
                municipality: municipality.to_string(),
                candidate: candidate.to_string(),
                party: party.to_string(),
                votes,
            },
        )
        .collect()
}

/// Most votes first; equal votes fall back to candidate name, then party code.
pub fn rank_order(a: &AggregatedTally, b: &AggregatedTally) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then_with(|| a.candidate.cmp(&b.candidate))
        .then_with(|| a.party.cmp(&b.party))
}

/// One winner per (region, municipality), sorted by that pair.
pub fn identify_winners(tallies: &[AggregatedTally]) -> Vec<Winner> {
    let mut best: BTreeMap<(&str, &str), &AggregatedTally> = BTreeMap::new();
    for tally in tallies {
        best.entry((tally.region.as_str(), tally.municipality.as_str()))
            .and_modify(|current| {
                if rank_order(tally, current) == Ordering::Less {
                    *current = tally;
                }
            })
            .or_insert(tally);
    }

    best.into_values().cloned().map(Winner::from).collect()
}

/// Candidate totals for one municipality, ranked with [`rank_order`].
pub fn candidate_tallies(
    records: &[VoteRecord],
    region: &str,
    municipality: &str,
) -> Vec<AggregatedTally> {
    let scoped: Vec<&VoteRecord> = records
        .iter()
        .filter(|r| r.region == region && r.municipality == municipality)
        .collect();

    let mut tallies = aggregate(&scoped);
    tallies.sort_by(rank_order);
    tallies
}

impl<T: Tally> Tally for &T {
    fn region(&self) -> &str {
        (*self).region()
    }
    fn municipality(&self) -> &str {
        (*self).municipality()
    }
    fn candidate(&self) -> &str {
        (*self).candidate()
    }
    fn party(&self) -> &str {
        (*self).party()
    }
    fn votes(&self) -> u64 {
        (*self).votes()
    }
}
