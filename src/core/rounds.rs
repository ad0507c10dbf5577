use crate::domain::model::{OfficeType, RoundSelection, VoteRecord};
use std::collections::HashMap;

/// Councillors are elected in a single round.
pub fn effective_selection(office: OfficeType, requested: RoundSelection) -> RoundSelection {
    match office {
        OfficeType::Councillor => RoundSelection::FirstRound,
        OfficeType::Mayor => requested,
    }
}

pub fn select_rounds(records: &[VoteRecord], mode: RoundSelection) -> Vec<VoteRecord> {
    match mode {
        RoundSelection::FirstRound => keep_round(records, 1),
        RoundSelection::SecondRound => keep_round(records, 2),
        RoundSelection::FinalWinners => final_rounds(records),
        RoundSelection::AllRounds => records.to_vec(),
    }
}

fn keep_round(records: &[VoteRecord], round: u8) -> Vec<VoteRecord> {
    records
        .iter()
        .filter(|r| r.round == round)
        .cloned()
        .collect()
}

/// Keeps, per (region, municipality), only the rows of the last round held there.
fn final_rounds(records: &[VoteRecord]) -> Vec<VoteRecord> {
    let mut last_round: HashMap<(&str, &str), u8> = HashMap::new();
    for record in records {
        let entry = last_round
            .entry((record.region.as_str(), record.municipality.as_str()))
            .or_insert(record.round);
        *entry = (*entry).max(record.round);
    }

    records
        .iter()
        .filter(|r| last_round.get(&(r.region.as_str(), r.municipality.as_str())) == Some(&r.round))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(municipality: &str, candidate: &str, round: u8, votes: u64) -> VoteRecord {
        VoteRecord {
            region: "SP".to_string(),
            municipality: municipality.to_string(),
            candidate: candidate.to_string(),
            party: "PT".to_string(),
            round,
            office: OfficeType::Mayor,
            votes,
        }
    }

    fn sample() -> Vec<VoteRecord> {
        vec![
            record("A", "X", 1, 100),
            record("A", "Y", 1, 90),
            record("A", "X", 2, 150),
            record("A", "Y", 2, 160),
            record("B", "Z", 1, 300),
        ]
    }

    #[test]
    fn test_final_winners_picks_last_round_per_municipality() {
        let selected = select_rounds(&sample(), RoundSelection::FinalWinners);

        assert_eq!(selected.len(), 3);
        assert!(selected
            .iter()
            .filter(|r| r.municipality == "A")
            .all(|r| r.round == 2));
        assert!(selected
            .iter()
            .filter(|r| r.municipality == "B")
            .all(|r| r.round == 1));
    }

    #[test]
    fn test_single_round_filters() {
        let records = sample();
        assert_eq!(select_rounds(&records, RoundSelection::FirstRound).len(), 3);
        assert_eq!(select_rounds(&records, RoundSelection::SecondRound).len(), 2);
        assert_eq!(select_rounds(&records, RoundSelection::AllRounds), records);
    }

    #[test]
    fn test_same_name_in_other_region_is_independent() {
        let mut records = sample();
        records.push(VoteRecord {
            region: "MG".to_string(),
            ..record("A", "W", 1, 10)
        });

        let selected = select_rounds(&records, RoundSelection::FinalWinners);
        assert!(selected
            .iter()
            .any(|r| r.region == "MG" && r.municipality == "A" && r.round == 1));
    }

    #[test]
    fn test_councillor_is_forced_to_first_round() {
        assert_eq!(
            effective_selection(OfficeType::Councillor, RoundSelection::SecondRound),
            RoundSelection::FirstRound
        );
        assert_eq!(
            effective_selection(OfficeType::Mayor, RoundSelection::SecondRound),
            RoundSelection::SecondRound
        );
    }
}
