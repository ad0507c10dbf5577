use crate::core::aggregate::candidate_tallies;
use crate::core::colors::party_color_or_neutral;
use crate::domain::model::{AggregatedTally, VoteRecord, Winner};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

pub const TOP_WINNERS: usize = 20;
pub const TOP_PARTIES: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyCount {
    pub party: String,
    pub municipalities: usize,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryView {
    pub municipalities: usize,
    pub total_votes: u64,
    pub top_winners: Vec<Winner>,
    pub party_distribution: Vec<PartyCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateView {
    pub region: String,
    pub municipalities: usize,
    pub total_votes: u64,
    pub leading_party: Option<String>,
    pub winners: Vec<Winner>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MunicipalityView {
    pub region: String,
    pub municipality: String,
    pub winner: Option<AggregatedTally>,
    pub candidates: Vec<AggregatedTally>,
}

fn by_votes_desc(winners: &mut [Winner]) {
    winners.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| a.region.cmp(&b.region))
            .then_with(|| a.municipality.cmp(&b.municipality))
    });
}

/// Municipalities won per party, most wins first, ties by party code.
pub fn party_distribution(winners: &[Winner]) -> Vec<PartyCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for winner in winners {
        *counts.entry(winner.party.as_str()).or_insert(0) += 1;
    }

    let mut distribution: Vec<PartyCount> = counts
        .into_iter()
        .map(|(party, municipalities)| PartyCount {
            party: party.to_string(),
            municipalities,
            color: party_color_or_neutral(party).to_string(),
        })
        .collect();
    distribution.sort_by(|a, b| {
        b.municipalities
            .cmp(&a.municipalities)
            .then_with(|| a.party.cmp(&b.party))
    });
    distribution
}

pub fn country_view(winners: &[Winner]) -> CountryView {
    let mut top_winners = winners.to_vec();
    by_votes_desc(&mut top_winners);
    top_winners.truncate(TOP_WINNERS);

    let mut parties = party_distribution(winners);
    parties.truncate(TOP_PARTIES);

    CountryView {
        municipalities: winners.len(),
        total_votes: winners.iter().map(|w| w.votes).sum(),
        top_winners,
        party_distribution: parties,
    }
}

pub fn state_view(winners: &[Winner], region: &str) -> StateView {
    let mut state_winners: Vec<Winner> = winners
        .iter()
        .filter(|w| w.region == region)
        .cloned()
        .collect();
    by_votes_desc(&mut state_winners);

    StateView {
        region: region.to_string(),
        municipalities: state_winners.len(),
        total_votes: state_winners.iter().map(|w| w.votes).sum(),
        leading_party: party_distribution(&state_winners)
            .into_iter()
            .next()
            .map(|p| p.party),
        winners: state_winners,
    }
}

pub fn municipality_view(records: &[VoteRecord], region: &str, municipality: &str) -> MunicipalityView {
    let candidates = candidate_tallies(records, region, municipality);
    MunicipalityView {
        region: region.to_string(),
        municipality: municipality.to_string(),
        winner: candidates.first().cloned(),
        candidates,
    }
}

/// UF codes that have at least one winner.
pub fn regions(winners: &[Winner]) -> Vec<String> {
    winners
        .iter()
        .map(|w| w.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn municipalities(records: &[VoteRecord], region: &str) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.region == region && !r.municipality.is_empty())
        .map(|r| r.municipality.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `1234567` -> `"1.234.567"`
pub fn format_votes(votes: u64) -> String {
    let digits = votes.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(c);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OfficeType;

    fn winner(region: &str, municipality: &str, party: &str, votes: u64) -> Winner {
        Winner {
            region: region.to_string(),
            municipality: municipality.to_string(),
            candidate: format!("cand-{}", municipality),
            party: party.to_string(),
            votes,
        }
    }

    fn winners() -> Vec<Winner> {
        vec![
            winner("SP", "Campinas", "PL", 400),
            winner("SP", "São Paulo", "MDB", 3_000_000),
            winner("SP", "Santos", "PL", 200),
            winner("RJ", "Niterói", "PSD", 300),
            winner("RJ", "Maricá", "PT", 100),
        ]
    }

    #[test]
    fn test_country_totals_and_ranking() {
        let view = country_view(&winners());

        assert_eq!(view.municipalities, 5);
        assert_eq!(view.total_votes, 3_001_000);
        assert_eq!(view.top_winners[0].municipality, "São Paulo");
        assert_eq!(view.party_distribution[0].party, "PL");
        assert_eq!(view.party_distribution[0].municipalities, 2);
        // ties ordered by party code
        let rest: Vec<_> = view.party_distribution[1..]
            .iter()
            .map(|p| p.party.as_str())
            .collect();
        assert_eq!(rest, vec!["MDB", "PSD", "PT"]);
    }

    #[test]
    fn test_top_lists_are_truncated() {
        let many: Vec<Winner> = (0..30)
            .map(|i| winner("MG", &format!("M{:02}", i), &format!("P{:02}", i), i))
            .collect();
        let view = country_view(&many);
        assert_eq!(view.top_winners.len(), TOP_WINNERS);
        assert_eq!(view.party_distribution.len(), TOP_PARTIES);
        assert_eq!(view.top_winners[0].votes, 29);
    }

    #[test]
    fn test_state_view_scopes_to_region() {
        let view = state_view(&winners(), "RJ");

        assert_eq!(view.municipalities, 2);
        assert_eq!(view.total_votes, 400);
        assert_eq!(view.winners[0].municipality, "Niterói");
        assert_eq!(view.leading_party.as_deref(), Some("PSD"));

        let empty = state_view(&winners(), "AC");
        assert_eq!(empty.municipalities, 0);
        assert_eq!(empty.leading_party, None);
    }

    #[test]
    fn test_municipality_view_winner_is_first_candidate() {
        let record = |candidate: &str, votes: u64| VoteRecord {
            region: "SP".to_string(),
            municipality: "São Paulo".to_string(),
            candidate: candidate.to_string(),
            party: "PT".to_string(),
            round: 1,
            office: OfficeType::Mayor,
            votes,
        };
        let records = vec![record("A", 1000), record("B", 900), record("A", 500)];

        let view = municipality_view(&records, "SP", "São Paulo");
        assert_eq!(view.candidates.len(), 2);
        assert_eq!(view.winner.as_ref().map(|w| w.votes), Some(1500));

        let missing = municipality_view(&records, "SP", "Osasco");
        assert!(missing.winner.is_none());
    }

    #[test]
    fn test_navigation_lists() {
        assert_eq!(regions(&winners()), vec!["RJ", "SP"]);
    }

    #[test]
    fn test_format_votes() {
        assert_eq!(format_votes(0), "0");
        assert_eq!(format_votes(999), "999");
        assert_eq!(format_votes(1500), "1.500");
        assert_eq!(format_votes(1_234_567), "1.234.567");
    }
}
