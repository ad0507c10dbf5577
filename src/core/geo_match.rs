use crate::core::colors::party_color_or_neutral;
use crate::core::normalize::normalize_name;
use crate::domain::model::Winner;
use geojson::{Feature, FeatureCollection, JsonValue};
use std::collections::HashMap;

/// Name used when a feature's area code is missing from the id lookup.
pub const UNKNOWN_NAME: &str = "Unknown";
/// Party shown for a feature without a matching winner.
pub const NO_WINNER_PARTY: &str = "N/A";

#[derive(Debug, Clone)]
pub struct MapLayer {
    pub region: String,
    pub features: FeatureCollection,
    pub matched: usize,
    pub unmatched: usize,
}

/// The map either renders or reports why it cannot; the tables never depend on it.
#[derive(Debug, Clone)]
pub enum MapOutcome {
    Ready(MapLayer),
    Unavailable { region: String, message: String },
}

impl MapOutcome {
    pub fn status(&self) -> String {
        match self {
            MapOutcome::Ready(layer) => format!(
                "ok ({} matched, {} without winner)",
                layer.matched, layer.unmatched
            ),
            MapOutcome::Unavailable { message, .. } => format!("unavailable: {}", message),
        }
    }
}

/// `codarea` as a string; IBGE serves it as either a string or a number.
pub fn area_code(feature: &Feature) -> String {
    match feature.property("codarea") {
        Some(JsonValue::String(code)) => code.clone(),
        Some(JsonValue::Number(code)) => code.to_string(),
        _ => String::new(),
    }
}

/// Attaches name, join key, winning party, votes, candidate and colour to each
/// feature. Features without a name or a winner get sentinel values.
pub fn enrich_features(
    region: &str,
    mut collection: FeatureCollection,
    names: &HashMap<String, String>,
    winners: &[Winner],
) -> MapLayer {
    let mut by_name: HashMap<String, &Winner> = HashMap::new();
    for winner in winners.iter().filter(|w| w.region == region) {
        let key = normalize_name(&winner.municipality);
        if by_name.contains_key(&key) {
            tracing::debug!("{}: duplicate join key {}, keeping first", region, key);
            continue;
        }
        by_name.insert(key, winner);
    }

    let mut matched = 0;
    let mut unmatched = 0;
    for feature in collection.features.iter_mut() {
        let code = area_code(feature);
        let name = names
            .get(&code)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let join_key = normalize_name(&name);
        let winner = by_name.get(&join_key);

        feature.set_property("name", name);
        feature.set_property("name_join_key", join_key);
        match winner {
            Some(winner) => {
                matched += 1;
                feature.set_property("party", winner.party.clone());
                feature.set_property("votes", winner.votes);
                feature.set_property("candidate", winner.candidate.clone());
                feature.set_property("color", party_color_or_neutral(&winner.party));
            }
            None => {
                unmatched += 1;
                feature.set_property("party", NO_WINNER_PARTY);
                feature.set_property("votes", 0u64);
                feature.set_property("candidate", JsonValue::Null);
                feature.set_property("color", party_color_or_neutral(""));
            }
        }
    }

    if unmatched > 0 {
        tracing::info!(
            "🗺️ {}: {} of {} features have no matching winner",
            region,
            unmatched,
            matched + unmatched
        );
    }

    MapLayer {
        region: region.to_string(),
        features: collection,
        matched,
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::colors::NEUTRAL_COLOR;
    use geojson::GeoJson;

    fn collection() -> FeatureCollection {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"codarea": "3550308"},
                 "geometry": {"type": "Point", "coordinates": [-46.6, -23.5]}},
                {"type": "Feature", "properties": {"codarea": 3509502},
                 "geometry": {"type": "Point", "coordinates": [-47.0, -22.9]}},
                {"type": "Feature", "properties": {"codarea": "9999999"},
                 "geometry": {"type": "Point", "coordinates": [-48.0, -22.0]}}
            ]
        }"#;
        match raw.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            other => panic!("unexpected geojson {:?}", other),
        }
    }

    fn names() -> HashMap<String, String> {
        let mut names = HashMap::new();
        names.insert("3550308".to_string(), "São Paulo".to_string());
        names.insert("3509502".to_string(), "Campinas".to_string());
        names
    }

    fn winner(region: &str, municipality: &str, party: &str, votes: u64) -> Winner {
        Winner {
            region: region.to_string(),
            municipality: municipality.to_string(),
            candidate: "A".to_string(),
            party: party.to_string(),
            votes,
        }
    }

    #[test]
    fn test_winner_joined_through_normalized_name() {
        let winners = vec![winner("SP", "SAO PAULO", "PT", 1500)];
        let layer = enrich_features("SP", collection(), &names(), &winners);

        let feature = &layer.features.features[0];
        assert_eq!(feature.property("name").unwrap(), "São Paulo");
        assert_eq!(feature.property("name_join_key").unwrap(), "SAO PAULO");
        assert_eq!(feature.property("party").unwrap(), "PT");
        assert_eq!(feature.property("votes").and_then(JsonValue::as_u64), Some(1500));
        assert_eq!(feature.property("color").unwrap(), "#C0122D");
    }

    #[test]
    fn test_misses_get_sentinels_instead_of_errors() {
        let winners = vec![winner("SP", "São Paulo", "PT", 1500)];
        let layer = enrich_features("SP", collection(), &names(), &winners);

        assert_eq!(layer.matched, 1);
        assert_eq!(layer.unmatched, 2);

        // Campinas has a name but no winner
        let campinas = &layer.features.features[1];
        assert_eq!(campinas.property("party").unwrap(), NO_WINNER_PARTY);
        assert_eq!(campinas.property("votes").and_then(JsonValue::as_u64), Some(0));
        assert_eq!(campinas.property("color").unwrap(), NEUTRAL_COLOR);

        // unknown area code
        let unknown = &layer.features.features[2];
        assert_eq!(unknown.property("name").unwrap(), UNKNOWN_NAME);
        assert_eq!(unknown.property("party").unwrap(), NO_WINNER_PARTY);
    }

    #[test]
    fn test_winners_from_other_regions_are_ignored() {
        let winners = vec![winner("RJ", "Campinas", "PL", 10)];
        let layer = enrich_features("SP", collection(), &names(), &winners);
        assert_eq!(layer.matched, 0);
    }
}
