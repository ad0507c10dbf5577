use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 27 個聯邦單位（26 州 + DF）
pub const BRAZILIAN_STATES: [&str; 27] = [
    "AC", "AL", "AM", "AP", "BA", "CE", "DF", "ES", "GO", "MA", "MG", "MS", "MT", "PA", "PB",
    "PE", "PI", "PR", "RJ", "RN", "RO", "RR", "RS", "SC", "SE", "SP", "TO",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum OfficeType {
    /// Prefeito
    Mayor,
    /// Vereador
    Councillor,
}

impl OfficeType {
    /// Value of the office column in the TSE files.
    pub fn label(&self) -> &'static str {
        match self {
            OfficeType::Mayor => "Prefeito",
            OfficeType::Councillor => "Vereador",
        }
    }

    pub fn matches(&self, column_value: &str) -> bool {
        column_value.trim().eq_ignore_ascii_case(self.label())
    }
}

impl fmt::Display for OfficeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OfficeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mayor" | "prefeito" => Ok(OfficeType::Mayor),
            "councillor" | "vereador" => Ok(OfficeType::Councillor),
            other => Err(format!("unknown office type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum RoundSelection {
    FirstRound,
    SecondRound,
    /// Last round held in each municipality.
    FinalWinners,
    /// No filtering. Totals double count candidates present in both rounds.
    AllRounds,
}

impl RoundSelection {
    pub fn slug(&self) -> &'static str {
        match self {
            RoundSelection::FirstRound => "round1",
            RoundSelection::SecondRound => "round2",
            RoundSelection::FinalWinners => "final",
            RoundSelection::AllRounds => "all",
        }
    }
}

impl Default for RoundSelection {
    fn default() -> Self {
        RoundSelection::FinalWinners
    }
}

impl FromStr for RoundSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_round" | "round1" | "1" => Ok(RoundSelection::FirstRound),
            "second_round" | "round2" | "2" => Ok(RoundSelection::SecondRound),
            "final_winners" | "final" => Ok(RoundSelection::FinalWinners),
            "all_rounds" | "all" => Ok(RoundSelection::AllRounds),
            other => Err(format!("unknown round selection: {}", other)),
        }
    }
}

/// One result row: a candidate's votes in one polling zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub region: String,
    pub municipality: String,
    pub candidate: String,
    pub party: String,
    pub round: u8,
    pub office: OfficeType,
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTally {
    pub region: String,
    pub municipality: String,
    pub candidate: String,
    pub party: String,
    pub votes: u64,
}

/// Tally with the most votes in a municipality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub region: String,
    pub municipality: String,
    pub candidate: String,
    pub party: String,
    pub votes: u64,
}

impl From<AggregatedTally> for Winner {
    fn from(tally: AggregatedTally) -> Self {
        Self {
            region: tally.region,
            municipality: tally.municipality,
            candidate: tally.candidate,
            party: tally.party,
            votes: tally.votes,
        }
    }
}

/// A region that could not be loaded. The load carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionWarning {
    pub region: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub records: Arc<Vec<VoteRecord>>,
    pub warnings: Vec<RegionWarning>,
}

impl LoadedDataset {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum NavigationLevel {
    Country,
    State { region: String },
    Municipality { region: String, municipality: String },
}

impl NavigationLevel {
    pub fn slug(&self) -> String {
        match self {
            NavigationLevel::Country => "brasil".to_string(),
            NavigationLevel::State { region } => region.to_lowercase(),
            NavigationLevel::Municipality {
                region,
                municipality,
            } => format!(
                "{}_{}",
                region.to_lowercase(),
                crate::core::normalize::normalize_name(municipality)
                    .to_lowercase()
                    .replace(|c: char| !c.is_ascii_alphanumeric(), "-")
            ),
        }
    }
}

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub office: OfficeType,
    pub round: RoundSelection,
    pub level: NavigationLevel,
}

impl ReportRequest {
    pub fn country(office: OfficeType, round: RoundSelection) -> Self {
        Self {
            office,
            round,
            level: NavigationLevel::Country,
        }
    }

    pub fn bundle_name(&self) -> String {
        format!(
            "report_{}_{}_{}.zip",
            self.office.label().to_lowercase(),
            crate::core::rounds::effective_selection(self.office, self.round).slug(),
            self.level.slug()
        )
    }
}

/// Everything produced for one request, ready to be written out.
#[derive(Debug, Clone)]
pub struct ElectionReport {
    pub request: ReportRequest,
    pub effective_round: RoundSelection,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub warnings: Vec<RegionWarning>,
    /// One winner per municipality, every region.
    pub winners: Vec<Winner>,
    pub country: crate::core::views::CountryView,
    pub state: Option<crate::core::views::StateView>,
    pub map: Option<crate::core::geo_match::MapOutcome>,
    pub municipality: Option<crate::core::views::MunicipalityView>,
}
