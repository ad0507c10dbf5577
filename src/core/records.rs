//! Parser for the TSE `votacao_candidato_munzona` exports.
//!
//! Files are `;`-delimited and latin1 encoded. The office column has been
//! published under two names over the years, so both are probed.

use crate::domain::model::{OfficeType, VoteRecord};
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, StringRecord};

pub const REGION_COLUMN: &str = "SG_UF";
pub const MUNICIPALITY_COLUMN: &str = "NM_MUNICIPIO";
pub const CANDIDATE_COLUMN: &str = "NM_URNA_CANDIDATO";
pub const PARTY_COLUMN: &str = "SG_PARTIDO";
pub const ROUND_COLUMN: &str = "NR_TURNO";
pub const VOTES_COLUMN: &str = "QT_VOTOS_NOMINAIS_VALIDOS";
/// Probed in order; the first one present wins.
pub const OFFICE_COLUMNS: [&str; 2] = ["DS_CARGO", "NM_TIPO_ELEICAO"];

/// ISO-8859-1 maps every byte to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    region: usize,
    municipality: usize,
    candidate: usize,
    party: usize,
    round: usize,
    office: usize,
    votes: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord, region: &str) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| EtlError::SchemaError {
                region: region.to_string(),
                message: format!("missing column {}", name),
            })
        };

        let office = OFFICE_COLUMNS
            .iter()
            .find_map(|&name| find(name))
            .ok_or_else(|| EtlError::SchemaError {
                region: region.to_string(),
                message: format!("missing office column (tried {})", OFFICE_COLUMNS.join(", ")),
            })?;

        Ok(Self {
            region: require(REGION_COLUMN)?,
            municipality: require(MUNICIPALITY_COLUMN)?,
            candidate: require(CANDIDATE_COLUMN)?,
            party: require(PARTY_COLUMN)?,
            round: require(ROUND_COLUMN)?,
            office,
            votes: require(VOTES_COLUMN)?,
        })
    }
}

/// Parses one region file, keeping only rows for `office`.
pub fn parse_region_file(region: &str, bytes: &[u8], office: OfficeType) -> Result<Vec<VoteRecord>> {
    let text = decode_latin1(bytes);
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(text.as_bytes());

    let layout = ColumnLayout::from_headers(reader.headers()?, region)?;
    tracing::debug!("{}: column layout {:?}", region, layout);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |index: usize| row.get(index).unwrap_or("").trim();

        if !office.matches(field(layout.office)) {
            continue;
        }

        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let round: u8 = field(layout.round)
            .parse()
            .ok()
            .filter(|r| *r == 1 || *r == 2)
            .ok_or_else(|| EtlError::SchemaError {
                region: region.to_string(),
                message: format!("line {}: invalid round '{}'", line, field(layout.round)),
            })?;
        let votes: u64 = field(layout.votes).parse().map_err(|_| EtlError::SchemaError {
            region: region.to_string(),
            message: format!("line {}: invalid vote count '{}'", line, field(layout.votes)),
        })?;

        records.push(VoteRecord {
            region: field(layout.region).to_string(),
            municipality: field(layout.municipality).to_string(),
            candidate: field(layout.candidate).to_string(),
            party: field(layout.party).to_string(),
            round,
            office,
            votes,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\"SG_UF\";\"NM_MUNICIPIO\";\"NM_URNA_CANDIDATO\";\"SG_PARTIDO\";\"NR_TURNO\";\"DS_CARGO\";\"QT_VOTOS_NOMINAIS_VALIDOS\"";

    fn latin1(text: &str) -> Vec<u8> {
        text.chars().map(|c| c as u32 as u8).collect()
    }

    #[test]
    fn test_parses_latin1_rows_for_requested_office() {
        let file = format!(
            "{}\n\"SP\";\"São Paulo\";\"A\";\"PT\";\"1\";\"Prefeito\";\"1000\"\n\"SP\";\"São Paulo\";\"V\";\"PL\";\"1\";\"Vereador\";\"10\"\n",
            HEADER
        );

        let records = parse_region_file("SP", &latin1(&file), OfficeType::Mayor).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].municipality, "São Paulo");
        assert_eq!(records[0].votes, 1000);
        assert_eq!(records[0].round, 1);
    }

    #[test]
    fn test_probes_alternate_office_column() {
        let file = "SG_UF;NM_MUNICIPIO;NM_URNA_CANDIDATO;SG_PARTIDO;NR_TURNO;NM_TIPO_ELEICAO;QT_VOTOS_NOMINAIS_VALIDOS\n\
                    RJ;Niterói;C;PSD;2;Prefeito;700\n";

        let records = parse_region_file("RJ", &latin1(file), OfficeType::Mayor).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].round, 2);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let file = "SG_UF;NM_MUNICIPIO;NM_URNA_CANDIDATO;SG_PARTIDO;NR_TURNO;QT_VOTOS_NOMINAIS_VALIDOS\nSP;X;A;PT;1;10\n";

        let err = parse_region_file("SP", file.as_bytes(), OfficeType::Mayor).unwrap_err();
        assert!(matches!(err, EtlError::SchemaError { .. }));
    }

    #[test]
    fn test_invalid_round_is_rejected() {
        let file = format!("{}\nSP;X;A;PT;3;Prefeito;10\n", HEADER);

        let err = parse_region_file("SP", file.as_bytes(), OfficeType::Mayor).unwrap_err();
        assert!(err.to_string().contains("invalid round"));
    }

    #[test]
    fn test_rows_of_other_offices_are_not_validated() {
        let file = format!(
            "{}\nSP;X;A;PT;1;Prefeito;10\nSP;X;B;PL;#NULO#;Vereador;-\n",
            HEADER
        );

        let records = parse_region_file("SP", file.as_bytes(), OfficeType::Mayor).unwrap();
        assert_eq!(records.len(), 1);
    }
}
