/// Fill colour for parties missing from the table.
pub const NEUTRAL_COLOR: &str = "#cccccc";

// Includes historical names of the same party (PRB/REPUBLICANOS, PFL/DEM, PPS/CIDADANIA, ...).
const PARTY_COLORS: &[(&str, &str)] = &[
    ("AVANTE", "#2eacb2"),
    ("CIDADANIA", "#ec008c"),
    ("DC", "#c89721"),
    ("DEM", "#8CC63E"),
    ("MDB", "#009959"),
    ("NOVO", "#ec671c"),
    ("PCB", "#a8231c"),
    ("PCDOB", "#800314"),
    ("PCO", "#9F030A"),
    ("PDS", "#0067A5"),
    ("PDT", "#FE8E6D"),
    ("PEN", "#4AA561"),
    ("PFL", "#8CC63E"),
    ("PHS", "#8A191E"),
    ("PL", "#30306C"),
    ("PMB", "#FF69B4"),
    ("PMN", "#CF7676"),
    ("PODE", "#00d663"),
    ("PP", "#54b8ea"),
    ("PPL", "#9ACD32"),
    ("PPS", "#ec008c"),
    ("PRB", "#005CA9"),
    ("REPUBLICANOS", "#005CA9"),
    ("PROS", "#f48c24"),
    ("PRTB", "#2cb53f"),
    ("PSB", "#FFCC00"),
    ("PSC", "#006f41"),
    ("PSD", "#ffa400"),
    ("PSDB", "#0080FF"),
    ("PSL", "#054577"),
    ("PSOL", "#68018D"),
    ("PSTU", "#c92127"),
    ("PT", "#C0122D"),
    ("PTB", "#005533"),
    ("PTC", "#01369E"),
    ("PTN", "#00d663"),
    ("PV", "#01652F"),
    ("REDE", "#3ca08c"),
    ("SD", "#f37021"),
    ("SOLIDARIEDADE", "#f37021"),
    ("UNIÃO", "#00A0DF"),
    ("UNIAO", "#00A0DF"),
    ("UP", "#000000"),
];

pub fn party_color(party: &str) -> Option<&'static str> {
    let code = party.trim();
    PARTY_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(code))
        .map(|(_, color)| *color)
}

pub fn party_color_or_neutral(party: &str) -> &'static str {
    party_color(party).unwrap_or(NEUTRAL_COLOR)
}
