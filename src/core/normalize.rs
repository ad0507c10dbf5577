use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Join key for municipality names: NFD, combining marks dropped, upper case.
///
/// Must be applied to both the election side and the geometry side of a join.
pub fn normalize_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Join key for a name that may be absent, e.g. a blank `NM_MUNICIPIO` cell.
///
/// `None` and `""` both give the empty key, which never matches a municipality.
pub fn normalize_optional(name: Option<&str>) -> String {
    name.map(normalize_name).unwrap_or_default()
}
