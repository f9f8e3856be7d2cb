//! Label name normalization

/// Label used when a chart row carries no label at all
pub const INDEPENDENT: &str = "Independent";

/// Sheet abbreviations and aliases to display names
const LABEL_MAPPINGS: &[(&str, &str)] = &[
    ("PROV", "Provident"),
    ("Provident", "Provident"),
    ("CCMG", "CCMG"),
    ("10KP", "CCMG"),
    ("12CM", "CCMG"),
    ("ADA", "ADA"),
    ("ORCHARD", "THE ORCHARD"),
    ("THE ORCHARD", "THE ORCHARD"),
    ("INDI", "Independent"),
    ("TRBL", "Tribl"),
    ("COL", "Columbia"),
    ("DEF", "Def Jam"),
];

/// Map a raw label to its display name.
///
/// Unknown labels pass through unchanged; a missing or empty label becomes
/// [`INDEPENDENT`].
pub fn map_label_name(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or_default();
    if let Some((_, mapped)) = LABEL_MAPPINGS.iter().find(|(alias, _)| *alias == raw) {
        return (*mapped).to_string();
    }
    if raw.is_empty() {
        INDEPENDENT.to_string()
    } else {
        raw.to_string()
    }
}
