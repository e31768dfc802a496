use serde::Serialize;

/// Calendar colors assigned to doctors by configuration position. Wraps
/// around for rosters larger than the palette.
pub const DOCTOR_COLOR_PALETTE: [&str; 8] = [
    "#2563eb", "#16a34a", "#d97706", "#dc2626", "#7c3aed", "#0891b2", "#db2777", "#65a30d",
];

/// One selectable doctor for listings and booking forms. Backfilled
/// historical doctors carry no color.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorChoice {
    pub id: String,
    pub label: String,
    pub color: Option<String>,
}

/// Stable identifier derived from a configured display label, e.g.
/// "Dr. Lina" -> "dr-lina".
pub fn doctor_slug(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut last_dash = true;
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}
