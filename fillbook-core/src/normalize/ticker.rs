//! Instrument name normalization for merge fingerprints.
//!
//! Different sources render the same option contract differently:
//! `"AMD 01/23/2026 265.00 C"` (full OCC-style) vs `"AMD 265C"` (shorthand).
//! Normalization strips embedded expiration dates, drops `.00` cent padding,
//! uppercases, and removes whitespace, so both collapse to `"AMD265C"`.

/// Normalize an instrument name to its fingerprint form.
pub fn normalize_ticker(raw: &str) -> String {
    raw.split_whitespace()
        .filter(|token| !is_date_token(token))
        .map(strip_cent_padding)
        .collect::<Vec<_>>()
        .join("")
        .to_uppercase()
}

/// True for MM/DD/YYYY and MM/DD/YY tokens.
fn is_date_token(token: &str) -> bool {
    let parts: Vec<&str> = token.split('/').collect();
    if parts.len() != 3 {
        return false;
    }
    let all_numeric = parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    all_numeric && parts[0].len() <= 2 && parts[1].len() <= 2 && (parts[2].len() == 2 || parts[2].len() == 4)
}

/// Remove a `.00` suffix on a numeric strike, including when a type letter
/// trails it (`265.00C` → `265C`).
fn strip_cent_padding(token: &str) -> String {
    if let Some(pos) = token.find(".00") {
        let after = &token[pos + 3..];
        let before = &token[..pos];
        let before_numeric = !before.is_empty() && before.chars().all(|c| c.is_ascii_digit());
        let after_ok = after.chars().next().map_or(true, |c| !c.is_ascii_digit());
        if before_numeric && after_ok {
            return format!("{before}{after}");
        }
    }
    token.to_string()
}
