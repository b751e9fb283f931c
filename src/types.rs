use serde::{Deserialize, Serialize};

use crate::config::YAW_SCALE;

// ---------------------------------------------------------------------------
// GameFactor
// ---------------------------------------------------------------------------

/// One supported game's yaw multiplier: in-game degrees per raw mouse count
/// at sensitivity 1.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFactor {
    pub id: i64,
    /// Name as stored (e.g. "CSGO").
    pub name: String,
    /// Fixed point, units of 1e-8.
    pub yaw_multiplier_e8: i64,
}

impl GameFactor {
    pub fn yaw_multiplier(&self) -> f64 {
        self.yaw_multiplier_e8 as f64 / YAW_SCALE
    }

    /// Case-insensitive key used by the catalog.
    pub fn key(&self) -> String {
        lookup_key(&self.name)
    }

    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Lowercased, whitespace-trimmed form of a game name.
pub fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// First character upper-cased, the rest lower-cased: "CSGO" -> "Csgo",
/// "Apex Legends" -> "Apex legends".
pub fn display_name(name: &str) -> String {
    let lower = lookup_key(name);
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts a decimal multiplier to fixed point. Returns None for values that
/// are not finite or do not survive as a positive 8-digit quantity.
pub fn multiplier_to_e8(multiplier: f64) -> Option<i64> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return None;
    }
    let scaled = (multiplier * YAW_SCALE).round();
    if scaled < 1.0 || scaled > i64::MAX as f64 {
        return None;
    }
    Some(scaled as i64)
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// One conversion as submitted by a caller. DPI values are signed so that
/// negative input reaches the converter and is rejected as a magnitude error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source_game: String,
    pub target_game: String,
    pub source_sensitivity: f64,
    pub source_mouse_dpi: i64,
    pub target_mouse_dpi: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub target_sensitivity: f64,
    pub cm_360: f64,
    pub in_360: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_capitalizes_first_letter_only() {
        assert_eq!(display_name("CSGO"), "Csgo");
        assert_eq!(display_name("Apex Legends"), "Apex legends");
        assert_eq!(display_name("destiny 2"), "Destiny 2");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn lookup_key_ignores_case_and_padding() {
        assert_eq!(lookup_key("  VALORANT "), "valorant");
        assert_eq!(lookup_key("Call of Duty"), "call of duty");
    }

    #[test]
    fn multiplier_keeps_eight_digits() {
        assert_eq!(multiplier_to_e8(0.07), Some(7_000_000));
        assert_eq!(multiplier_to_e8(0.00333333), Some(333_333));
        assert_eq!(multiplier_to_e8(2.291831), Some(229_183_100));
    }

    #[test]
    fn multiplier_rejects_non_positive() {
        assert_eq!(multiplier_to_e8(0.0), None);
        assert_eq!(multiplier_to_e8(-0.022), None);
        assert_eq!(multiplier_to_e8(f64::NAN), None);
        // rounds to zero at 8 digits
        assert_eq!(multiplier_to_e8(0.000000001), None);
    }
}
