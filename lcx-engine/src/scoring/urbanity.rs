//! CBS urbanity ("mate van stedelijkheid") classification
//!
//! CBS publishes urbanity as a five-step scale keyed on address density.
//! The raw value may arrive as a Dutch label, an English label or a numeral.

/// Urbanity category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urbanity {
    /// Level 1: 2500+ addresses/km²
    VeryStrong,
    /// Level 2: 1500-2500 addresses/km²
    Strong,
    /// Level 3: 1000-1500 addresses/km²
    Moderate,
    /// Level 4: 500-1000 addresses/km²
    Slight,
    /// Level 5: fewer than 500 addresses/km²
    NotUrban,
    Unrecognized,
}

impl Urbanity {
    /// Normalize a raw category string; whitespace and case are ignored
    pub fn parse(raw: &str) -> Self {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match normalized.as_str() {
            "1" | "zeer sterk stedelijk" | "very strongly urban" => Urbanity::VeryStrong,
            "2" | "sterk stedelijk" | "strongly urban" => Urbanity::Strong,
            "3" | "matig stedelijk" | "moderately urban" => Urbanity::Moderate,
            "4" | "weinig stedelijk" | "slightly urban" | "hardly urban" => Urbanity::Slight,
            "5" | "niet stedelijk" | "not urban" => Urbanity::NotUrban,
            _ => Urbanity::Unrecognized,
        }
    }

    /// Ordinal level 1 (very strongly urban) to 5 (not urban)
    pub fn level(self) -> Option<u8> {
        match self {
            Urbanity::VeryStrong => Some(1),
            Urbanity::Strong => Some(2),
            Urbanity::Moderate => Some(3),
            Urbanity::Slight => Some(4),
            Urbanity::NotUrban => Some(5),
            Urbanity::Unrecognized => None,
        }
    }

    /// Livability score; moderate urbanity is the optimum
    pub fn score(self) -> Option<f64> {
        match self {
            Urbanity::VeryStrong => Some(65.0),
            Urbanity::Strong => Some(85.0),
            Urbanity::Moderate => Some(100.0),
            Urbanity::Slight => Some(85.0),
            Urbanity::NotUrban => Some(70.0),
            Urbanity::Unrecognized => None,
        }
    }
}
