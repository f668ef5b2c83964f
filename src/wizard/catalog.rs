/// Fixed option sets offered by the registration screens
///
/// Courts are a closed enumeration because the draft keys its court map by
/// court id; the other catalogs are plain id lists the front end renders.

use serde::{Deserialize, Serialize};

/// Court identifiers a marketplace lawyer can declare experience in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtId {
    General,
    Criminal,
    Personal,
    Commercial,
    Labor,
    Admin,
}

impl CourtId {
    pub const ALL: [CourtId; 6] = [
        CourtId::General,
        CourtId::Criminal,
        CourtId::Personal,
        CourtId::Commercial,
        CourtId::Labor,
        CourtId::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourtId::General => "general",
            CourtId::Criminal => "criminal",
            CourtId::Personal => "personal",
            CourtId::Commercial => "commercial",
            CourtId::Labor => "labor",
            CourtId::Admin => "admin",
        }
    }

    /// Display name sent along with the court entry
    pub fn display_name(&self) -> &'static str {
        match self {
            CourtId::General => "General Court",
            CourtId::Criminal => "Criminal Court",
            CourtId::Personal => "Personal Status Court",
            CourtId::Commercial => "Commercial Court",
            CourtId::Labor => "Labor Court",
            CourtId::Admin => "Board of Grievances",
        }
    }
}

impl std::fmt::Display for CourtId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const SPECIALIZATIONS: &[&str] = &[
    "labor",
    "commercial",
    "companies",
    "realestate",
    "criminal",
    "family",
    "admin",
    "arbitration",
    "ip",
    "banking",
];

pub const LANGUAGES: &[&str] = &[
    "arabic", "english", "chinese", "hindi", "spanish", "french", "bengali", "portuguese",
    "russian", "japanese", "german", "korean", "turkish", "italian", "persian", "urdu",
];

pub const DEFAULT_LANGUAGE: &str = "arabic";

pub const WORK_TYPES: &[&str] = &[
    "law_firm",
    "private_sector",
    "freelance",
    "government",
    "legal_department",
];

/// Case-count buckets a lawyer reports per court
pub const CASE_RANGES: &[&str] = &["1-10", "11-30", "31-50", "51-100", "+100"];

pub const REGIONS: &[&str] = &[
    "riyadh",
    "makkah",
    "madinah",
    "qassim",
    "eastern",
    "asir",
    "tabuk",
    "hail",
    "northern_borders",
    "jazan",
    "najran",
    "baha",
    "jouf",
];

pub const PRICING_MODELS: &[&str] = &["hourly", "fixed", "contingency", "retainer"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_court_ids_are_unique() {
        let mut names: Vec<&str> = CourtId::ALL.iter().map(|c| c.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CourtId::ALL.len());
    }

    #[test]
    fn test_court_id_serializes_lowercase() {
        let json = serde_json::to_string(&CourtId::Labor).unwrap();
        assert_eq!(json, "\"labor\"");
    }

    #[test]
    fn test_default_language_is_offered() {
        assert!(LANGUAGES.contains(&DEFAULT_LANGUAGE));
    }
}
