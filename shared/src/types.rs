//! Common types used across the services

use serde::{Deserialize, Serialize};

/// Canonical location key for a field or region.
///
/// Every entry point normalizes raw input through [`Location::parse`], so
/// `"cork"`, `"CORK"` and `"  Cork "` all resolve to the same key. Lookup
/// tables are keyed by this normalized form only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Normalize a raw location string: trim, collapse inner whitespace and
    /// title-case each word.
    pub fn parse(raw: &str) -> Result<Self, &'static str> {
        let words: Vec<String> = raw.split_whitespace().map(title_case).collect();
        if words.is_empty() {
            return Err("Location must not be empty");
        }
        Ok(Self(words.join(" ")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Temperature trend relative to the comfort line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
}

/// 8-point compass direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassDirection {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::N,
        CompassDirection::Ne,
        CompassDirection::E,
        CompassDirection::Se,
        CompassDirection::S,
        CompassDirection::Sw,
        CompassDirection::W,
        CompassDirection::Nw,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            CompassDirection::N => "N",
            CompassDirection::Ne => "NE",
            CompassDirection::E => "E",
            CompassDirection::Se => "SE",
            CompassDirection::S => "S",
            CompassDirection::Sw => "SW",
            CompassDirection::W => "W",
            CompassDirection::Nw => "NW",
        }
    }
}

impl std::fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
