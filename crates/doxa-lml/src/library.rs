/*
 * library.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Library identifiers of the form `language_country_realm`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryIdError {
    #[error("invalid library \"{0}\", expected language_country_realm")]
    Malformed(String),
}

/// Identifies a library of liturgical texts, e.g. `en_us_dedes`.
///
/// Parsing accepts any case. The canonical form is all lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LibraryId {
    language: String,
    country: String,
    realm: String,
}

impl LibraryId {
    pub fn new(language: &str, country: &str, realm: &str) -> Result<Self, LibraryIdError> {
        format!("{language}_{country}_{realm}").parse()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }
}

impl FromStr for LibraryId {
    type Err = LibraryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('_').collect();
        let valid = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric());
        match parts.as_slice() {
            [language, country, realm] if valid(*language) && valid(*country) && valid(*realm) => {
                Ok(LibraryId {
                    language: language.to_ascii_lowercase(),
                    country: country.to_ascii_lowercase(),
                    realm: realm.to_ascii_lowercase(),
                })
            }
            _ => Err(LibraryIdError::Malformed(s.to_string())),
        }
    }
}

impl TryFrom<String> for LibraryId {
    type Error = LibraryIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LibraryId> for String {
    fn from(value: LibraryId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.language, self.country, self.realm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form_is_lowercase() {
        let id: LibraryId = "en_US_dedes".parse().unwrap();
        assert_eq!(id.to_string(), "en_us_dedes");
        assert_eq!(id.country(), "us");
    }

    #[test]
    fn test_new_validates() {
        assert_eq!(
            LibraryId::new("gr", "gr", "cog").unwrap().to_string(),
            "gr_gr_cog"
        );
        assert!(LibraryId::new("gr", "", "cog").is_err());
    }

    #[test]
    fn test_malformed() {
        for bad in ["en_us", "en_us_dedes_x", "", "en-us-dedes", "en__dedes"] {
            assert_eq!(
                bad.parse::<LibraryId>(),
                Err(LibraryIdError::Malformed(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id: LibraryId = "EN_us_Dedes".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"en_us_dedes\"");
        let back: LibraryId = serde_json::from_str("\"en_us_dedes\"").unwrap();
        assert_eq!(back, id);
    }
}
