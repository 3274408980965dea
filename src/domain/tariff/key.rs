//! Tariff identity

use std::fmt;

/// Canonical (country_code, party_id, tariff_id) identity of a stored tariff.
///
/// Country code and party id are matched case-insensitively, so they are
/// upper-cased once here; every store lookup goes through this form.
/// Whitespace is significant. The tariff id is opaque and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TariffKey {
    country_code: String,
    party_id: String,
    tariff_id: String,
}

impl TariffKey {
    pub fn new(
        country_code: impl AsRef<str>,
        party_id: impl AsRef<str>,
        tariff_id: impl Into<String>,
    ) -> Self {
        Self {
            country_code: country_code.as_ref().to_ascii_uppercase(),
            party_id: party_id.as_ref().to_ascii_uppercase(),
            tariff_id: tariff_id.into(),
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn party_id(&self) -> &str {
        &self.party_id
    }

    pub fn tariff_id(&self) -> &str {
        &self.tariff_id
    }
}

impl fmt::Display for TariffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country_code, self.party_id, self.tariff_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_and_party_are_canonicalized() {
        let key = TariffKey::new("nl", "aBc", "T1");
        assert_eq!(key.country_code(), "NL");
        assert_eq!(key.party_id(), "ABC");
        assert_eq!(key, TariffKey::new("NL", "ABC", "T1"));
    }

    #[test]
    fn surrounding_whitespace_is_kept() {
        let padded = TariffKey::new(" NL", "ABC ", "T1");
        assert_eq!(padded.country_code(), " NL");
        assert_ne!(padded, TariffKey::new("NL", "ABC", "T1"));
    }

    #[test]
    fn tariff_id_is_case_sensitive() {
        assert_ne!(TariffKey::new("NL", "ABC", "t1"), TariffKey::new("NL", "ABC", "T1"));
    }

    #[test]
    fn display_joins_components() {
        assert_eq!(TariffKey::new("de", "all", "12").to_string(), "DE/ALL/12");
    }
}
