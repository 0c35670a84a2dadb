//! Phone number normalization.
//!
//! Numbers are stored in E.164. Input without an international prefix is
//! interpreted in the configured default region.

use std::{fmt, str::FromStr};

use phonenumber::{Mode, country};

use crate::{EngineError, ResultEngine};

pub(crate) const INVALID_PHONE_MESSAGE: &str = "Enter a valid phone number (e.g. +16502530000).";

/// Default region used to parse national phone numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhoneRegion(country::Id);

impl PhoneRegion {
    /// Two letter ISO 3166-1 region code.
    pub fn code(&self) -> String {
        format!("{:?}", self.0)
    }

    /// Parse and validate `raw`, returning its E.164 form.
    ///
    /// Returns `None` when the input is not a valid number for any region.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let number = phonenumber::parse(Some(self.0), raw.trim()).ok()?;
        if !phonenumber::is_valid(&number) {
            return None;
        }
        Some(number.format().mode(Mode::E164).to_string())
    }
}

impl Default for PhoneRegion {
    fn default() -> Self {
        Self(country::Id::US)
    }
}

impl FromStr for PhoneRegion {
    type Err = EngineError;

    fn from_str(value: &str) -> ResultEngine<Self> {
        let code = value.trim().to_ascii_uppercase();
        code.parse::<country::Id>()
            .map(Self)
            .map_err(|_| EngineError::InvalidConfig(format!("unknown phone region: {value}")))
    }
}

impl fmt::Display for PhoneRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn national_number_uses_region() {
        let region: PhoneRegion = "ru".parse().unwrap();
        assert_eq!(region.normalize("8 (916) 123-45-67"), Some("+79161234567".to_string()));
    }

    #[test]
    fn international_number_ignores_region() {
        let region: PhoneRegion = "RU".parse().unwrap();
        assert_eq!(region.normalize("+1 650-253-0000"), Some("+16502530000".to_string()));
    }

    #[test]
    fn garbage_is_rejected() {
        let region = PhoneRegion::default();
        assert_eq!(region.normalize("not a phone"), None);
        assert_eq!(region.normalize("123"), None);
    }

    #[test]
    fn unknown_region_is_a_config_error() {
        assert!(matches!(
            "XX1".parse::<PhoneRegion>(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn region_code_round_trips() {
        let region: PhoneRegion = "de".parse().unwrap();
        assert_eq!(region.code(), "DE");
    }
}
