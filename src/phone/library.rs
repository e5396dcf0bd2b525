//! Boundary to the numbering-plan library.

use crate::error::PhoneLibraryError;
use std::fmt;

/// A number as understood by the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNumber {
    pub country_code: u16,
    pub national_number: u64,
    /// The string that was parsed.
    pub raw_input: String,
    /// Region the number was parsed for.
    pub region: String,
}

/// Parsing and validity checks backed by numbering-plan metadata.
///
/// Implementations must be cheap to share: one instance serves every
/// recognition call.
pub trait PhoneNumberLibrary: Send + Sync + fmt::Debug {
    fn parse(&self, number: &str, region: &str) -> Result<ParsedNumber, PhoneLibraryError>;

    fn is_valid_number(&self, number: &ParsedNumber) -> bool;

    fn is_valid_short_number(&self, number: &ParsedNumber) -> bool;

    fn is_possible_short_number_for_region(&self, number: &ParsedNumber, region: &str) -> bool;
}

/// Adapter over the `phonenumber` crate.
///
/// That crate ships no short-number metadata, so both short-number checks
/// answer `false`.
#[cfg(feature = "phonenumber")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PhonenumberCrate;

#[cfg(feature = "phonenumber")]
impl PhonenumberCrate {
    fn parse_inner(number: &str, region: &str) -> Result<phonenumber::PhoneNumber, PhoneLibraryError> {
        let id = region
            .parse::<phonenumber::country::Id>()
            .map_err(|_| PhoneLibraryError::UnknownRegion(region.to_string()))?;
        phonenumber::parse(Some(id), number).map_err(|err| {
            log::debug!("phonenumber rejected '{number}': {err}");
            PhoneLibraryError::NotANumber(number.to_string())
        })
    }
}

#[cfg(feature = "phonenumber")]
impl PhoneNumberLibrary for PhonenumberCrate {
    fn parse(&self, number: &str, region: &str) -> Result<ParsedNumber, PhoneLibraryError> {
        let parsed = Self::parse_inner(number, region)?;
        Ok(ParsedNumber {
            country_code: parsed.code().value(),
            national_number: parsed.national().value(),
            raw_input: number.to_string(),
            region: region.to_string(),
        })
    }

    fn is_valid_number(&self, number: &ParsedNumber) -> bool {
        Self::parse_inner(&number.raw_input, &number.region).is_ok_and(|parsed| parsed.is_valid())
    }

    fn is_valid_short_number(&self, _number: &ParsedNumber) -> bool {
        false
    }

    fn is_possible_short_number_for_region(&self, _number: &ParsedNumber, _region: &str) -> bool {
        false
    }
}
