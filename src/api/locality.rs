//! Region and zone handling for locality-qualified resource identifiers.
//!
//! The declarative engine persists identifiers in the `locality/uuid` form
//! (for example `fr-par/11111111-…`) so that a recorded resource can be
//! re-resolved without extra configuration. User input accepts both the
//! qualified and the bare form.

use std::fmt;

use thiserror::Error;

macro_rules! locality_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw locality string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrows the locality as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

locality_newtype!(Region, "Scaleway region (for example `fr-par`).");
locality_newtype!(Zone, "Scaleway availability zone (for example `fr-par-1`).");

impl Zone {
    /// Region the zone belongs to (`fr-par-1` → `fr-par`).
    ///
    /// Zones without a numeric suffix map onto themselves.
    #[must_use]
    pub fn region(&self) -> Region {
        self.0
            .rsplit_once('-')
            .filter(|(_, suffix)| suffix.chars().all(|c| c.is_ascii_digit()))
            .map_or_else(|| Region::from(self.as_str()), |(region, _)| Region::from(region))
    }
}

/// Region-qualified resource identifier, rendered as `region/id`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegionalId {
    /// Region the resource lives in.
    pub region: Region,
    /// Provider identifier within the region.
    pub id: String,
}

impl RegionalId {
    /// Qualifies a bare identifier with its region.
    #[must_use]
    pub fn new(region: Region, id: impl Into<String>) -> Self {
        Self {
            region,
            id: id.into(),
        }
    }

    /// Parses a `region/id` string persisted by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`LocalityError::MalformedId`] when either side of the
    /// separator is missing.
    pub fn parse(raw: &str) -> Result<Self, LocalityError> {
        let Some((region, id)) = raw.split_once('/') else {
            return Err(LocalityError::MalformedId(raw.to_owned()));
        };
        if region.is_empty() || id.is_empty() {
            return Err(LocalityError::MalformedId(raw.to_owned()));
        }
        Ok(Self {
            region: Region::from(region),
            id: id.to_owned(),
        })
    }
}

impl fmt::Display for RegionalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.id)
    }
}

/// Zone-qualified resource identifier, rendered as `zone/id`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ZonalId {
    /// Zone the resource lives in.
    pub zone: Zone,
    /// Provider identifier within the zone.
    pub id: String,
}

impl ZonalId {
    /// Qualifies a bare identifier with its zone.
    #[must_use]
    pub fn new(zone: Zone, id: impl Into<String>) -> Self {
        Self {
            zone,
            id: id.into(),
        }
    }

    /// Parses a `zone/id` string persisted by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`LocalityError::MalformedId`] when either side of the
    /// separator is missing.
    pub fn parse(raw: &str) -> Result<Self, LocalityError> {
        let Some((zone, id)) = raw.split_once('/') else {
            return Err(LocalityError::MalformedId(raw.to_owned()));
        };
        if zone.is_empty() || id.is_empty() {
            return Err(LocalityError::MalformedId(raw.to_owned()));
        }
        Ok(Self {
            zone: Zone::from(zone),
            id: id.to_owned(),
        })
    }
}

impl fmt::Display for ZonalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone, self.id)
    }
}

/// Strips a leading locality qualifier from an identifier, accepting both
/// the qualified (`fr-par/uuid`) and the bare (`uuid`) form.
#[must_use]
pub fn expand_id(raw: &str) -> &str {
    raw.split_once('/').map_or(raw, |(_, id)| id)
}

/// Errors raised while handling locality-qualified identifiers.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LocalityError {
    /// Raised when an identifier is not of the form `locality/id`.
    #[error("malformed locality-qualified id: {0}")]
    MalformedId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_id_round_trips() {
        let parsed = RegionalId::parse("fr-par/abc-123")
            .unwrap_or_else(|err| panic!("parse should succeed: {err}"));
        assert_eq!(parsed.region.as_str(), "fr-par");
        assert_eq!(parsed.id, "abc-123");
        assert_eq!(parsed.to_string(), "fr-par/abc-123");
    }

    #[test]
    fn regional_id_rejects_bare_ids() {
        let result = RegionalId::parse("abc-123");
        assert!(matches!(result, Err(LocalityError::MalformedId(_))));
    }

    #[test]
    fn regional_id_rejects_empty_sides() {
        assert!(RegionalId::parse("/abc").is_err());
        assert!(RegionalId::parse("fr-par/").is_err());
    }

    #[test]
    fn expand_id_strips_qualifier() {
        assert_eq!(expand_id("fr-par/abc"), "abc");
        assert_eq!(expand_id("abc"), "abc");
    }

    #[test]
    fn zone_derives_its_region() {
        assert_eq!(Zone::from("fr-par-1").region().as_str(), "fr-par");
        assert_eq!(Zone::from("nl-ams-3").region().as_str(), "nl-ams");
    }
}
