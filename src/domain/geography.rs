use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::DEFAULT_BOROUGH_TABLE_VERSION;
use crate::error::{FeedError, Result};

/// Opaque join key into geographic boundary data (a FIPS code in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeographyId(String);

impl GeographyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeographyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five New York City boroughs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Borough {
    Bronx,
    Brooklyn,
    Manhattan,
    Queens,
    #[serde(rename = "Staten Island")]
    StatenIsland,
}

impl Borough {
    pub const ALL: [Borough; 5] = [
        Borough::Bronx,
        Borough::Brooklyn,
        Borough::Manhattan,
        Borough::Queens,
        Borough::StatenIsland,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Borough::Bronx => "Bronx",
            Borough::Brooklyn => "Brooklyn",
            Borough::Manhattan => "Manhattan",
            Borough::Queens => "Queens",
            Borough::StatenIsland => "Staten Island",
        }
    }

    /// Two-letter code NYC Health uses as a column prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Borough::Bronx => "BX",
            Borough::Brooklyn => "BK",
            Borough::Manhattan => "MN",
            Borough::Queens => "QN",
            Borough::StatenIsland => "SI",
        }
    }

    /// Resolve a borough from its display name or column code, ignoring case.
    pub fn parse(identifier: &str) -> Option<Borough> {
        let wanted = identifier.trim();
        Borough::ALL.into_iter().find(|b| {
            b.name().eq_ignore_ascii_case(wanted) || b.code().eq_ignore_ascii_case(wanted)
        })
    }
}

impl fmt::Display for Borough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Versioned, immutable mapping from borough to geography id.
///
/// The table is configuration, not data: it is built once (either the
/// built-in default or from the config file) and handed to the feed
/// normalizers. Every borough must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoroughGeography {
    version: String,
    ids: BTreeMap<Borough, GeographyId>,
}

impl BoroughGeography {
    /// Built-in county FIPS codes for the five boroughs.
    pub fn nyc_default() -> Self {
        let ids = [
            (Borough::Bronx, "36005"),
            (Borough::Brooklyn, "36047"),
            (Borough::Manhattan, "36061"),
            (Borough::Queens, "36081"),
            (Borough::StatenIsland, "36085"),
        ]
        .into_iter()
        .map(|(b, id)| (b, GeographyId::new(id)))
        .collect();

        Self {
            version: DEFAULT_BOROUGH_TABLE_VERSION.to_string(),
            ids,
        }
    }

    /// Build a table from `(borough identifier, geography id)` pairs.
    pub fn from_entries<I, K, V>(version: impl Into<String>, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(FeedError::Configuration(
                "borough geography table needs a non-empty version".to_string(),
            ));
        }

        let mut ids = BTreeMap::new();
        for (key, id) in entries {
            let borough = Borough::parse(key.as_ref()).ok_or_else(|| {
                FeedError::Configuration(format!(
                    "unknown borough '{}' in geography table {}",
                    key.as_ref(),
                    version
                ))
            })?;
            let id = id.into();
            if id.trim().is_empty() {
                return Err(FeedError::Configuration(format!(
                    "empty geography id for {} in table {}",
                    borough, version
                )));
            }
            if ids.insert(borough, GeographyId::new(id.trim())).is_some() {
                return Err(FeedError::Configuration(format!(
                    "borough {} listed twice in table {}",
                    borough, version
                )));
            }
        }

        let missing: Vec<&str> = Borough::ALL
            .iter()
            .filter(|b| !ids.contains_key(b))
            .map(|b| b.name())
            .collect();
        if !missing.is_empty() {
            return Err(FeedError::Configuration(format!(
                "geography table {} is missing boroughs: {}",
                version,
                missing.join(", ")
            )));
        }

        Ok(Self { version, ids })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn geography_id(&self, borough: Borough) -> &GeographyId {
        // Construction guarantees all five boroughs are present.
        &self.ids[&borough]
    }

    /// Resolve a raw identifier found in a feed to its borough and geography id.
    pub fn lookup(&self, identifier: &str) -> Result<(Borough, GeographyId)> {
        let borough = Borough::parse(identifier).ok_or_else(|| {
            FeedError::Configuration(format!(
                "'{}' is not a borough in geography table {}",
                identifier, self.version
            ))
        })?;
        Ok((borough, self.geography_id(borough).clone()))
    }
}

impl Default for BoroughGeography {
    fn default() -> Self {
        Self::nyc_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_codes() {
        assert_eq!(Borough::parse("Staten Island"), Some(Borough::StatenIsland));
        assert_eq!(Borough::parse("bx"), Some(Borough::Bronx));
        assert_eq!(Borough::parse("queens"), Some(Borough::Queens));
        assert_eq!(Borough::parse("Gotham"), None);
    }

    #[test]
    fn default_table_has_fixed_fips() {
        let table = BoroughGeography::nyc_default();
        assert_eq!(table.version(), DEFAULT_BOROUGH_TABLE_VERSION);
        assert_eq!(table.geography_id(Borough::Bronx).as_str(), "36005");
        assert_eq!(table.geography_id(Borough::StatenIsland).as_str(), "36085");
    }

    #[test]
    fn lookup_unknown_borough_is_configuration_error() {
        let table = BoroughGeography::nyc_default();
        let err = table.lookup("Gotham").unwrap_err();
        assert!(matches!(err, FeedError::Configuration(_)));
    }

    #[test]
    fn incomplete_table_is_rejected() {
        let err = BoroughGeography::from_entries("v1", [("Bronx", "36005")]).unwrap_err();
        assert!(err.to_string().contains("missing boroughs"));
    }

    #[test]
    fn custom_table_round_trips_entries() {
        let table = BoroughGeography::from_entries(
            "custom",
            [
                ("BX", "1"),
                ("Brooklyn", "2"),
                ("Manhattan", "3"),
                ("Queens", "4"),
                ("SI", "5"),
            ],
        )
        .unwrap();
        assert_eq!(table.version(), "custom");
        let (borough, id) = table.lookup("Staten Island").unwrap();
        assert_eq!(borough, Borough::StatenIsland);
        assert_eq!(id.as_str(), "5");
    }
}
