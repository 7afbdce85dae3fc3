//! Core types: the normalized organization record, provider identity, the
//! validated query and the scan outcome.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Maximum number of characters of free text forwarded as a provider keyword.
pub const MAX_KEYWORD_CHARS: usize = 60;

/// Category assigned when no provider-specific rule matches.
pub const DEFAULT_CATEGORY: &str = "Nonprofit";

/// Name used when a provider row carries no usable name.
pub const PLACEHOLDER_NAME: &str = "Unnamed organization";

/// A single organization, in the shape every provider adapter produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Source-prefixed identifier, derived from a natural key when the
    /// provider has one and from a random token otherwise.
    pub id: String,
    /// Organization name, or [`PLACEHOLDER_NAME`].
    pub name: String,
    /// Free-form address assembled from whatever fragments the provider supplied.
    pub address: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Ordered, non-empty category labels.
    pub categories: Vec<String>,
    /// Organization website, possibly empty.
    pub website: String,
    /// Donation page, possibly empty.
    pub donation_url: String,
    /// True only for records from a curated registry.
    pub verified: bool,
    /// Which provider produced this record.
    pub source: Source,
}

impl NormalizedRecord {
    /// Whether both coordinates are finite numbers.
    pub fn is_geocoded(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Supported organization data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// OpenStreetMap via the Overpass API: tag-based, no credentials.
    Osm,
    /// Google Places Nearby Search: type-list based, API key required.
    Google,
    /// Charity Navigator: curated registry, app id + key required.
    CharityNavigator,
    /// ProPublica Nonprofit Explorer: IRS registry, text only.
    ProPublica,
}

impl Source {
    /// Returns the wire name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Osm => "osm",
            Self::Google => "google",
            Self::CharityNavigator => "charitynavigator",
            Self::ProPublica => "propublica",
        }
    }

    /// Returns the prefix used for record identifiers from this provider.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Osm => "osm",
            Self::Google => "g",
            Self::CharityNavigator => "cn",
            Self::ProPublica => "pp",
        }
    }

    /// Whether this provider is a curated registry whose records are
    /// marked as verified.
    pub fn is_verified_registry(&self) -> bool {
        matches!(self, Self::CharityNavigator)
    }

    /// Returns all provider variants in default registration order.
    pub fn all() -> &'static [Source] {
        &[
            Self::Osm,
            Self::Google,
            Self::CharityNavigator,
            Self::ProPublica,
        ]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated scan query. Construct with [`crate::query::validate_query`].
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Latitude of the search centre; always finite.
    pub lat: f64,
    /// Longitude of the search centre; always finite.
    pub lng: f64,
    /// Search radius in kilometres, already clamped.
    pub radius_km: f64,
    /// Free-text search term, trimmed and non-empty when present.
    pub q: Option<String>,
    /// Category hint, trimmed and non-empty when present.
    pub category: Option<String>,
}

impl Query {
    /// Keyword for providers that take one: the free text, else the
    /// category hint, else `default`, truncated to [`MAX_KEYWORD_CHARS`].
    pub fn keyword(&self, default: &str) -> String {
        self.q
            .as_deref()
            .or(self.category.as_deref())
            .unwrap_or(default)
            .chars()
            .take(MAX_KEYWORD_CHARS)
            .collect()
    }

    /// The radius in whole metres, capped at a provider's maximum.
    pub fn radius_meters(&self, max_meters: u32) -> u32 {
        let meters = (self.radius_km * 1000.0).round();
        if meters <= 0.0 {
            return 0;
        }
        if meters >= f64::from(max_meters) {
            return max_meters;
        }
        meters as u32
    }
}

/// The deduplicated, capped answer to one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Records in registration-then-provider order.
    pub results: Vec<NormalizedRecord>,
    /// Number of records in `results` (post-dedupe, post-cap).
    pub count: usize,
    /// Providers that contributed at least one geocoded record.
    #[serde(
        rename = "source",
        serialize_with = "serialize_sources",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sources: Vec<Source>,
    /// The radius that was actually applied, after clamping.
    pub radius_km: f64,
}

fn serialize_sources<S: Serializer>(sources: &[Source], serializer: S) -> Result<S::Ok, S::Error> {
    let joined = sources
        .iter()
        .map(Source::name)
        .collect::<Vec<_>>()
        .join("+");
    serializer.serialize_str(&joined)
}
