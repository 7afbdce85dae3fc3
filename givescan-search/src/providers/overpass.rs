//! OpenStreetMap via the Overpass API: tag-based, no credentials.
//!
//! Sends a union of `node` and `way` clauses, one pair per tag filter,
//! restricted to a circle around the query point. Overpass enforces the
//! `[timeout:N]` it is given on the server side.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode, first_non_blank, join_fragments, name_or_placeholder, record_id, send_for_body};
use crate::categories::categorize_tags;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::provider::{retain_geocoded, ProviderAdapter};
use crate::types::{NormalizedRecord, Query, Source};

/// Largest radius sent to Overpass, in metres.
const MAX_RADIUS_METERS: u32 = 50_000;

/// Tag filters whose matches are treated as charitable or social-service
/// organizations.
const TAG_FILTERS: &[(&str, &str)] = &[
    ("amenity", "food_bank"),
    ("amenity", "social_facility"),
    ("amenity", "community_centre"),
    ("office", "charity"),
    ("office", "ngo"),
];

/// Overpass API adapter.
pub struct OverpassAdapter {
    client: reqwest::Client,
    endpoint: String,
    server_timeout_seconds: u64,
}

impl OverpassAdapter {
    pub fn new(client: reqwest::Client, config: &ScanConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoints.overpass.trim_end_matches('/').to_string(),
            server_timeout_seconds: config.overpass_timeout_seconds,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OverpassAdapter {
    fn source(&self) -> Source {
        Source::Osm
    }

    fn is_enabled(&self, _query: &Query) -> bool {
        true
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<NormalizedRecord>, ScanError> {
        let ql = build_overpass_query(query, self.server_timeout_seconds);
        tracing::trace!(ql = %ql, "Overpass query");

        let request = self
            .client
            .post(format!("{}/api/interpreter", self.endpoint))
            .form(&[("data", ql.as_str())]);
        let body = send_for_body(Source::Osm, request).await?;

        tracing::trace!(bytes = body.len(), "Overpass response received");
        parse_overpass_json(&body)
    }
}

/// Build the Overpass QL for `query`: every tag filter, as both `node` and
/// `way`, within the (capped) radius; ways report their centre point.
pub fn build_overpass_query(query: &Query, server_timeout_seconds: u64) -> String {
    let around = format!(
        "around:{},{},{}",
        query.radius_meters(MAX_RADIUS_METERS),
        query.lat,
        query.lng
    );

    let mut ql = format!("[out:json][timeout:{server_timeout_seconds}];\n(\n");
    for (key, value) in TAG_FILTERS {
        for element in ["node", "way"] {
            ql.push_str(&format!("  {element}[\"{key}\"=\"{value}\"]({around});\n"));
        }
    }
    ql.push_str(");\nout center tags;");
    ql
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

/// Parse an Overpass JSON response into geocoded records.
pub(crate) fn parse_overpass_json(body: &str) -> Result<Vec<NormalizedRecord>, ScanError> {
    let response: OverpassResponse = decode(Source::Osm, body)?;

    if let Some(remark) = response.remark.as_deref() {
        if remark.contains("runtime error") {
            return Err(ScanError::Upstream(format!("overpass: {remark}")));
        }
    }

    let records = response.elements.into_iter().map(element_to_record).collect();
    let records = retain_geocoded(Source::Osm, records);
    tracing::debug!(count = records.len(), "Overpass results parsed");
    Ok(records)
}

fn element_to_record(element: OverpassElement) -> NormalizedRecord {
    let tag = |key: &str| element.tags.get(key).map(String::as_str);

    let (lat, lng) = match (element.lat, element.lon, &element.center) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (_, _, Some(center)) => (center.lat, center.lon),
        _ => (f64::NAN, f64::NAN),
    };

    let name = name_or_placeholder([tag("name"), tag("official_name"), tag("operator")]);

    let street = join_street(tag("addr:housenumber"), tag("addr:street"));
    let mut address = join_fragments([
        street.as_deref(),
        tag("addr:city"),
        tag("addr:state"),
        tag("addr:postcode"),
    ]);
    if address.is_empty() {
        address = first_non_blank([tag("addr:full")]).unwrap_or_default();
    }

    let website = first_non_blank([tag("website"), tag("contact:website"), tag("url")])
        .unwrap_or_default();
    let donation_url = first_non_blank([tag("donation:url")]).unwrap_or_else(|| website.clone());

    NormalizedRecord {
        id: record_id(Source::Osm, Some(format!("{}_{}", element.kind, element.id))),
        categories: categorize_tags(&element.tags, &name),
        name,
        address,
        lat,
        lng,
        website,
        donation_url,
        verified: Source::Osm.is_verified_registry(),
        source: Source::Osm,
    }
}

fn join_street(number: Option<&str>, street: Option<&str>) -> Option<String> {
    let joined = [number, street]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}
