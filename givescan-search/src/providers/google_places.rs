//! Google Places Nearby Search: keyword search around a point.
//!
//! Requires an API key. The keyword follows the free text → category hint
//! → `"nonprofit"` chain; the radius is sent in metres, capped at 50 km.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{decode, first_non_blank, name_or_placeholder, record_id, send_for_body};
use crate::categories::categorize_types;
use crate::config::{credential, ScanConfig};
use crate::error::ScanError;
use crate::provider::{retain_geocoded, ProviderAdapter};
use crate::types::{NormalizedRecord, Query, Source};

/// Largest radius Nearby Search accepts, in metres.
const MAX_RADIUS_METERS: u32 = 50_000;

/// Keyword sent when the query has neither free text nor a category hint.
const DEFAULT_KEYWORD: &str = "nonprofit";

/// Google Places Nearby Search adapter.
pub struct GooglePlacesAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GooglePlacesAdapter {
    pub fn new(client: reqwest::Client, config: &ScanConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoints.google_places.trim_end_matches('/').to_string(),
            api_key: credential(&config.credentials.google_places_api_key).map(str::to_string),
        }
    }

    fn request_url(&self, query: &Query, api_key: &str) -> Result<Url, ScanError> {
        let location = format!("{},{}", query.lat, query.lng);
        let radius = query.radius_meters(MAX_RADIUS_METERS).to_string();
        let keyword = query.keyword(DEFAULT_KEYWORD);
        Url::parse_with_params(
            &format!("{}/maps/api/place/nearbysearch/json", self.endpoint),
            [
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", keyword.as_str()),
                ("key", api_key),
            ],
        )
        .map_err(|e| ScanError::Config(format!("invalid google endpoint: {e}")))
    }
}

#[async_trait]
impl ProviderAdapter for GooglePlacesAdapter {
    fn source(&self) -> Source {
        Source::Google
    }

    fn is_enabled(&self, _query: &Query) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<NormalizedRecord>, ScanError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };
        tracing::trace!(keyword = %query.keyword(DEFAULT_KEYWORD), "Google Places search");

        let url = self.request_url(query, api_key)?;
        let body = send_for_body(Source::Google, self.client.get(url)).await?;

        tracing::trace!(bytes = body.len(), "Google Places response received");
        parse_google_places_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<PlaceRow>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceRow {
    place_id: Option<String>,
    name: Option<String>,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<PlaceGeometry>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

/// Parse a Nearby Search JSON response into geocoded records.
pub(crate) fn parse_google_places_json(body: &str) -> Result<Vec<NormalizedRecord>, ScanError> {
    let response: NearbySearchResponse = decode(Source::Google, body)?;

    match response.status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => {}
        Some(status) => {
            let detail = response.error_message.as_deref().unwrap_or("no detail");
            return Err(ScanError::Upstream(format!("google: {status}: {detail}")));
        }
    }

    let records = response.results.into_iter().map(row_to_record).collect();
    let records = retain_geocoded(Source::Google, records);
    tracing::debug!(count = records.len(), "Google Places results parsed");
    Ok(records)
}

fn row_to_record(row: PlaceRow) -> NormalizedRecord {
    let location = row.geometry.and_then(|g| g.location);
    let lat = location.as_ref().and_then(|l| l.lat).unwrap_or(f64::NAN);
    let lng = location.as_ref().and_then(|l| l.lng).unwrap_or(f64::NAN);
    let name = name_or_placeholder([row.name.as_deref()]);

    NormalizedRecord {
        id: record_id(Source::Google, row.place_id),
        categories: categorize_types(&row.types, &name),
        name,
        address: first_non_blank([row.vicinity.as_deref(), row.formatted_address.as_deref()])
            .unwrap_or_default(),
        lat,
        lng,
        website: String::new(),
        donation_url: String::new(),
        verified: Source::Google.is_verified_registry(),
        source: Source::Google,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{COMMUNITY, FOOD_BANK};

    const MOCK_PLACES_JSON: &str = r#"{
  "html_attributions": [],
  "results": [
    {
      "place_id": "ChIJ-food",
      "name": "Helping Hands",
      "vicinity": "1 Main St, Springfield",
      "geometry": { "location": { "lat": 40.01, "lng": -75.01 } },
      "types": ["food", "point_of_interest", "establishment"]
    },
    {
      "place_id": "ChIJ-church",
      "name": "Grace Chapel",
      "formatted_address": "9 Church Ln, Springfield, PA",
      "geometry": { "location": { "lat": 40.02, "lng": -75.02 } },
      "types": ["church", "place_of_worship"]
    },
    {
      "place_id": "ChIJ-nowhere",
      "name": "No Geometry Inc",
      "types": ["establishment"]
    }
  ],
  "status": "OK"
}"#;

    fn make_query() -> Query {
        Query {
            lat: 40.0,
            lng: -75.0,
            radius_km: 12.5,
            q: None,
            category: Some("Food Bank".into()),
        }
    }

    fn adapter(api_key: Option<&str>) -> GooglePlacesAdapter {
        let mut config = ScanConfig::default();
        config.credentials.google_places_api_key = api_key.map(str::to_string);
        GooglePlacesAdapter::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn parse_maps_rows() {
        let records = parse_google_places_json(MOCK_PLACES_JSON).expect("should parse");
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, "g_ChIJ-food");
        assert_eq!(records[0].address, "1 Main St, Springfield");
        assert_eq!(records[0].categories, vec![FOOD_BANK]);
        assert_eq!(records[0].website, "");
        assert!(!records[0].verified);

        assert_eq!(records[1].address, "9 Church Ln, Springfield, PA");
        assert_eq!(records[1].categories, vec![COMMUNITY]);
    }

    #[test]
    fn zero_results_is_empty_not_error() {
        let records =
            parse_google_places_json(r#"{"results":[],"status":"ZERO_RESULTS"}"#).expect("ok");
        assert!(records.is_empty());
    }

    #[test]
    fn denied_status_is_upstream_error() {
        let body = r#"{"results":[],"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#;
        let err = parse_google_places_json(body).unwrap_err();
        assert!(matches!(err, ScanError::Upstream(_)));
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn request_url_carries_keyword_chain_and_capped_radius() {
        let mut query = make_query();
        query.radius_km = 60.0;
        let url = adapter(Some("k")).request_url(&query, "k").expect("url");
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["location"], "40,-75");
        assert_eq!(pairs["radius"], "50000");
        assert_eq!(pairs["keyword"], "Food Bank");
        assert_eq!(pairs["key"], "k");
    }

    #[test]
    fn disabled_without_key() {
        assert!(!adapter(None).is_enabled(&make_query()));
        assert!(!adapter(Some("  ")).is_enabled(&make_query()));
        assert!(adapter(Some("key")).is_enabled(&make_query()));
    }

    #[tokio::test]
    async fn disabled_fetch_returns_empty_without_io() {
        let mut config = ScanConfig::default();
        config.endpoints.google_places = "http://127.0.0.1:1".into();
        let adapter = GooglePlacesAdapter::new(reqwest::Client::new(), &config);
        let records = adapter.fetch(&make_query()).await.expect("disabled is not an error");
        assert!(records.is_empty());
    }
}
