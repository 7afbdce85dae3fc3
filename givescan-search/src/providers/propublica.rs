//! ProPublica Nonprofit Explorer: IRS exempt-organization registry.
//!
//! Requires an API key and free text. The search API returns textual
//! registry data (name, EIN, city, state) with no coordinates, so every
//! row fails the geocode filter: this adapter never contributes records to
//! a scan. It stays registered so that it starts contributing as soon as a
//! geocoding step exists; until then it reports how many rows it dropped.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{decode, join_fragments, name_or_placeholder, record_id, scalar_key, send_for_body};
use crate::config::{credential, ScanConfig};
use crate::error::ScanError;
use crate::provider::{retain_geocoded, ProviderAdapter};
use crate::types::{NormalizedRecord, Query, Source, DEFAULT_CATEGORY};

/// ProPublica Nonprofit Explorer v2 search adapter.
pub struct ProPublicaAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ProPublicaAdapter {
    pub fn new(client: reqwest::Client, config: &ScanConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoints.propublica.trim_end_matches('/').to_string(),
            api_key: credential(&config.credentials.propublica_api_key).map(str::to_string),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ProPublicaAdapter {
    fn source(&self) -> Source {
        Source::ProPublica
    }

    fn is_enabled(&self, query: &Query) -> bool {
        self.api_key.is_some() && query.q.is_some()
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<NormalizedRecord>, ScanError> {
        let (Some(api_key), Some(search)) = (self.api_key.as_deref(), query.q.as_deref()) else {
            return Ok(Vec::new());
        };
        tracing::trace!(search, "ProPublica search");

        let url = Url::parse_with_params(
            &format!("{}/nonprofits/api/v2/search.json", self.endpoint),
            [("q", search)],
        )
        .map_err(|e| ScanError::Config(format!("invalid propublica endpoint: {e}")))?;

        let request = self.client.get(url).header("X-API-Key", api_key);
        let body = send_for_body(Source::ProPublica, request).await?;

        tracing::trace!(bytes = body.len(), "ProPublica response received");
        parse_propublica_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organizations: Vec<OrganizationRow>,
}

#[derive(Debug, Deserialize)]
struct OrganizationRow {
    #[serde(default)]
    ein: serde_json::Value,
    name: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

/// Parse a v2 search response. Rows carry no coordinates, so the result
/// is always empty after the geocode filter.
pub(crate) fn parse_propublica_json(body: &str) -> Result<Vec<NormalizedRecord>, ScanError> {
    let response: SearchResponse = decode(Source::ProPublica, body)?;
    let rows = response.organizations.len();
    let records = response.organizations.into_iter().map(row_to_record).collect();
    let records = retain_geocoded(Source::ProPublica, records);
    tracing::debug!(rows, count = records.len(), "ProPublica results parsed");
    Ok(records)
}

fn row_to_record(row: OrganizationRow) -> NormalizedRecord {
    NormalizedRecord {
        id: record_id(Source::ProPublica, scalar_key(&row.ein)),
        name: name_or_placeholder([row.name.as_deref()]),
        address: join_fragments([row.city.as_deref(), row.state.as_deref()]),
        lat: f64::NAN,
        lng: f64::NAN,
        categories: vec![DEFAULT_CATEGORY.to_string()],
        website: String::new(),
        donation_url: String::new(),
        verified: Source::ProPublica.is_verified_registry(),
        source: Source::ProPublica,
    }
}
