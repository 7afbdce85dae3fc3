//! Charity Navigator: curated registry of rated charities.
//!
//! Requires an application id and key, and only answers free-text
//! queries. Its records are the only ones marked as verified.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use super::{decode, first_non_blank, join_fragments, name_or_placeholder, record_id, scalar_key};
use crate::categories::single_or_default;
use crate::config::{credential, ScanConfig};
use crate::error::ScanError;
use crate::http::transport_error;
use crate::provider::{retain_geocoded, ProviderAdapter};
use crate::types::{NormalizedRecord, Query, Source};

/// Page size requested from the search endpoint.
const PAGE_SIZE: &str = "50";

/// Charity Navigator v2 Organizations adapter.
pub struct CharityNavigatorAdapter {
    client: reqwest::Client,
    endpoint: String,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl CharityNavigatorAdapter {
    pub fn new(client: reqwest::Client, config: &ScanConfig) -> Self {
        let creds = &config.credentials;
        Self {
            client,
            endpoint: config.endpoints.charity_navigator.trim_end_matches('/').to_string(),
            app_id: credential(&creds.charity_navigator_app_id).map(str::to_string),
            app_key: credential(&creds.charity_navigator_app_key).map(str::to_string),
        }
    }
}

#[async_trait]
impl ProviderAdapter for CharityNavigatorAdapter {
    fn source(&self) -> Source {
        Source::CharityNavigator
    }

    fn is_enabled(&self, query: &Query) -> bool {
        self.app_id.is_some() && self.app_key.is_some() && query.q.is_some()
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<NormalizedRecord>, ScanError> {
        let (Some(app_id), Some(app_key), Some(search)) =
            (self.app_id.as_deref(), self.app_key.as_deref(), query.q.as_deref())
        else {
            return Ok(Vec::new());
        };
        tracing::trace!(search, "Charity Navigator search");

        let url = Url::parse_with_params(
            &format!("{}/v2/Organizations", self.endpoint),
            [
                ("app_id", app_id),
                ("app_key", app_key),
                ("pageSize", PAGE_SIZE),
                ("search", search),
            ],
        )
        .map_err(|e| ScanError::Config(format!("invalid charitynavigator endpoint: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(Source::CharityNavigator.name(), e))?;

        // The v2 search answers "no matches" with a 404.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Charity Navigator returned no matches");
            return Ok(Vec::new());
        }

        let body = response
            .error_for_status()
            .map_err(|e| transport_error(Source::CharityNavigator.name(), e))?
            .text()
            .await
            .map_err(|e| transport_error(Source::CharityNavigator.name(), e))?;

        tracing::trace!(bytes = body.len(), "Charity Navigator response received");
        parse_charity_navigator_json(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationRow {
    #[serde(default)]
    ein: serde_json::Value,
    #[serde(rename = "charityNavigatorURL")]
    charity_navigator_url: Option<String>,
    charity_name: Option<String>,
    legal_name: Option<String>,
    mailing_address: Option<MailingAddress>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    category: Option<CategoryRef>,
    #[serde(rename = "websiteURL")]
    website_url: Option<String>,
    donation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MailingAddress {
    street_address1: Option<String>,
    city: Option<String>,
    state_or_province: Option<String>,
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRef {
    category_name: Option<String>,
}

/// Parse a v2 Organizations JSON array into geocoded records.
pub(crate) fn parse_charity_navigator_json(body: &str) -> Result<Vec<NormalizedRecord>, ScanError> {
    let rows: Vec<OrganizationRow> = decode(Source::CharityNavigator, body)?;
    let records = rows.into_iter().map(row_to_record).collect();
    let records = retain_geocoded(Source::CharityNavigator, records);
    tracing::debug!(count = records.len(), "Charity Navigator results parsed");
    Ok(records)
}

fn row_to_record(row: OrganizationRow) -> NormalizedRecord {
    let natural_key = scalar_key(&row.ein)
        .filter(|k| !k.trim().is_empty())
        .or(row.charity_navigator_url);

    let address = row
        .mailing_address
        .as_ref()
        .map(|a| {
            join_fragments([
                a.street_address1.as_deref(),
                a.city.as_deref(),
                a.state_or_province.as_deref(),
                a.postal_code.as_deref(),
            ])
        })
        .unwrap_or_default();

    let website = first_non_blank([row.website_url.as_deref()]).unwrap_or_default();
    let donation_url =
        first_non_blank([row.donation_url.as_deref()]).unwrap_or_else(|| website.clone());

    NormalizedRecord {
        id: record_id(Source::CharityNavigator, natural_key),
        name: name_or_placeholder([row.charity_name.as_deref(), row.legal_name.as_deref()]),
        address,
        lat: row.latitude.unwrap_or(f64::NAN),
        lng: row.longitude.unwrap_or(f64::NAN),
        categories: single_or_default(row.category.and_then(|c| c.category_name).as_deref()),
        website,
        donation_url,
        verified: Source::CharityNavigator.is_verified_registry(),
        source: Source::CharityNavigator,
    }
}
