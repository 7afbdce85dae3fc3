//! Provider adapter implementations.
//!
//! Each module provides a struct implementing
//! [`crate::provider::ProviderAdapter`] for one external directory, plus a
//! pure `parse_*` function that maps a raw response body to records.

pub mod charity_navigator;
pub mod google_places;
pub mod overpass;
pub mod propublica;

pub use charity_navigator::CharityNavigatorAdapter;
pub use google_places::GooglePlacesAdapter;
pub use overpass::OverpassAdapter;
pub use propublica::ProPublicaAdapter;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::http::transport_error;
use crate::provider::ProviderAdapter;
use crate::types::{Source, PLACEHOLDER_NAME};

/// Length of the random token used when a row has no natural key.
const FALLBACK_TOKEN_LEN: usize = 10;

/// Build one adapter per provider in `config.providers`, preserving
/// registration order.
pub fn build_adapters(
    config: &ScanConfig,
    client: reqwest::Client,
) -> Vec<Box<dyn ProviderAdapter>> {
    config
        .providers
        .iter()
        .map(|source| -> Box<dyn ProviderAdapter> {
            match source {
                Source::Osm => Box::new(OverpassAdapter::new(client.clone(), config)),
                Source::Google => Box::new(GooglePlacesAdapter::new(client.clone(), config)),
                Source::CharityNavigator => {
                    Box::new(CharityNavigatorAdapter::new(client.clone(), config))
                }
                Source::ProPublica => Box::new(ProPublicaAdapter::new(client.clone(), config)),
            }
        })
        .collect()
}

/// `<prefix>_<key>`, or `<prefix>_<random token>` when no key is available.
pub(crate) fn record_id(source: Source, natural_key: Option<String>) -> String {
    let key = natural_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(fallback_token);
    format!("{}_{key}", source.id_prefix())
}

fn fallback_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FALLBACK_TOKEN_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Render a JSON scalar used as a natural key (EINs arrive as strings from
/// some APIs and as numbers from others).
pub(crate) fn scalar_key(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Join the non-blank fragments with `", "`.
pub(crate) fn join_fragments<'a>(fragments: impl IntoIterator<Item = Option<&'a str>>) -> String {
    fragments
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The first non-blank candidate, owned.
pub(crate) fn first_non_blank<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

pub(crate) fn name_or_placeholder<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    first_non_blank(candidates).unwrap_or_else(|| PLACEHOLDER_NAME.to_string())
}

/// Send a request and read the body, mapping non-success statuses to
/// [`ScanError::Http`].
pub(crate) async fn send_for_body(
    source: Source,
    request: reqwest::RequestBuilder,
) -> Result<String, ScanError> {
    request
        .send()
        .await
        .map_err(|e| transport_error(source.name(), e))?
        .error_for_status()
        .map_err(|e| transport_error(source.name(), e))?
        .text()
        .await
        .map_err(|e| transport_error(source.name(), e))
}

pub(crate) fn decode<'de, T: serde::Deserialize<'de>>(
    source: Source,
    body: &'de str,
) -> Result<T, ScanError> {
    serde_json::from_str(body)
        .map_err(|e| ScanError::Parse(format!("{source} response did not match schema: {e}")))
}
