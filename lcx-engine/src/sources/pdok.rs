//! PDOK Locatieserver address resolver
//!
//! Uses the `free` search endpoint restricted to `type:adres`, so only
//! concrete addresses match (not streets or place names).

use super::{check_status, json_str, LocationResolver, SourceError};
use crate::types::ResolvedLocation;
use lcx_common::config::EnrichmentConfig;
use lcx_common::geo::{parse_wkt_point, prefix_code};
use serde_json::Value;
use tracing::{debug, warn};

const SEARCH_PATH: &str = "/bzk/locatieserver/search/v3_1/free";

/// Query parameters that carry an address in shared map/search links
const ADDRESS_QUERY_KEYS: &[&str] = &["q", "query", "address", "location", "loc"];

/// PDOK Locatieserver resolver
pub struct PdokLocationResolver {
    http_client: reqwest::Client,
    base_url: String,
}

impl PdokLocationResolver {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(
            super::build_http_client(config)?,
            &config.pdok_base_url,
        ))
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl LocationResolver for PdokLocationResolver {
    async fn resolve(&self, input: &str) -> Result<Option<ResolvedLocation>, SourceError> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let search = normalize_input(input);
        let url = reqwest::Url::parse_with_params(
            &format!("{}{}", self.base_url, SEARCH_PATH),
            &[("q", search.as_str()), ("fq", "type:adres"), ("rows", "1")],
        )
        .map_err(|e| SourceError::Network(format!("Invalid PDOK URL: {}", e)))?;

        debug!(search = %search, "Resolving address with PDOK Locatieserver");

        let response = check_status(self.http_client.get(url).send().await?).await?;
        let body: Value = response.json().await?;

        let location = parse_search_response(&body, input, &search);
        if location.is_none() {
            debug!(search = %search, "PDOK returned no usable address match");
        }
        Ok(location)
    }
}

/// Map the first PDOK document to a location; `None` without a match or coordinates
pub fn parse_search_response(body: &Value, query: &str, normalized: &str) -> Option<ResolvedLocation> {
    let doc = body.get("response")?.get("docs")?.as_array()?.first()?;

    let Some(point_ll) = json_str(doc, "centroide_ll").and_then(|wkt| parse_wkt_point(&wkt)) else {
        warn!("PDOK response did not include valid coordinates");
        return None;
    };
    let point_rd = json_str(doc, "centroide_rd").and_then(|wkt| parse_wkt_point(&wkt));

    Some(ResolvedLocation {
        query: query.to_string(),
        display_address: json_str(doc, "weergavenaam").unwrap_or_else(|| normalized.to_string()),
        latitude: point_ll.y,
        longitude: point_ll.x,
        rd_x: point_rd.map(|p| p.x),
        rd_y: point_rd.map(|p| p.y),
        municipality_code: prefix_code(json_str(doc, "gemeentecode").as_deref(), "GM"),
        municipality_name: json_str(doc, "gemeentenaam"),
        district_code: json_str(doc, "wijkcode"),
        district_name: json_str(doc, "wijknaam"),
        neighborhood_code: json_str(doc, "buurtcode"),
        neighborhood_name: json_str(doc, "buurtnaam"),
        postal_code: json_str(doc, "postcode"),
    })
}

/// Turn raw input (plain text or a listing/search URL) into a search string
///
/// URLs yield an address query parameter when present, otherwise the last
/// path segment with separators replaced by spaces. Plain text is trimmed.
pub fn normalize_input(input: &str) -> String {
    let trimmed = input.trim();

    let Ok(url) = reqwest::Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    if !matches!(url.scheme(), "http" | "https") {
        return trimmed.to_string();
    }

    let from_query = url.query_pairs().find_map(|(key, value)| {
        let value = value.trim();
        (ADDRESS_QUERY_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k))
            && value.chars().any(char::is_alphanumeric))
        .then(|| value.to_string())
    });
    if let Some(address) = from_query {
        return address;
    }

    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.trim().is_empty()).last())
        .map(decode_component)
        .map(|s| s.replace(['-', '_'], " ").trim().to_string());

    match segment {
        Some(slug) if slug.chars().any(char::is_alphabetic) => slug,
        _ => trimmed.to_string(),
    }
}

/// Percent-decode one URL component
fn decode_component(component: &str) -> String {
    let mut scratch = match reqwest::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return component.to_string(),
    };
    scratch.set_query(Some(&format!("v={}", component.replace('+', "%2B"))));
    scratch
        .query_pairs()
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| component.to_string())
}
