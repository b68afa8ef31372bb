//! Stateless HTTP request builder and response parser for the country API.
//!
//! # Design
//! `CountryClient` holds only a `base_url` and carries no mutable state
//! between calls. Each lookup is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `CountryService` (in `crate::countries`) runs the round-trip and applies
//! the "degrade to empty" policy; this module only knows the wire format.

use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{encode_segment, HttpMethod, HttpRequest, HttpResponse};
use crate::types::Country;

/// Field projection requested for every list endpoint.
pub const LIST_FIELDS: &str = "name,capital,region,population,flags,languages,cca3";

/// Synchronous, stateless client for the country-data API.
#[derive(Debug, Clone)]
pub struct CountryClient {
    base_url: String,
}

impl CountryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_all(&self) -> HttpRequest {
        self.get(format!("{}/all?fields={LIST_FIELDS}", self.base_url))
    }

    pub fn build_search_by_name(&self, name: &str) -> HttpRequest {
        self.build_list("name", name)
    }

    pub fn build_by_region(&self, region: &str) -> HttpRequest {
        self.build_list("region", region)
    }

    pub fn build_by_language(&self, language: &str) -> HttpRequest {
        self.build_list("lang", language)
    }

    pub fn build_by_currency(&self, currency: &str) -> HttpRequest {
        self.build_list("currency", currency)
    }

    /// Detail lookup by three-letter code. No projection: the detail view
    /// wants every field.
    pub fn build_details(&self, code: &str) -> HttpRequest {
        self.get(format!("{}/alpha/{}", self.base_url, encode_segment(code)))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Country>, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Parse a detail response. The API answers `/alpha/{code}` with either a
    /// single object or a one-element array; both normalize to one `Country`.
    pub fn parse_details(&self, response: HttpResponse) -> Result<Country, ApiError> {
        check_status(&response)?;
        let body: OneOrMany =
            serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        match body {
            OneOrMany::One(country) => Ok(country),
            OneOrMany::Many(countries) => countries.into_iter().next().ok_or(ApiError::NotFound),
        }
    }

    fn build_list(&self, endpoint: &str, value: &str) -> HttpRequest {
        self.get(format!(
            "{}/{endpoint}/{}?fields={LIST_FIELDS}",
            self.base_url,
            encode_segment(value)
        ))
    }

    fn get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Country>),
    One(Country),
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
