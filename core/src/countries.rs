//! Remote data client: the country lookups the rest of the app calls.
//!
//! Every lookup degrades instead of failing. Transport errors, non-2xx
//! statuses, and undecodable bodies are logged at `warn` and turned into an
//! empty list (or `None` for details). Blank input short-circuits before any
//! request is built.

use tracing::{debug, warn};

use crate::client::CountryClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::Transport;
use crate::types::Country;

#[derive(Debug, Clone)]
pub struct CountryService<T> {
    client: CountryClient,
    transport: T,
}

impl<T: Transport> CountryService<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: CountryClient::new(base_url),
            transport,
        }
    }

    pub fn get_all(&self) -> Vec<Country> {
        self.fetch_list("all", self.client.build_all())
    }

    pub fn search_by_name(&self, name: &str) -> Vec<Country> {
        match non_blank(name) {
            Some(name) => self.fetch_list("name", self.client.build_search_by_name(name)),
            None => Vec::new(),
        }
    }

    pub fn filter_by_region(&self, region: &str) -> Vec<Country> {
        match non_blank(region) {
            Some(region) => self.fetch_list("region", self.client.build_by_region(region)),
            None => Vec::new(),
        }
    }

    pub fn filter_by_language(&self, language: &str) -> Vec<Country> {
        match non_blank(language) {
            Some(language) => self.fetch_list("language", self.client.build_by_language(language)),
            None => Vec::new(),
        }
    }

    pub fn filter_by_currency(&self, currency: &str) -> Vec<Country> {
        match non_blank(currency) {
            Some(currency) => self.fetch_list("currency", self.client.build_by_currency(currency)),
            None => Vec::new(),
        }
    }

    pub fn get_details(&self, code: &str) -> Option<Country> {
        let code = non_blank(code)?;
        let request = self.client.build_details(code);
        let path = request.path.clone();
        let result = self
            .transport
            .execute(request)
            .map_err(|e| e.to_string())
            .and_then(|response| self.client.parse_details(response).map_err(|e| e.to_string()));
        match result {
            Ok(country) => Some(country),
            Err(error) => {
                warn!(code, path = %path, error = %error, "country details unavailable");
                None
            }
        }
    }

    fn fetch_list(&self, lookup: &'static str, request: HttpRequest) -> Vec<Country> {
        let path = request.path.clone();
        let response = match self.transport.execute(request) {
            Ok(response) => response,
            Err(error) => {
                warn!(lookup, path = %path, error = %error, "country request failed");
                return Vec::new();
            }
        };
        match self.client.parse_list(response) {
            Ok(countries) => {
                debug!(lookup, count = countries.len(), "countries fetched");
                countries
            }
            Err(ApiError::NotFound) => {
                warn!(lookup, path = %path, "no countries matched");
                Vec::new()
            }
            Err(error) => {
                warn!(lookup, path = %path, error = %error, "country response rejected");
                Vec::new()
            }
        }
    }
}

fn non_blank(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
