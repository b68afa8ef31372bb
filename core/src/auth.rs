//! Request builder and response parser for the cookie-session auth API.
//!
//! Same split as `CountryClient`: this module never performs I/O. Cookies are
//! not handled here at all; the transport's cookie jar carries them.

use tracing::warn;

use crate::client::check_status;
use crate::error::{ApiError, SessionError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AuthResponse, Credentials, User};

#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_check_session(&self) -> HttpRequest {
        self.get("check-session")
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.post_json("login", credentials)
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.post_json("register", credentials)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.get("logout")
    }

    /// `Ok(None)` means the server answered but found no valid session.
    pub fn parse_check_session(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        check_status(&response)?;
        let body: AuthResponse =
            serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(body.user)
    }

    /// Parse a login or register response.
    ///
    /// A non-2xx answer becomes `SessionError::Rejected` carrying the error
    /// body verbatim: as JSON when it parses, otherwise as a JSON string. When
    /// a success body omits the user, or is empty or unreadable, the
    /// submitted username stands in.
    pub fn parse_credentials(&self, response: HttpResponse, username: &str) -> Result<User, SessionError> {
        if !response.is_success() {
            let payload = serde_json::from_str(&response.body)
                .unwrap_or(serde_json::Value::String(response.body));
            return Err(SessionError::Rejected(payload));
        }
        let user = if response.body.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<AuthResponse>(&response.body) {
                Ok(body) => body.user,
                Err(e) => {
                    warn!(error = %e, "unreadable credential response; keeping submitted username");
                    None
                }
            }
        };
        Ok(user.unwrap_or_else(|| User {
            id: None,
            username: username.to_string(),
        }))
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn get(&self, endpoint: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/{endpoint}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn post_json(&self, endpoint: &str, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(credentials).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/{endpoint}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}
