//! Local stand-in for the country-data API and the cookie-session auth API.
//!
//! Country routes live under `/v3.1` and answer from a fixed dataset; auth
//! routes live under `/api/auth` and keep users and sessions in memory.

pub mod auth;
pub mod countries;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

pub use auth::{Accounts, User, SESSION_COOKIE};

const FIXTURE: &str = include_str!("../data/countries.json");

pub struct Backend {
    pub countries: Vec<Value>,
    pub accounts: Accounts,
}

pub type SharedState = Arc<Backend>;

/// The bundled dataset. Panics only if the embedded JSON is malformed.
pub fn fixture_countries() -> Vec<Value> {
    serde_json::from_str(FIXTURE).expect("bundled countries.json is valid")
}

pub fn app() -> Router {
    let state: SharedState = Arc::new(Backend {
        countries: fixture_countries(),
        accounts: Accounts::default(),
    });
    Router::new()
        .route("/v3.1/all", get(countries::all))
        .route("/v3.1/name/{name}", get(countries::by_name))
        .route("/v3.1/region/{region}", get(countries::by_region))
        .route("/v3.1/lang/{language}", get(countries::by_language))
        .route("/v3.1/currency/{currency}", get(countries::by_currency))
        .route("/v3.1/alpha/{code}", get(countries::by_code))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/check-session", get(auth::check_session))
        .route("/api/auth/logout", get(auth::logout))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
