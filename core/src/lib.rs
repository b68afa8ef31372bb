//! Client core for browsing and bookmarking countries.
//!
//! # Overview
//! The wire layer (`client`, `auth`) builds `HttpRequest` values and parses
//! `HttpResponse` values without touching the network. A `Transport`
//! executes them; `UreqTransport` is the real one, tests script their own.
//! The stores sit on top:
//! - `CountryService`: country lookups that degrade to empty results.
//! - `SessionStore`: cookie-session login state with a single-flight guard
//!   on credential calls.
//! - `FavoritesStore`: per-user bookmarks mirrored to durable `Storage`.
//! - `CountryBrowser`: client-side filter and page state.
//! - `ThemePreference`: stored light/dark mode.
//!
//! `App` owns all of them and wires favorites to session changes.

pub mod app;
pub mod auth;
pub mod browse;
pub mod client;
pub mod config;
pub mod countries;
pub mod error;
pub mod favorites;
pub mod http;
pub mod session;
pub mod storage;
pub mod theme;
pub mod transport;
pub mod types;

pub use app::App;
pub use auth::AuthClient;
pub use browse::{page_slice, total_pages, CountryBrowser, Filters, CURRENCIES, LANGUAGES, REGIONS};
pub use client::CountryClient;
pub use config::Config;
pub use countries::CountryService;
pub use error::{ApiError, ConfigError, SessionError, StorageError, TransportError};
pub use favorites::FavoritesStore;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{SessionState, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use theme::{ThemeMode, ThemePreference};
pub use transport::{Transport, UreqTransport};
pub use types::{Country, Credentials, User};
