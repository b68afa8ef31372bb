//! Application root: owns every store and keeps them consistent.
//!
//! Lifecycle is `init` → use → `teardown`. Favorites follow the session: each
//! credential change re-syncs them, so a sign-in loads the user's list and a
//! sign-out drops it from memory.

use tracing::info;

use crate::browse::{CountryBrowser, Filters};
use crate::config::Config;
use crate::countries::CountryService;
use crate::error::SessionError;
use crate::favorites::FavoritesStore;
use crate::session::{SessionState, SessionStore};
use crate::storage::Storage;
use crate::theme::ThemePreference;
use crate::transport::Transport;
use crate::types::{Country, User};

pub struct App<T, S> {
    countries: CountryService<T>,
    session: SessionStore<T>,
    favorites: FavoritesStore<S>,
    theme: ThemePreference<S>,
    browser: CountryBrowser,
}

impl<T, S> App<T, S>
where
    T: Transport + Clone,
    S: Storage + Clone,
{
    /// Build the stores, check for an existing session, and load that user's
    /// favorites and the saved theme. No country data is fetched yet.
    pub fn init(config: &Config, transport: T, storage: S) -> Self {
        let session = SessionStore::new(&config.auth_base_url, transport.clone());
        let mut app = Self {
            countries: CountryService::new(&config.countries_base_url, transport),
            favorites: FavoritesStore::new(storage.clone()),
            theme: ThemePreference::load(storage),
            browser: CountryBrowser::new(config.page_size),
            session,
        };
        let state = app.session.init();
        app.favorites.sync_with(state.user());
        info!(
            authenticated = state.user().is_some(),
            theme = %app.theme.mode(),
            "application initialized"
        );
        app
    }

    pub fn countries(&self) -> &CountryService<T> {
        &self.countries
    }

    pub fn session(&self) -> &SessionStore<T> {
        &self.session
    }

    pub fn favorites(&self) -> &FavoritesStore<S> {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore<S> {
        &mut self.favorites
    }

    pub fn theme(&self) -> &ThemePreference<S> {
        &self.theme
    }

    pub fn theme_mut(&mut self) -> &mut ThemePreference<S> {
        &mut self.theme
    }

    pub fn browser(&self) -> &CountryBrowser {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut CountryBrowser {
        &mut self.browser
    }

    pub fn load_countries(&mut self) -> usize {
        self.browser.load(&self.countries)
    }

    pub fn apply_filters(&mut self, filters: Filters) -> usize {
        self.browser.apply(filters, &self.countries)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<User, SessionError> {
        let result = self.session.login(username, password);
        self.sync_favorites();
        result
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<User, SessionError> {
        let result = self.session.register(username, password);
        self.sync_favorites();
        result
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.sync_favorites();
    }

    /// Look a country up by code and bookmark it. `None` when the lookup
    /// found nothing, otherwise whether the list changed.
    pub fn add_favorite_by_code(&mut self, code: &str) -> Option<bool> {
        let country: Country = self.countries.get_details(code)?;
        Some(self.favorites.add(country))
    }

    /// Shut down. Durable state has already been written; in-memory state is
    /// dropped.
    pub fn teardown(self) {
        let user = match self.session.state() {
            SessionState::Authenticated(user) => Some(user.username),
            _ => None,
        };
        info!(
            user = user.as_deref().unwrap_or("-"),
            favorites = self.favorites.len(),
            "application shut down"
        );
    }

    fn sync_favorites(&mut self) {
        let user = self.session.user();
        self.favorites.sync_with(user.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::transport::scripted::ScriptedTransport;

    const FRANCE: &str = r#"[{"name":{"common":"France"},"cca3":"FRA","region":"Europe"}]"#;

    fn config() -> Config {
        Config {
            countries_base_url: "https://countries.test/v3.1".to_string(),
            auth_base_url: "https://auth.test/api/auth".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn init_restores_session_and_favorites() {
        let storage = MemoryStorage::new();
        storage.set("favorites-alice", FRANCE).unwrap();
        let transport = ScriptedTransport::new();
        transport.respond("/check-session", 200, r#"{"user":{"id":"1","username":"alice"}}"#);

        let app = App::init(&config(), transport, storage);
        assert!(app.session().is_authenticated());
        assert!(app.favorites().is_favorite("FRA"));
    }

    #[test]
    fn login_loads_and_logout_clears_favorites() {
        let storage = MemoryStorage::new();
        storage.set("favorites-alice", FRANCE).unwrap();
        let transport = ScriptedTransport::new();
        transport
            .respond("/check-session", 200, r#"{"user":null}"#)
            .respond("/login", 200, r#"{"user":{"id":"1","username":"alice"}}"#)
            .fail("/logout");

        let mut app = App::init(&config(), transport, storage.clone());
        assert!(app.favorites().is_empty());

        app.login("alice", "pw").unwrap();
        assert_eq!(app.favorites().len(), 1);

        app.logout();
        assert!(!app.session().is_authenticated());
        assert!(app.favorites().is_empty());
        assert!(storage.get("favorites-alice").unwrap().is_some());
        app.teardown();
    }

    #[test]
    fn add_favorite_by_code_fetches_details() {
        let transport = ScriptedTransport::new();
        transport
            .respond("/check-session", 200, r#"{"user":{"id":"1","username":"alice"}}"#)
            .respond("/alpha/FRA", 200, FRANCE)
            .respond("/alpha/XXX", 404, r#"{"status":404,"message":"Not Found"}"#);
        let storage = MemoryStorage::new();
        let mut app = App::init(&config(), transport, storage.clone());

        assert_eq!(app.add_favorite_by_code("FRA"), Some(true));
        assert_eq!(app.add_favorite_by_code("FRA"), Some(false));
        assert_eq!(app.add_favorite_by_code("XXX"), None);
        assert!(storage.get("favorites-alice").unwrap().unwrap().contains("France"));
    }

    #[test]
    fn failed_login_leaves_favorites_untouched() {
        let transport = ScriptedTransport::new();
        transport
            .respond("/check-session", 200, r#"{"user":null}"#)
            .respond("/login", 401, r#"{"message":"Invalid credentials"}"#);
        let mut app = App::init(&config(), transport, MemoryStorage::new());
        assert!(app.login("alice", "bad").is_err());
        assert!(app.favorites().owner().is_none());
    }
}
