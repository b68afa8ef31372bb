//! End-to-end tests against the live mock backend.
//!
//! # Design
//! Starts `mock-backend` on a random port, then drives the stores over real
//! HTTP through `UreqTransport`, whose cookie jar carries the session between
//! calls. Favorites persist to a throwaway directory on disk.

use std::net::SocketAddr;
use std::path::PathBuf;

use countries_core::{
    App, Config, CountryBrowser, CountryService, FileStorage, Filters, SessionError, SessionState, SessionStore,
    Storage, UreqTransport,
};

fn start_backend() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_backend::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn config(addr: SocketAddr, storage_dir: PathBuf) -> Config {
    Config {
        countries_base_url: format!("http://{addr}/v3.1"),
        auth_base_url: format!("http://{addr}/api/auth"),
        storage_dir,
        page_size: 12,
    }
}

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("countries-it-{}", uuid::Uuid::new_v4()))
}

#[test]
fn country_lookups_over_http() {
    let addr = start_backend();
    let service = CountryService::new(&format!("http://{addr}/v3.1"), UreqTransport::new());

    let all = service.get_all();
    assert_eq!(all.len(), 14);
    // The list projection drops currencies.
    assert!(all.iter().all(|c| c.currencies.is_empty()));

    let found = service.search_by_name("france");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].common_name(), "France");

    assert_eq!(service.search_by_name("sri lanka").len(), 1);
    assert!(service.search_by_name("atlantis").is_empty());
    assert_eq!(service.filter_by_region("asia").len(), 4);
    assert_eq!(service.filter_by_language("spanish").len(), 2);
    assert_eq!(service.filter_by_currency("eur").len(), 3);

    let japan = service.get_details("JPN").unwrap();
    assert_eq!(japan.capital_display(), "Tokyo");
    assert_eq!(japan.currency_labels(), vec!["Japanese yen (¥)"]);
    assert!(service.get_details("XXX").is_none());
}

#[test]
fn unreachable_server_degrades_to_empty() {
    // Bind then drop to get a port nobody is listening on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let service = CountryService::new(&format!("http://{addr}/v3.1"), UreqTransport::new());
    assert!(service.get_all().is_empty());
    assert!(service.search_by_name("france").is_empty());
    assert!(service.get_details("FRA").is_none());

    let session = SessionStore::new(&format!("http://{addr}/api/auth"), UreqTransport::new());
    assert_eq!(session.init(), SessionState::Unauthenticated);
    session.logout();
    assert_eq!(session.state(), SessionState::Unauthenticated);
}

#[test]
fn browse_paginates_full_list() {
    let addr = start_backend();
    let service = CountryService::new(&format!("http://{addr}/v3.1"), UreqTransport::new());
    let mut browser = CountryBrowser::new(12);

    browser.load(&service);
    assert_eq!(browser.total_pages(), 2);
    assert_eq!(browser.current_page().len(), 12);
    assert!(browser.set_page(2));
    assert_eq!(browser.current_page().len(), 2);

    browser.apply(Filters::search("france"), &service);
    assert_eq!(browser.page(), 1);
    let shown: Vec<&str> = browser.current_page().iter().map(|c| c.common_name()).collect();
    assert_eq!(shown, vec!["France"]);

    browser.apply(Filters::region("Americas"), &service);
    assert_eq!(browser.countries().len(), 4);
}

#[test]
fn session_cookie_round_trip() {
    let addr = start_backend();
    let transport = UreqTransport::new();
    let session = SessionStore::new(&format!("http://{addr}/api/auth"), transport.clone());

    assert_eq!(session.init(), SessionState::Unauthenticated);

    let err = session.login("carol", "pw").unwrap_err();
    match err {
        SessionError::Rejected(payload) => assert_eq!(payload["message"], "Invalid credentials"),
        other => panic!("unexpected error: {other:?}"),
    }

    let user = session.register("carol", "pw").unwrap();
    assert_eq!(user.username, "carol");
    assert!(user.id.is_some());

    let err = session.register("carol", "pw").unwrap_err();
    assert!(matches!(err, SessionError::Rejected(_)));

    // A second store on the same agent sees the cookie.
    let other = SessionStore::new(&format!("http://{addr}/api/auth"), transport.clone());
    assert_eq!(other.init().user().map(|u| u.username.as_str()), Some("carol"));

    session.logout();
    assert!(!session.is_authenticated());
    assert_eq!(other.init(), SessionState::Unauthenticated);

    let user = session.login("carol", "pw").unwrap();
    assert_eq!(user.username, "carol");
    assert!(session.is_authenticated());
}

#[test]
fn app_lifecycle_persists_favorites_per_user() {
    let addr = start_backend();
    let dir = temp_dir();
    let storage = FileStorage::new(&dir);
    let cfg = config(addr, dir.clone());

    let mut app = App::init(&cfg, UreqTransport::new(), storage.clone());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.load_countries(), 14);

    app.register("dave", "pw").unwrap();
    assert_eq!(app.favorites().owner(), Some("dave"));
    assert_eq!(app.add_favorite_by_code("FRA"), Some(true));
    assert_eq!(app.add_favorite_by_code("FRA"), Some(false));
    assert_eq!(app.add_favorite_by_code("LKA"), Some(true));
    let saved = app.favorites().list().to_vec();

    app.logout();
    assert!(app.favorites().is_empty());
    app.teardown();

    // A fresh process: new agent, no cookie, so the user logs in again and
    // finds the same list on disk.
    let mut app = App::init(&cfg, UreqTransport::new(), storage.clone());
    assert!(!app.session().is_authenticated());
    app.login("dave", "pw").unwrap();
    assert_eq!(app.favorites().list(), saved.as_slice());
    assert_eq!(saved[1].borders, vec!["IND".to_string()]);

    app.favorites_mut().remove("FRA");
    app.favorites_mut().remove("LKA");
    assert_eq!(storage.get("favorites-dave").unwrap().as_deref(), Some("[]"));
    app.teardown();

    let _ = std::fs::remove_dir_all(&dir);
}
