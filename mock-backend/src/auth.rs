//! Username/password accounts with cookie sessions.
//!
//! `register` and `login` start a session and hand back an `HttpOnly` `sid`
//! cookie. `check-session` resolves that cookie; `logout` forgets it and
//! expires the cookie. Nothing is persisted.

use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::SharedState;

pub const SESSION_COOKIE: &str = "sid";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

struct Account {
    user: User,
    password: String,
}

/// Accounts by username, and live sessions by id.
#[derive(Default)]
pub struct Accounts {
    users: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<Uuid, String>>,
}

impl Accounts {
    async fn start_session(&self, username: &str) -> Uuid {
        let sid = Uuid::new_v4();
        self.sessions.write().await.insert(sid, username.to_string());
        sid
    }

    async fn user_for(&self, sid: Uuid) -> Option<User> {
        let username = self.sessions.read().await.get(&sid).cloned()?;
        self.users.read().await.get(&username).map(|a| a.user.clone())
    }
}

pub async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(input): Json<Credentials>,
) -> Response {
    let username = input.username.trim();
    if username.is_empty() || input.password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Username and password are required");
    }

    let user = {
        let mut users = state.accounts.users.write().await;
        if users.contains_key(username) {
            return error(StatusCode::CONFLICT, "Username already exists");
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
        };
        users.insert(
            username.to_string(),
            Account {
                user: user.clone(),
                password: input.password,
            },
        );
        user
    };

    let sid = state.accounts.start_session(&user.username).await;
    info!(username = %user.username, "registered");
    with_session(StatusCode::CREATED, jar, sid, user)
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(input): Json<Credentials>,
) -> Response {
    let user = {
        let users = state.accounts.users.read().await;
        match users.get(input.username.trim()) {
            Some(account) if account.password == input.password => account.user.clone(),
            _ => return error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        }
    };
    let sid = state.accounts.start_session(&user.username).await;
    info!(username = %user.username, "logged in");
    with_session(StatusCode::OK, jar, sid, user)
}

/// Always 200; `user` is `null` without a live session.
pub async fn check_session(State(state): State<SharedState>, jar: CookieJar) -> Json<serde_json::Value> {
    let user = match session_id(&jar) {
        Some(sid) => state.accounts.user_for(sid).await,
        None => None,
    };
    Json(json!({ "user": user }))
}

pub async fn logout(State(state): State<SharedState>, jar: CookieJar) -> Response {
    if let Some(sid) = session_id(&jar) {
        state.accounts.sessions.write().await.remove(&sid);
    }
    (
        StatusCode::OK,
        jar.add(clear_session_cookie()),
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

fn with_session(status: StatusCode, jar: CookieJar, sid: Uuid, user: User) -> Response {
    (status, jar.add(session_cookie(sid)), Json(json!({ "user": user }))).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn session_cookie(sid: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, sid.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE).and_then(|c| Uuid::parse_str(c.value()).ok())
}
