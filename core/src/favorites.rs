//! Favorites store: the signed-in user's bookmarked countries.
//!
//! The list is keyed by `Country::favorite_key` (the `cca3` code) and holds
//! full snapshots so it renders without refetching. It is mirrored to
//! `favorites-{username}` in durable storage after every mutation, the empty
//! list included, so removing the last favorite also clears what is stored.

use tracing::{debug, info, warn};

use crate::storage::Storage;
use crate::types::{Country, User};

pub const FAVORITES_KEY_PREFIX: &str = "favorites-";

pub fn storage_key(username: &str) -> String {
    format!("{FAVORITES_KEY_PREFIX}{username}")
}

pub struct FavoritesStore<S> {
    storage: S,
    owner: Option<String>,
    items: Vec<Country>,
}

impl<S: Storage> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            owner: None,
            items: Vec::new(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn list(&self) -> &[Country] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Follow the session: load the user's list when someone is signed in,
    /// drop the in-memory list when nobody is.
    pub fn sync_with(&mut self, user: Option<&User>) {
        match user {
            Some(user) if self.owner.as_deref() != Some(user.username.as_str()) => {
                self.load_for(&user.username)
            }
            Some(_) => {}
            None => self.clear(),
        }
    }

    /// Replace the in-memory list with what is stored for `username`.
    /// A missing entry, a storage failure, or an unparsable value all yield an
    /// empty list.
    pub fn load_for(&mut self, username: &str) {
        let key = storage_key(username);
        let items = match self.storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Country>>(&raw) {
                Ok(items) => dedup(items),
                Err(error) => {
                    warn!(key = %key, error = %error, "stored favorites unreadable; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(key = %key, error = %error, "favorites storage unavailable; starting empty");
                Vec::new()
            }
        };
        info!(username, count = items.len(), "favorites loaded");
        self.owner = Some(username.to_string());
        self.items = items;
    }

    /// Forget the in-memory list. Durable storage is left as is.
    pub fn clear(&mut self) {
        if self.owner.take().is_some() {
            debug!("favorites cleared for signed-out session");
        }
        self.items.clear();
    }

    /// Append `country` unless one with the same key is already present.
    pub fn add(&mut self, country: Country) -> bool {
        if self.is_favorite(country.favorite_key()) {
            return false;
        }
        debug!(key = country.favorite_key(), "favorite added");
        self.items.push(country);
        self.persist();
        true
    }

    /// Remove every entry with `key`. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.favorite_key() != key);
        let removed = self.items.len() != before;
        if removed {
            debug!(key, "favorite removed");
            self.persist();
        }
        removed
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.items.iter().any(|c| c.favorite_key() == key)
    }

    fn persist(&self) {
        let Some(owner) = self.owner.as_deref() else {
            return;
        };
        let key = storage_key(owner);
        let raw = match serde_json::to_string(&self.items) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key = %key, error = %error, "favorites not serializable; skipping persist");
                return;
            }
        };
        if let Err(error) = self.storage.set(&key, &raw) {
            warn!(key = %key, error = %error, "failed to persist favorites");
        }
    }
}

/// Stored lists written by older builds may repeat a key; keep the first.
fn dedup(items: Vec<Country>) -> Vec<Country> {
    let mut out: Vec<Country> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|c| c.favorite_key() == item.favorite_key()) {
            out.push(item);
        }
    }
    out
}
